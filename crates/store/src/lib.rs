//! In-memory datastore adapter for the circulation engine.
//!
//! [`MemoryStore`] provides the serializable-equivalent transactions the
//! engine requires through optimistic concurrency: a transaction runs
//! against a snapshot of the tables and commits with first-committer-wins
//! version arbitration. Two racing writers both run to completion, the
//! second commit observes the bumped version and fails with `Conflict` —
//! which is exactly how the engine expects a lost race to surface.

use std::sync::{Arc, Mutex};

use libris_circulation::error::{CircResult, CirculationError};
use libris_circulation::store::{Datastore, StoreState};

#[derive(Debug)]
struct Versioned {
    version: u64,
    state: StoreState,
}

/// Shared, transactional in-memory store. Cloning yields another handle to
/// the same tables.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Versioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Versioned {
                version: 0,
                state: StoreState::new(),
            })),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Datastore for MemoryStore {
    type Txn = StoreState;

    fn transaction<R>(&self, f: impl FnOnce(&mut Self::Txn) -> CircResult<R>) -> CircResult<R> {
        let (base_version, base) = {
            let guard = self
                .inner
                .lock()
                .map_err(|_| CirculationError::Store("store lock poisoned".to_string()))?;
            (guard.version, guard.state.clone())
        };

        // The closure mutates a working copy; an Err return simply drops
        // it, which is the rollback.
        let mut working = base.clone();
        let result = f(&mut working)?;

        if working == base {
            // Read-only transaction: a consistent snapshot is all it
            // needs, no commit arbitration.
            return Ok(result);
        }

        let mut guard = self
            .inner
            .lock()
            .map_err(|_| CirculationError::Store("store lock poisoned".to_string()))?;
        if guard.version != base_version {
            tracing::debug!(
                base = base_version,
                current = guard.version,
                "transaction lost the commit race"
            );
            return Err(CirculationError::Conflict);
        }
        guard.version += 1;
        guard.state = working;
        Ok(result)
    }
}
