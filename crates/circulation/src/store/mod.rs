//! Datastore contract for the circulation engine.
//!
//! The engine touches persisted state only through these traits: one table
//! per entity, plus a single transactional primitive. Adapters decide how
//! atomicity is provided; the engine only requires that a transaction
//! commits all of its writes or none of them, and that a lost commit race
//! surfaces as [`CirculationError::Conflict`].

pub mod state;

pub use state::StoreState;

use crate::error::CircResult;
use crate::model::{
    BookCopy, CopyId, Fine, FineId, Issue, IssueId, Reader, ReaderId, Reservation, ReservationId,
    Title, TitleId,
};

/// Row-level operations visible inside a transaction.
///
/// Queries return owned snapshots; mutations replace whole rows. The
/// single-open-issue and unique-copy-code invariants are enforced at this
/// layer, mirroring unique partial indexes in a relational backing store.
pub trait TxnOps {
    // Titles and readers are consumed, not owned: the engine validates
    // against them and flips the reader active flag for the admin surface.
    fn insert_title(&mut self, title: Title) -> CircResult<()>;
    fn title_exists(&self, id: TitleId) -> bool;
    fn insert_reader(&mut self, reader: Reader) -> CircResult<()>;
    fn reader(&self, id: ReaderId) -> Option<Reader>;
    fn set_reader_active(&mut self, id: ReaderId, active: bool) -> CircResult<()>;

    fn insert_copy(&mut self, copy: BookCopy) -> CircResult<()>;
    fn copy(&self, id: CopyId) -> Option<BookCopy>;
    fn copy_by_code(&self, code: &str) -> Option<BookCopy>;
    fn update_copy(&mut self, copy: BookCopy) -> CircResult<()>;
    fn copies_of_title(&self, title_id: TitleId) -> Vec<BookCopy>;

    fn insert_issue(&mut self, issue: Issue) -> CircResult<()>;
    fn issue(&self, id: IssueId) -> Option<Issue>;
    fn update_issue(&mut self, issue: Issue) -> CircResult<()>;
    fn open_issue_for_copy(&self, copy_id: CopyId) -> Option<Issue>;
    fn open_issues_for_reader(&self, reader_id: ReaderId) -> Vec<Issue>;
    fn open_issues(&self) -> Vec<Issue>;

    fn insert_fine(&mut self, fine: Fine) -> CircResult<()>;
    fn fine(&self, id: FineId) -> Option<Fine>;
    fn update_fine(&mut self, fine: Fine) -> CircResult<()>;
    fn unpaid_fines_for_reader(&self, reader_id: ReaderId) -> Vec<Fine>;

    fn insert_reservation(&mut self, reservation: Reservation) -> CircResult<()>;
    fn reservation(&self, id: ReservationId) -> Option<Reservation>;
    fn update_reservation(&mut self, reservation: Reservation) -> CircResult<()>;
    /// Waiting reservations for a title in strict FIFO order.
    fn waiting_reservations(&self, title_id: TitleId) -> Vec<Reservation>;
    fn active_reservation(&self, reader_id: ReaderId, title_id: TitleId) -> Option<Reservation>;
    fn ready_reservations(&self) -> Vec<Reservation>;
    /// The ready reservation currently holding a copy, if any.
    fn reservation_holding_copy(&self, copy_id: CopyId) -> Option<Reservation>;
}

/// Transactional entry point. Every coordinator operation runs its
/// reads-then-writes inside exactly one call.
pub trait Datastore: Send + Sync {
    type Txn: TxnOps;

    /// Run `f` against a transactional view. An `Ok` return commits
    /// atomically; any `Err` rolls the whole transaction back. Adapters
    /// report a lost commit race as [`CirculationError::Conflict`]
    /// without retrying.
    ///
    /// [`CirculationError::Conflict`]: crate::error::CirculationError::Conflict
    fn transaction<R>(&self, f: impl FnOnce(&mut Self::Txn) -> CircResult<R>) -> CircResult<R>;
}
