//! Copy registry: the single owner of `BookCopy.status`.
//!
//! Every status change in the system goes through [`transition`], a
//! compare-and-swap on the status column. Components never write status
//! directly; they request a transition and handle the conflict.

use time::OffsetDateTime;

use crate::error::{CircResult, CirculationError};
use crate::model::{CopyId, CopyStatus, TitleId};
use crate::store::TxnOps;

/// Raised when a transition lands a copy on `Available`. The caller must
/// hand it to the reservation queue within the same transaction.
#[derive(Debug, Clone, Copy)]
pub struct CopyFreed {
    pub title_id: TitleId,
    pub copy_id: CopyId,
}

/// Compare-and-swap the copy's status from `from` to `to`.
///
/// Fails with `Conflict` when the stored status no longer matches `from`,
/// which signals a race between two staff actions on the same copy.
pub fn transition<T: TxnOps>(
    txn: &mut T,
    copy_id: CopyId,
    from: CopyStatus,
    to: CopyStatus,
    now: OffsetDateTime,
) -> CircResult<Option<CopyFreed>> {
    let mut copy = txn
        .copy(copy_id)
        .ok_or_else(|| CirculationError::not_found("copy", copy_id))?;

    if copy.status != from {
        tracing::debug!(
            copy = %copy_id,
            expected = %from,
            actual = %copy.status,
            "copy status compare-and-swap lost"
        );
        return Err(CirculationError::Conflict);
    }

    copy.status = to;
    copy.updated_at = now;
    let title_id = copy.title_id;
    txn.update_copy(copy)?;

    Ok((to == CopyStatus::Available).then_some(CopyFreed { title_id, copy_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookCopy, Title};
    use crate::store::StoreState;
    use time::macros::datetime;

    fn seeded_copy(state: &mut StoreState) -> CopyId {
        let title = Title::new("Solaris".to_string(), "Stanisław Lem".to_string());
        let title_id = title.id;
        state.insert_title(title).unwrap();
        let copy = BookCopy::new(
            title_id,
            "C-100".to_string(),
            datetime!(2024-01-01 00:00 UTC),
        );
        let id = copy.id;
        state.insert_copy(copy).unwrap();
        id
    }

    #[test]
    fn transition_swaps_only_from_the_expected_status() {
        let mut state = StoreState::new();
        let copy_id = seeded_copy(&mut state);
        let now = datetime!(2024-01-02 00:00 UTC);

        let freed = transition(
            &mut state,
            copy_id,
            CopyStatus::Available,
            CopyStatus::Issued,
            now,
        )
        .unwrap();
        assert!(freed.is_none());
        assert_eq!(state.copy(copy_id).unwrap().status, CopyStatus::Issued);

        // A second actor still expecting `Available` loses the race.
        let err = transition(
            &mut state,
            copy_id,
            CopyStatus::Available,
            CopyStatus::Issued,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, CirculationError::Conflict));
    }

    #[test]
    fn landing_on_available_raises_the_freed_event() {
        let mut state = StoreState::new();
        let copy_id = seeded_copy(&mut state);
        let now = datetime!(2024-01-02 00:00 UTC);

        transition(
            &mut state,
            copy_id,
            CopyStatus::Available,
            CopyStatus::Issued,
            now,
        )
        .unwrap();
        let freed = transition(
            &mut state,
            copy_id,
            CopyStatus::Issued,
            CopyStatus::Available,
            now,
        )
        .unwrap()
        .expect("freed event");
        assert_eq!(freed.copy_id, copy_id);
    }

    #[test]
    fn unknown_copies_are_reported_as_not_found() {
        let mut state = StoreState::new();
        let err = transition(
            &mut state,
            CopyId::new(),
            CopyStatus::Available,
            CopyStatus::Issued,
            datetime!(2024-01-02 00:00 UTC),
        )
        .unwrap_err();
        assert!(matches!(err, CirculationError::NotFound { .. }));
    }
}
