//! Table-level state and row operations.
//!
//! `StoreState` is the persisted layout rendered as plain maps: one table
//! per entity with the uniqueness invariants checked on insert. Adapters
//! wrap it in whatever transaction mechanism they provide.

use std::collections::BTreeMap;

use crate::error::{CircResult, CirculationError};
use crate::model::{
    BookCopy, CopyId, Fine, FineId, Issue, IssueId, Reader, ReaderId, Reservation, ReservationId,
    ReservationStatus, Title, TitleId,
};

use super::TxnOps;

/// All circulation tables. Cloning yields an isolated snapshot, which is
/// what transactional adapters build on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreState {
    titles: BTreeMap<TitleId, Title>,
    readers: BTreeMap<ReaderId, Reader>,
    copies: BTreeMap<CopyId, BookCopy>,
    /// Unique copy-code index.
    copy_codes: BTreeMap<String, CopyId>,
    issues: BTreeMap<IssueId, Issue>,
    fines: BTreeMap<FineId, Fine>,
    reservations: BTreeMap<ReservationId, Reservation>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TxnOps for StoreState {
    fn insert_title(&mut self, title: Title) -> CircResult<()> {
        self.titles.insert(title.id, title);
        Ok(())
    }

    fn title_exists(&self, id: TitleId) -> bool {
        self.titles.contains_key(&id)
    }

    fn insert_reader(&mut self, reader: Reader) -> CircResult<()> {
        self.readers.insert(reader.id, reader);
        Ok(())
    }

    fn reader(&self, id: ReaderId) -> Option<Reader> {
        self.readers.get(&id).cloned()
    }

    fn set_reader_active(&mut self, id: ReaderId, active: bool) -> CircResult<()> {
        let reader = self
            .readers
            .get_mut(&id)
            .ok_or_else(|| CirculationError::not_found("reader", id))?;
        reader.active = active;
        Ok(())
    }

    fn insert_copy(&mut self, copy: BookCopy) -> CircResult<()> {
        if self.copy_codes.contains_key(&copy.code) {
            return Err(CirculationError::Validation(format!(
                "copy code '{}' is already in use",
                copy.code
            )));
        }
        self.copy_codes.insert(copy.code.clone(), copy.id);
        self.copies.insert(copy.id, copy);
        Ok(())
    }

    fn copy(&self, id: CopyId) -> Option<BookCopy> {
        self.copies.get(&id).cloned()
    }

    fn copy_by_code(&self, code: &str) -> Option<BookCopy> {
        self.copy_codes
            .get(code)
            .and_then(|id| self.copies.get(id))
            .cloned()
    }

    fn update_copy(&mut self, copy: BookCopy) -> CircResult<()> {
        if !self.copies.contains_key(&copy.id) {
            return Err(CirculationError::not_found("copy", copy.id));
        }
        self.copies.insert(copy.id, copy);
        Ok(())
    }

    fn copies_of_title(&self, title_id: TitleId) -> Vec<BookCopy> {
        self.copies
            .values()
            .filter(|copy| copy.title_id == title_id)
            .cloned()
            .collect()
    }

    fn insert_issue(&mut self, issue: Issue) -> CircResult<()> {
        // Equivalent of a unique partial index: one open issue per copy.
        if issue.is_open() && self.open_issue_for_copy(issue.copy_id).is_some() {
            return Err(CirculationError::Conflict);
        }
        self.issues.insert(issue.id, issue);
        Ok(())
    }

    fn issue(&self, id: IssueId) -> Option<Issue> {
        self.issues.get(&id).cloned()
    }

    fn update_issue(&mut self, issue: Issue) -> CircResult<()> {
        if !self.issues.contains_key(&issue.id) {
            return Err(CirculationError::not_found("issue", issue.id));
        }
        self.issues.insert(issue.id, issue);
        Ok(())
    }

    fn open_issue_for_copy(&self, copy_id: CopyId) -> Option<Issue> {
        self.issues
            .values()
            .find(|issue| issue.copy_id == copy_id && issue.is_open())
            .cloned()
    }

    fn open_issues_for_reader(&self, reader_id: ReaderId) -> Vec<Issue> {
        self.issues
            .values()
            .filter(|issue| issue.reader_id == reader_id && issue.is_open())
            .cloned()
            .collect()
    }

    fn open_issues(&self) -> Vec<Issue> {
        self.issues
            .values()
            .filter(|issue| issue.is_open())
            .cloned()
            .collect()
    }

    fn insert_fine(&mut self, fine: Fine) -> CircResult<()> {
        self.fines.insert(fine.id, fine);
        Ok(())
    }

    fn fine(&self, id: FineId) -> Option<Fine> {
        self.fines.get(&id).cloned()
    }

    fn update_fine(&mut self, fine: Fine) -> CircResult<()> {
        if !self.fines.contains_key(&fine.id) {
            return Err(CirculationError::not_found("fine", fine.id));
        }
        self.fines.insert(fine.id, fine);
        Ok(())
    }

    fn unpaid_fines_for_reader(&self, reader_id: ReaderId) -> Vec<Fine> {
        self.fines
            .values()
            .filter(|fine| fine.reader_id == reader_id && !fine.paid)
            .cloned()
            .collect()
    }

    fn insert_reservation(&mut self, reservation: Reservation) -> CircResult<()> {
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    fn reservation(&self, id: ReservationId) -> Option<Reservation> {
        self.reservations.get(&id).cloned()
    }

    fn update_reservation(&mut self, reservation: Reservation) -> CircResult<()> {
        if !self.reservations.contains_key(&reservation.id) {
            return Err(CirculationError::not_found("reservation", reservation.id));
        }
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    fn waiting_reservations(&self, title_id: TitleId) -> Vec<Reservation> {
        let mut waiting: Vec<Reservation> = self
            .reservations
            .values()
            .filter(|r| r.title_id == title_id && r.status == ReservationStatus::Waiting)
            .cloned()
            .collect();
        // FIFO by creation time; the time-ordered id breaks ties.
        waiting.sort_by_key(|r| (r.created_at, r.id));
        waiting
    }

    fn active_reservation(&self, reader_id: ReaderId, title_id: TitleId) -> Option<Reservation> {
        self.reservations
            .values()
            .find(|r| r.reader_id == reader_id && r.title_id == title_id && r.is_active())
            .cloned()
    }

    fn ready_reservations(&self) -> Vec<Reservation> {
        self.reservations
            .values()
            .filter(|r| r.status == ReservationStatus::Ready)
            .cloned()
            .collect()
    }

    fn reservation_holding_copy(&self, copy_id: CopyId) -> Option<Reservation> {
        self.reservations
            .values()
            .find(|r| r.status == ReservationStatus::Ready && r.held_copy_id == Some(copy_id))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StaffId;
    use time::macros::datetime;

    #[test]
    fn duplicate_copy_codes_are_rejected() {
        let mut state = StoreState::new();
        let title = Title::new("Dune".to_string(), "Frank Herbert".to_string());
        let title_id = title.id;
        state.insert_title(title).unwrap();

        let now = datetime!(2024-01-01 00:00 UTC);
        state
            .insert_copy(BookCopy::new(title_id, "C-1".to_string(), now))
            .unwrap();
        let err = state
            .insert_copy(BookCopy::new(title_id, "C-1".to_string(), now))
            .unwrap_err();
        assert!(matches!(err, CirculationError::Validation(_)));
    }

    #[test]
    fn second_open_issue_for_a_copy_conflicts() {
        let mut state = StoreState::new();
        let copy_id = CopyId::new();
        let now = datetime!(2024-01-01 00:00 UTC);
        let due = datetime!(2024-01-15 00:00 UTC);

        state
            .insert_issue(Issue::open(
                ReaderId::new(),
                copy_id,
                StaffId::new(),
                now,
                due,
                None,
            ))
            .unwrap();

        let err = state
            .insert_issue(Issue::open(
                ReaderId::new(),
                copy_id,
                StaffId::new(),
                now,
                due,
                None,
            ))
            .unwrap_err();
        assert!(matches!(err, CirculationError::Conflict));
    }

    #[test]
    fn waiting_reservations_come_back_fifo() {
        let mut state = StoreState::new();
        let title_id = TitleId::new();

        let r1 = Reservation::enqueue(ReaderId::new(), title_id, datetime!(2024-06-01 10:00 UTC));
        let r2 = Reservation::enqueue(ReaderId::new(), title_id, datetime!(2024-06-01 11:00 UTC));
        let r3 = Reservation::enqueue(ReaderId::new(), title_id, datetime!(2024-06-01 09:00 UTC));
        let (id1, id2, id3) = (r1.id, r2.id, r3.id);
        state.insert_reservation(r1).unwrap();
        state.insert_reservation(r2).unwrap();
        state.insert_reservation(r3).unwrap();

        let order: Vec<_> = state
            .waiting_reservations(title_id)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(order, vec![id3, id1, id2]);
    }
}
