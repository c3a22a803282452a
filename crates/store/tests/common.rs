//! Shared fixtures for the circulation integration suites.

#![allow(dead_code)]

use libris_circulation::model::{
    BookCopy, CopyId, CopyStatus, Issue, Reader, ReaderId, StaffId, Title, TitleId,
};
use libris_circulation::store::{Datastore, TxnOps};
use libris_circulation::{CirculationPolicy, CirculationService, IssueRequest};
use libris_store::MemoryStore;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

/// A store, a service over it, and a staff member at the desk.
pub struct Library {
    pub store: MemoryStore,
    pub service: CirculationService<MemoryStore>,
    pub staff: StaffId,
}

/// Day `n` of the test calendar.
pub fn day(n: i64) -> OffsetDateTime {
    datetime!(2024-09-01 10:00 UTC) + Duration::days(n)
}

pub fn library() -> Library {
    library_with(CirculationPolicy::default())
}

pub fn library_with(policy: CirculationPolicy) -> Library {
    let store = MemoryStore::new();
    Library {
        service: CirculationService::new(store.clone(), policy),
        store,
        staff: StaffId::new(),
    }
}

impl Library {
    pub fn add_reader(&self, name: &str) -> ReaderId {
        let reader = Reader::new(name.to_string());
        let id = reader.id;
        self.store
            .transaction(|txn| txn.insert_reader(reader.clone()))
            .expect("seed reader");
        id
    }

    pub fn deactivate_reader(&self, id: ReaderId) {
        self.store
            .transaction(|txn| txn.set_reader_active(id, false))
            .expect("deactivate reader");
    }

    pub fn add_title(&self, name: &str, author: &str) -> TitleId {
        let title = Title::new(name.to_string(), author.to_string());
        let id = title.id;
        self.store
            .transaction(|txn| txn.insert_title(title.clone()))
            .expect("seed title");
        id
    }

    pub fn add_copy(&self, title_id: TitleId, code: &str) -> CopyId {
        let copy = BookCopy::new(title_id, code.to_string(), day(0));
        let id = copy.id;
        self.store
            .transaction(|txn| txn.insert_copy(copy.clone()))
            .expect("seed copy");
        id
    }

    /// Issue with the default loan period; panics on denial.
    pub fn issue(&self, reader_id: ReaderId, code: &str, now: OffsetDateTime) -> Issue {
        self.issue_for(reader_id, code, None, now)
    }

    pub fn issue_for(
        &self,
        reader_id: ReaderId,
        code: &str,
        due_days: Option<i64>,
        now: OffsetDateTime,
    ) -> Issue {
        self.service
            .issue(
                IssueRequest {
                    reader_id,
                    copy_code: code.to_string(),
                    due_days,
                    staff_id: self.staff,
                    notes: None,
                },
                now,
            )
            .expect("issue")
    }

    pub fn issue_request(&self, reader_id: ReaderId, code: &str) -> IssueRequest {
        IssueRequest {
            reader_id,
            copy_code: code.to_string(),
            due_days: None,
            staff_id: self.staff,
            notes: None,
        }
    }

    pub fn copy_status(&self, copy_id: CopyId) -> CopyStatus {
        self.store
            .transaction(|txn| Ok(txn.copy(copy_id)))
            .expect("copy status")
            .expect("copy not seeded")
            .status
    }
}
