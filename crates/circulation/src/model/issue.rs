use serde::Serialize;
use time::OffsetDateTime;

use super::id::{CopyId, IssueId, ReaderId, StaffId};

/// One loan transaction. The row with `returned_at == None` is the single
/// open issue a copy may have.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub id: IssueId,
    pub reader_id: ReaderId,
    pub copy_id: CopyId,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub due_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub returned_at: Option<OffsetDateTime>,
    pub renewal_count: u32,
    pub staff_id: StaffId,
    pub notes: Option<String>,
}

impl Issue {
    pub fn open(
        reader_id: ReaderId,
        copy_id: CopyId,
        staff_id: StaffId,
        issued_at: OffsetDateTime,
        due_at: OffsetDateTime,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: IssueId::new(),
            reader_id,
            copy_id,
            issued_at,
            due_at,
            returned_at: None,
            renewal_count: 0,
            staff_id,
            notes,
        }
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }

    /// Open past its due date as of `now`.
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        self.is_open() && self.due_at < now
    }
}
