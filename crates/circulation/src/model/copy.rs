use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::id::{CopyId, TitleId};

/// Availability status of one physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    /// On the shelf, can be issued.
    Available,
    /// Out on loan; exactly one open issue references the copy.
    Issued,
    /// Held for a ready reservation pending pickup.
    Reserved,
    /// Reported lost; requires manual reset to circulate again.
    Lost,
    /// Damaged beyond lending; requires manual reset.
    Damaged,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::Issued => "issued",
            CopyStatus::Reserved => "reserved",
            CopyStatus::Lost => "lost",
            CopyStatus::Damaged => "damaged",
        }
    }

    /// Whether staff may still mark the copy lost or damaged from here.
    pub fn is_circulating(&self) -> bool {
        matches!(self, CopyStatus::Available | CopyStatus::Issued)
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical item of a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookCopy {
    pub id: CopyId,
    pub title_id: TitleId,
    /// Barcode-style code, unique across the collection.
    pub code: String,
    pub status: CopyStatus,
    /// Shelf or hall location, free-form.
    pub location: Option<String>,
    pub condition_notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl BookCopy {
    pub fn new(title_id: TitleId, code: String, now: OffsetDateTime) -> Self {
        Self {
            id: CopyId::new(),
            title_id,
            code,
            status: CopyStatus::Available,
            location: None,
            condition_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
