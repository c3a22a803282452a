use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::id::{CopyId, ReaderId, ReservationId, TitleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// In the queue, no copy assigned yet.
    Waiting,
    /// A copy is held for pickup until the expiry timestamp.
    Ready,
    /// The reader picked the copy up; the claim is settled.
    Fulfilled,
    /// The pickup window lapsed; the held copy was released.
    Expired,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Waiting => "waiting",
            ReservationStatus::Ready => "ready",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Expired => "expired",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Waiting or ready; at most one active reservation may exist per
    /// (reader, title) pair.
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Waiting | ReservationStatus::Ready)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reader's queued claim on the next available copy of a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub reader_id: ReaderId,
    pub title_id: TitleId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Pickup deadline; set when the reservation becomes ready.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    /// The copy held for pickup; set when the reservation becomes ready.
    pub held_copy_id: Option<CopyId>,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn enqueue(reader_id: ReaderId, title_id: TitleId, now: OffsetDateTime) -> Self {
        Self {
            id: ReservationId::new(),
            reader_id,
            title_id,
            created_at: now,
            expires_at: None,
            held_copy_id: None,
            status: ReservationStatus::Waiting,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
