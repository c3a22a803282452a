//! Borrow eligibility: may this reader take this copy, right now?
//!
//! Checks run in a fixed order and short-circuit on the first failure, so
//! callers always see the most fundamental reason first.

use time::OffsetDateTime;

use crate::error::{CircResult, CirculationError, DenialReason};
use crate::model::{BookCopy, CopyStatus, Reader, ReservationId};
use crate::policy::CirculationPolicy;
use crate::store::TxnOps;

/// How an allowed issue will take the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuePath {
    /// The copy is on the shelf.
    Direct,
    /// The copy is held by this reader's ready reservation; issuing it
    /// settles the reservation.
    FromReservation(ReservationId),
}

/// Decide whether a new issue may proceed. Returns the issue path on
/// success and a typed denial otherwise.
pub fn can_issue<T: TxnOps>(
    txn: &T,
    reader: &Reader,
    copy: &BookCopy,
    now: OffsetDateTime,
    policy: &CirculationPolicy,
) -> CircResult<IssuePath> {
    if !reader.active {
        return Err(CirculationError::Denied(DenialReason::InactiveReader));
    }

    let open = txn.open_issues_for_reader(reader.id);
    if open.iter().any(|issue| issue.is_overdue(now)) {
        // One overdue issue disqualifies the reader entirely.
        return Err(CirculationError::Denied(DenialReason::HasOverdue));
    }
    if open.len() as u32 >= policy.max_open_issues {
        return Err(CirculationError::Denied(DenialReason::LimitReached));
    }

    match copy.status {
        CopyStatus::Available => Ok(IssuePath::Direct),
        CopyStatus::Reserved => {
            // The reservation pickup path: only the reader whose ready
            // reservation holds this copy may take it.
            match txn.reservation_holding_copy(copy.id) {
                Some(reservation) if reservation.reader_id == reader.id => {
                    Ok(IssuePath::FromReservation(reservation.id))
                }
                _ => Err(CirculationError::Denied(DenialReason::CopyUnavailable)),
            }
        }
        _ => Err(CirculationError::Denied(DenialReason::CopyUnavailable)),
    }
}
