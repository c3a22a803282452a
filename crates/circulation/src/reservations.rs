//! Reservation queue: per-title FIFO arbitration for scarce copies.
//!
//! The sole writer of `Reservation` rows. Copies move in and out of the
//! `Reserved` status only through the registry transitions requested here.

use std::collections::HashSet;

use time::{Duration, OffsetDateTime};

use crate::error::{CircResult, CirculationError, DenialReason};
use crate::model::{
    CopyId, CopyStatus, Reader, ReaderId, Reservation, ReservationId, ReservationStatus, TitleId,
};
use crate::policy::CirculationPolicy;
use crate::registry::{self, CopyFreed};
use crate::store::TxnOps;

/// Place a reader in the queue for a title.
///
/// Denied when the reader already holds an active reservation for the
/// title, and when a copy is sitting on the shelf (borrow it instead).
pub fn enqueue<T: TxnOps>(
    txn: &mut T,
    reader: &Reader,
    title_id: TitleId,
    now: OffsetDateTime,
) -> CircResult<Reservation> {
    if !reader.active {
        return Err(CirculationError::Denied(DenialReason::InactiveReader));
    }
    if !txn.title_exists(title_id) {
        return Err(CirculationError::not_found("title", title_id));
    }
    if txn.active_reservation(reader.id, title_id).is_some() {
        return Err(CirculationError::Denied(DenialReason::DuplicateReservation));
    }
    if txn
        .copies_of_title(title_id)
        .iter()
        .any(|copy| copy.status == CopyStatus::Available)
    {
        return Err(CirculationError::Denied(DenialReason::CopyAvailable));
    }

    let reservation = Reservation::enqueue(reader.id, title_id, now);
    tracing::info!(
        reservation = %reservation.id,
        reader = %reader.id,
        title = %title_id,
        "reservation enqueued"
    );
    txn.insert_reservation(reservation.clone())?;
    Ok(reservation)
}

/// Consume a "copy freed" event: offer the copy to the earliest waiting
/// reservation for its title, FIFO.
///
/// The claiming reservation becomes ready with a pickup deadline and the
/// copy is parked `Reserved`. An empty queue leaves the copy `Available`.
pub fn on_copy_freed<T: TxnOps>(
    txn: &mut T,
    freed: CopyFreed,
    now: OffsetDateTime,
    policy: &CirculationPolicy,
) -> CircResult<Option<Reservation>> {
    let Some(mut reservation) = txn.waiting_reservations(freed.title_id).into_iter().next() else {
        return Ok(None);
    };

    reservation.status = ReservationStatus::Ready;
    reservation.held_copy_id = Some(freed.copy_id);
    reservation.expires_at = Some(now + Duration::days(policy.hold_days));
    txn.update_reservation(reservation.clone())?;

    registry::transition(
        txn,
        freed.copy_id,
        CopyStatus::Available,
        CopyStatus::Reserved,
        now,
    )?;

    tracing::info!(
        reservation = %reservation.id,
        copy = %freed.copy_id,
        reader = %reservation.reader_id,
        "freed copy offered to waiting reservation"
    );
    Ok(Some(reservation))
}

/// Mark the claiming reservation fulfilled when its held copy is issued.
pub fn fulfill<T: TxnOps>(txn: &mut T, reservation_id: ReservationId) -> CircResult<Reservation> {
    let mut reservation = txn
        .reservation(reservation_id)
        .ok_or_else(|| CirculationError::not_found("reservation", reservation_id))?;
    reservation.status = ReservationStatus::Fulfilled;
    reservation.held_copy_id = None;
    txn.update_reservation(reservation.clone())?;
    Ok(reservation)
}

/// Cancel a reservation. A no-op success on terminal states; an active
/// reservation is cancelled and any held copy is released to the next
/// waiting reader.
pub fn cancel<T: TxnOps>(
    txn: &mut T,
    reservation_id: ReservationId,
    now: OffsetDateTime,
    policy: &CirculationPolicy,
) -> CircResult<Reservation> {
    let mut reservation = txn
        .reservation(reservation_id)
        .ok_or_else(|| CirculationError::not_found("reservation", reservation_id))?;

    if !reservation.is_active() {
        return Ok(reservation);
    }

    let held = reservation.held_copy_id.take();
    reservation.status = ReservationStatus::Cancelled;
    txn.update_reservation(reservation.clone())?;
    tracing::info!(reservation = %reservation.id, "reservation cancelled");

    if let Some(copy_id) = held {
        release(txn, copy_id, now, policy)?;
    }
    Ok(reservation)
}

/// Expire every ready reservation whose pickup window lapsed.
///
/// Each released copy cascades to the next waiting reader, which can in
/// turn expire immediately under a pathological hold policy; the drain is
/// an explicit loop bounded by a visited set, never recursion.
pub fn expire_stale<T: TxnOps>(
    txn: &mut T,
    now: OffsetDateTime,
    policy: &CirculationPolicy,
) -> CircResult<Vec<Reservation>> {
    let mut expired = Vec::new();
    let mut visited: HashSet<ReservationId> = HashSet::new();

    loop {
        let stale: Vec<Reservation> = txn
            .ready_reservations()
            .into_iter()
            .filter(|r| !visited.contains(&r.id))
            .filter(|r| r.expires_at.is_some_and(|deadline| deadline < now))
            .collect();
        if stale.is_empty() {
            break;
        }

        for mut reservation in stale {
            visited.insert(reservation.id);

            let held = reservation.held_copy_id.take();
            reservation.status = ReservationStatus::Expired;
            txn.update_reservation(reservation.clone())?;
            tracing::info!(
                reservation = %reservation.id,
                reader = %reservation.reader_id,
                "ready reservation expired unclaimed"
            );

            if let Some(copy_id) = held {
                release(txn, copy_id, now, policy)?;
            }
            expired.push(reservation);
        }
    }

    Ok(expired)
}

/// Current queue for a title: waiting reservations in fulfillment order.
pub fn queue_for_title<T: TxnOps>(txn: &T, title_id: TitleId) -> Vec<Reservation> {
    txn.waiting_reservations(title_id)
}

// Put a formerly held copy back on the shelf and let the next waiting
// reservation claim it.
fn release<T: TxnOps>(
    txn: &mut T,
    copy_id: CopyId,
    now: OffsetDateTime,
    policy: &CirculationPolicy,
) -> CircResult<()> {
    if let Some(freed) = registry::transition(
        txn,
        copy_id,
        CopyStatus::Reserved,
        CopyStatus::Available,
        now,
    )? {
        on_copy_freed(txn, freed, now, policy)?;
    }
    Ok(())
}
