//! Fine calculator: overdue assessment, manual penalties, and payments.
//!
//! The sole writer of `Fine` rows. Overdue fines derive from the issue
//! ledger at return time; the daily rate is policy, never a constant here.

use time::OffsetDateTime;

use crate::error::{CircResult, CirculationError};
use crate::model::{Fine, FineId, Issue, IssueId, ReaderId, StaffId};
use crate::policy::CirculationPolicy;
use crate::store::TxnOps;

/// Whole days the return ran past the due date; zero for on-time returns.
pub fn overdue_days(issue: &Issue, returned_at: OffsetDateTime) -> i64 {
    (returned_at - issue.due_at).whole_days().max(0)
}

/// Assess the overdue fine for a closed issue, if any.
///
/// Returns `None` when the return was on time; otherwise inserts and
/// returns a fine of `overdue_days × policy.daily_fine`.
pub fn assess<T: TxnOps>(
    txn: &mut T,
    issue: &Issue,
    returned_at: OffsetDateTime,
    staff_id: StaffId,
    policy: &CirculationPolicy,
) -> CircResult<Option<Fine>> {
    let days = overdue_days(issue, returned_at);
    if days == 0 {
        return Ok(None);
    }

    let fine = Fine::assess(
        issue.reader_id,
        Some(issue.id),
        days * policy.daily_fine,
        format!("overdue return ({days} days late)"),
        staff_id,
        returned_at,
    );
    tracing::info!(
        fine = %fine.id,
        issue = %issue.id,
        reader = %issue.reader_id,
        amount = fine.amount,
        days,
        "overdue fine assessed"
    );
    txn.insert_fine(fine.clone())?;
    Ok(Some(fine))
}

/// Assess a penalty independent of the overdue clock (damage, replacement
/// cost, and similar desk judgments).
pub fn assess_manual<T: TxnOps>(
    txn: &mut T,
    reader_id: ReaderId,
    issue_id: Option<IssueId>,
    amount: i64,
    reason: String,
    staff_id: StaffId,
    now: OffsetDateTime,
) -> CircResult<Fine> {
    if amount <= 0 {
        return Err(CirculationError::Validation(format!(
            "fine amount must be positive, got {amount}"
        )));
    }
    if txn.reader(reader_id).is_none() {
        return Err(CirculationError::not_found("reader", reader_id));
    }

    let fine = Fine::assess(reader_id, issue_id, amount, reason, staff_id, now);
    tracing::info!(
        fine = %fine.id,
        reader = %reader_id,
        amount,
        "manual fine assessed"
    );
    txn.insert_fine(fine.clone())?;
    Ok(fine)
}

/// Record a payment against a fine. Rejects non-positive amounts and
/// anything that would push payments past the fine amount.
pub fn pay<T: TxnOps>(
    txn: &mut T,
    fine_id: FineId,
    amount: i64,
    paid_at: OffsetDateTime,
) -> CircResult<Fine> {
    let mut fine = txn
        .fine(fine_id)
        .ok_or_else(|| CirculationError::not_found("fine", fine_id))?;

    fine.apply_payment(amount, paid_at)?;
    txn.update_fine(fine.clone())?;

    tracing::info!(
        fine = %fine.id,
        amount,
        settled = fine.paid,
        "fine payment recorded"
    );
    Ok(fine)
}

/// Sum of unpaid balances for a reader.
pub fn total_debt<T: TxnOps>(txn: &T, reader_id: ReaderId) -> i64 {
    txn.unpaid_fines_for_reader(reader_id)
        .iter()
        .map(Fine::balance)
        .sum()
}
