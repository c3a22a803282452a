//! Circulation coordinator: the one place desk operations are composed.
//!
//! Each public method runs exactly one datastore transaction; the copy
//! registry, issue ledger, fine calculator, and reservation queue are only
//! ever touched through it, so either every invariant holds at commit or
//! the whole operation rolls back.

use time::{Duration, OffsetDateTime};

use crate::eligibility::{self, IssuePath};
use crate::error::{CircResult, CirculationError, DenialReason};
use crate::fines;
use crate::model::{
    BookCopy, CopyId, CopyStatus, Fine, FineId, Issue, IssueId, ReaderId, Reservation,
    ReservationId, StaffId, TitleId,
};
use crate::policy::{self, CirculationPolicy};
use crate::registry;
use crate::reservations;
use crate::store::{Datastore, TxnOps};

/// A staff request to issue a copy to a reader.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub reader_id: ReaderId,
    /// Copies are identified by their barcode at the desk.
    pub copy_code: String,
    /// Loan period; policy default when absent.
    pub due_days: Option<i64>,
    pub staff_id: StaffId,
    pub notes: Option<String>,
}

/// A staff request to take a copy back.
#[derive(Debug, Clone)]
pub struct ReturnRequest {
    pub issue_id: IssueId,
    /// Backdated returns are allowed down to the issue date; absent means
    /// "now".
    pub returned_at: Option<OffsetDateTime>,
    pub staff_id: StaffId,
}

/// A manually assessed penalty (damage, replacement, desk judgment).
#[derive(Debug, Clone)]
pub struct ManualFineRequest {
    pub reader_id: ReaderId,
    pub issue_id: Option<IssueId>,
    pub amount: i64,
    pub reason: String,
    pub staff_id: StaffId,
}

/// Everything the desk observes after a return, in final committed form.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReturnOutcome {
    pub issue: Issue,
    pub fine: Option<Fine>,
    /// The copy with its final status: `Available`, or `Reserved` when a
    /// waiting reservation claimed it.
    pub copy: BookCopy,
    pub readied_reservation: Option<Reservation>,
}

/// Orchestrates issue, renew, return, loss, fines, and reservations as
/// atomic operations against one datastore.
pub struct CirculationService<S: Datastore> {
    store: S,
    policy: CirculationPolicy,
}

impl<S: Datastore> CirculationService<S> {
    pub fn new(store: S, policy: CirculationPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &CirculationPolicy {
        &self.policy
    }

    /// Issue a copy to a reader.
    ///
    /// Runs the eligibility gauntlet, opens the ledger row, and swaps the
    /// copy to `Issued`. Taking a copy held by the reader's own ready
    /// reservation settles that reservation in the same transaction.
    pub fn issue(&self, req: IssueRequest, now: OffsetDateTime) -> CircResult<Issue> {
        let due_days = req.due_days.unwrap_or(self.policy.loan_days);
        self.policy.check_due_days(due_days)?;

        self.store.transaction(|txn| {
            let reader = txn
                .reader(req.reader_id)
                .ok_or_else(|| CirculationError::not_found("reader", req.reader_id))?;
            let copy = txn
                .copy_by_code(&req.copy_code)
                .ok_or_else(|| CirculationError::not_found("copy", &req.copy_code))?;

            let path = eligibility::can_issue(txn, &reader, &copy, now, &self.policy)?;

            registry::transition(txn, copy.id, copy.status, CopyStatus::Issued, now)?;
            if let IssuePath::FromReservation(reservation_id) = path {
                reservations::fulfill(txn, reservation_id)?;
            }

            let issue = Issue::open(
                reader.id,
                copy.id,
                req.staff_id,
                now,
                now + Duration::days(due_days),
                req.notes.clone(),
            );
            txn.insert_issue(issue.clone())?;

            tracing::info!(
                issue = %issue.id,
                reader = %reader.id,
                copy = %copy.code,
                due = %issue.due_at,
                "copy issued"
            );
            Ok(issue)
        })
    }

    /// Extend an open issue's due date. Does not touch the copy status.
    pub fn renew(&self, issue_id: IssueId, extension_days: i64) -> CircResult<Issue> {
        policy::check_extension_days(extension_days)?;

        self.store.transaction(|txn| {
            let mut issue = txn
                .issue(issue_id)
                .ok_or_else(|| CirculationError::not_found("issue", issue_id))?;
            if !issue.is_open() {
                return Err(CirculationError::Denied(DenialReason::AlreadyReturned));
            }
            if issue.renewal_count >= self.policy.renewal_cap {
                return Err(CirculationError::Denied(DenialReason::RenewalLimit));
            }

            issue.due_at += Duration::days(extension_days);
            issue.renewal_count += 1;
            txn.update_issue(issue.clone())?;

            tracing::info!(
                issue = %issue.id,
                renewal = issue.renewal_count,
                due = %issue.due_at,
                "issue renewed"
            );
            Ok(issue)
        })
    }

    /// Close an issue: set the return date, assess the overdue fine, free
    /// the copy, and let the reservation queue claim it — all in one
    /// transaction, so the caller observes the final copy status.
    pub fn return_copy(&self, req: ReturnRequest, now: OffsetDateTime) -> CircResult<ReturnOutcome> {
        self.store.transaction(|txn| {
            let mut issue = txn
                .issue(req.issue_id)
                .ok_or_else(|| CirculationError::not_found("issue", req.issue_id))?;
            if !issue.is_open() {
                return Err(CirculationError::Denied(DenialReason::AlreadyReturned));
            }

            let returned_at = req.returned_at.unwrap_or(now);
            if returned_at < issue.issued_at {
                return Err(CirculationError::Validation(format!(
                    "return date {returned_at} precedes issue date {}",
                    issue.issued_at
                )));
            }

            issue.returned_at = Some(returned_at);
            txn.update_issue(issue.clone())?;

            let fine = fines::assess(txn, &issue, returned_at, req.staff_id, &self.policy)?;

            let freed = registry::transition(
                txn,
                issue.copy_id,
                CopyStatus::Issued,
                CopyStatus::Available,
                now,
            )?;
            let readied_reservation = match freed {
                Some(event) => reservations::on_copy_freed(txn, event, now, &self.policy)?,
                None => None,
            };

            let copy = txn
                .copy(issue.copy_id)
                .ok_or_else(|| CirculationError::not_found("copy", issue.copy_id))?;

            tracing::info!(
                issue = %issue.id,
                copy = %copy.code,
                status = %copy.status,
                fined = fine.is_some(),
                "copy returned"
            );
            Ok(ReturnOutcome {
                issue,
                fine,
                copy,
                readied_reservation,
            })
        })
    }

    /// Report a copy lost. Force-closes any open issue at `now`; the
    /// overdue clock is not applied, only the configured replacement fee.
    pub fn mark_lost(
        &self,
        copy_id: CopyId,
        staff_id: StaffId,
        now: OffsetDateTime,
    ) -> CircResult<BookCopy> {
        self.decommission(copy_id, CopyStatus::Lost, staff_id, now)
    }

    /// Report a copy damaged. Same semantics as [`Self::mark_lost`].
    pub fn mark_damaged(
        &self,
        copy_id: CopyId,
        staff_id: StaffId,
        now: OffsetDateTime,
    ) -> CircResult<BookCopy> {
        self.decommission(copy_id, CopyStatus::Damaged, staff_id, now)
    }

    fn decommission(
        &self,
        copy_id: CopyId,
        to: CopyStatus,
        staff_id: StaffId,
        now: OffsetDateTime,
    ) -> CircResult<BookCopy> {
        self.store.transaction(|txn| {
            let copy = txn
                .copy(copy_id)
                .ok_or_else(|| CirculationError::not_found("copy", copy_id))?;
            if !copy.status.is_circulating() {
                return Err(CirculationError::Denied(DenialReason::NotCirculating));
            }

            if let Some(mut open) = txn.open_issue_for_copy(copy_id) {
                open.returned_at = Some(now);
                txn.update_issue(open.clone())?;
                if let Some(fee) = self.policy.replacement_fee {
                    fines::assess_manual(
                        txn,
                        open.reader_id,
                        Some(open.id),
                        fee,
                        format!("replacement cost ({to} copy)"),
                        staff_id,
                        now,
                    )?;
                }
            }

            registry::transition(txn, copy_id, copy.status, to, now)?;
            let copy = txn
                .copy(copy_id)
                .ok_or_else(|| CirculationError::not_found("copy", copy_id))?;

            tracing::warn!(copy = %copy.code, status = %copy.status, "copy removed from circulation");
            Ok(copy)
        })
    }

    /// Record a payment against a fine.
    pub fn pay_fine(&self, fine_id: FineId, amount: i64, paid_at: OffsetDateTime) -> CircResult<Fine> {
        self.store
            .transaction(|txn| fines::pay(txn, fine_id, amount, paid_at))
    }

    /// Assess a fine independent of any overdue computation.
    pub fn assess_manual_fine(
        &self,
        req: ManualFineRequest,
        now: OffsetDateTime,
    ) -> CircResult<Fine> {
        self.store.transaction(|txn| {
            fines::assess_manual(
                txn,
                req.reader_id,
                req.issue_id,
                req.amount,
                req.reason.clone(),
                req.staff_id,
                now,
            )
        })
    }

    /// Queue a reader for the next available copy of a title.
    pub fn reserve(
        &self,
        reader_id: ReaderId,
        title_id: TitleId,
        now: OffsetDateTime,
    ) -> CircResult<Reservation> {
        self.store.transaction(|txn| {
            let reader = txn
                .reader(reader_id)
                .ok_or_else(|| CirculationError::not_found("reader", reader_id))?;
            reservations::enqueue(txn, &reader, title_id, now)
        })
    }

    /// Cancel a reservation; settled reservations are a quiet success.
    pub fn cancel_reservation(
        &self,
        reservation_id: ReservationId,
        now: OffsetDateTime,
    ) -> CircResult<Reservation> {
        self.store
            .transaction(|txn| reservations::cancel(txn, reservation_id, now, &self.policy))
    }

    /// Expire lapsed pickup holds, cascading copies to the next waiters.
    /// Invoked by a periodic job; cadence is the caller's business.
    pub fn expire_reservations(&self, now: OffsetDateTime) -> CircResult<Vec<Reservation>> {
        self.store
            .transaction(|txn| reservations::expire_stale(txn, now, &self.policy))
    }

    // Read paths.

    /// Open issues for one reader.
    pub fn active_issues(&self, reader_id: ReaderId) -> CircResult<Vec<Issue>> {
        self.store
            .transaction(|txn| Ok(txn.open_issues_for_reader(reader_id)))
    }

    /// Every open issue past its due date, system-wide.
    pub fn overdue_issues(&self, now: OffsetDateTime) -> CircResult<Vec<Issue>> {
        self.store.transaction(|txn| {
            let mut overdue: Vec<Issue> = txn
                .open_issues()
                .into_iter()
                .filter(|issue| issue.is_overdue(now))
                .collect();
            overdue.sort_by_key(|issue| issue.due_at);
            Ok(overdue)
        })
    }

    /// Unpaid fines for one reader.
    pub fn unpaid_fines(&self, reader_id: ReaderId) -> CircResult<Vec<Fine>> {
        self.store
            .transaction(|txn| Ok(txn.unpaid_fines_for_reader(reader_id)))
    }

    /// Sum of a reader's unpaid fine balances.
    pub fn total_debt(&self, reader_id: ReaderId) -> CircResult<i64> {
        self.store
            .transaction(|txn| Ok(fines::total_debt(txn, reader_id)))
    }

    /// Waiting reservations for a title, in fulfillment order.
    pub fn reservation_queue(&self, title_id: TitleId) -> CircResult<Vec<Reservation>> {
        self.store
            .transaction(|txn| Ok(reservations::queue_for_title(txn, title_id)))
    }
}
