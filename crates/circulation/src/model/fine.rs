use serde::Serialize;
use time::OffsetDateTime;

use super::id::{FineId, IssueId, ReaderId, StaffId};
use crate::error::{CircResult, CirculationError};

/// A monetary penalty owed by a reader. Amounts are minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fine {
    pub id: FineId,
    pub reader_id: ReaderId,
    /// The issue that generated the fine; `None` for manual assessments.
    pub issue_id: Option<IssueId>,
    pub amount: i64,
    pub reason: String,
    #[serde(with = "time::serde::rfc3339")]
    pub assessed_at: OffsetDateTime,
    pub paid: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    /// Cumulative payments received; never exceeds `amount`.
    pub paid_total: i64,
    pub staff_id: StaffId,
}

impl Fine {
    pub fn assess(
        reader_id: ReaderId,
        issue_id: Option<IssueId>,
        amount: i64,
        reason: String,
        staff_id: StaffId,
        assessed_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: FineId::new(),
            reader_id,
            issue_id,
            amount,
            reason,
            assessed_at,
            paid: false,
            paid_at: None,
            paid_total: 0,
            staff_id,
        }
    }

    /// Outstanding balance still owed.
    pub fn balance(&self) -> i64 {
        self.amount - self.paid_total
    }

    /// Record a payment. Partial payments accumulate; the fine flips to
    /// paid exactly when the balance reaches zero.
    pub fn apply_payment(&mut self, amount: i64, paid_at: OffsetDateTime) -> CircResult<()> {
        if amount <= 0 {
            return Err(CirculationError::Validation(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        if self.paid_total + amount > self.amount {
            return Err(CirculationError::Validation(format!(
                "payment of {amount} would exceed fine amount {} (already paid {})",
                self.amount, self.paid_total
            )));
        }
        self.paid_total += amount;
        if self.paid_total == self.amount {
            self.paid = true;
            self.paid_at = Some(paid_at);
        }
        Ok(())
    }
}
