use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request model for issuing a copy to a reader.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueBody {
    /// Reader taking the copy
    pub reader_id: Uuid,
    /// Barcode of the physical copy
    pub copy_code: String,
    /// Loan period in days; policy default when omitted
    pub due_days: Option<i64>,
    /// Staff member at the desk
    pub staff_id: Uuid,
    /// Free-form desk notes
    pub notes: Option<String>,
}

/// Request model for renewing an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct RenewBody {
    /// Days to push the due date forward
    pub extension_days: i64,
}

/// Request model for returning a copy.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnBody {
    /// Actual return moment; "now" when omitted
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub returned_at: Option<OffsetDateTime>,
    /// Staff member at the desk
    pub staff_id: Uuid,
}

/// Request model for marking a copy lost or damaged.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkCopyBody {
    /// Staff member reporting the state
    pub staff_id: Uuid,
}

/// Request model for paying down a fine.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentBody {
    /// Payment amount in minor currency units
    pub amount: i64,
    /// Payment moment; "now" when omitted
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
}

/// Request model for a manually assessed fine.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualFineBody {
    /// Reader being fined
    pub reader_id: Uuid,
    /// Related issue, if any
    pub issue_id: Option<Uuid>,
    /// Fine amount in minor currency units
    pub amount: i64,
    /// Desk justification
    pub reason: String,
    /// Staff member assessing the fine
    pub staff_id: Uuid,
}

/// Request model for queuing a reservation.
#[derive(Debug, Clone, Deserialize)]
pub struct ReserveBody {
    /// Reader claiming the next copy
    pub reader_id: Uuid,
    /// Title being claimed
    pub title_id: Uuid,
}

/// Response model for a reader's outstanding debt.
#[derive(Debug, Clone, Serialize)]
pub struct DebtResponse {
    pub reader_id: Uuid,
    /// Sum of unpaid fine balances in minor currency units
    pub total_debt: i64,
}
