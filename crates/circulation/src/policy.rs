//! Lending-desk policy values.
//!
//! Everything here is deployment configuration, not code: the engine reads
//! these numbers but never hardcodes them.

use crate::error::{CircResult, CirculationError};

/// Renewal extensions must stay within this range of days.
pub const MIN_EXTENSION_DAYS: i64 = 1;
pub const MAX_EXTENSION_DAYS: i64 = 30;

/// Business policy consulted by the circulation engine.
#[derive(Debug, Clone)]
pub struct CirculationPolicy {
    /// Maximum simultaneously open issues per reader.
    pub max_open_issues: u32,
    /// Maximum times a single issue may be renewed.
    pub renewal_cap: u32,
    /// Loan period applied when an issue request does not name one.
    pub loan_days: i64,
    /// Upper bound for a requested loan period, in days.
    pub max_due_days: i64,
    /// Fine accrued per whole overdue day, in minor currency units.
    pub daily_fine: i64,
    /// Days a ready reservation holds its copy before expiring.
    pub hold_days: i64,
    /// Replacement fee charged when a copy is marked lost or damaged while
    /// out on loan. `None` means no automatic fee.
    pub replacement_fee: Option<i64>,
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        Self {
            max_open_issues: 5,
            renewal_cap: 3,
            loan_days: 14,
            max_due_days: 30,
            daily_fine: 50,
            hold_days: 3,
            replacement_fee: None,
        }
    }
}

impl CirculationPolicy {
    /// Validate a requested loan period against this policy.
    pub fn check_due_days(&self, due_days: i64) -> CircResult<()> {
        if due_days < 1 || due_days > self.max_due_days {
            return Err(CirculationError::Validation(format!(
                "loan period must be between 1 and {} days, got {}",
                self.max_due_days, due_days
            )));
        }
        Ok(())
    }
}

/// Validate a renewal extension request.
pub fn check_extension_days(extension_days: i64) -> CircResult<()> {
    if !(MIN_EXTENSION_DAYS..=MAX_EXTENSION_DAYS).contains(&extension_days) {
        return Err(CirculationError::Validation(format!(
            "extension must be between {MIN_EXTENSION_DAYS} and {MAX_EXTENSION_DAYS} days, got {extension_days}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_desk_rules() {
        let policy = CirculationPolicy::default();
        assert_eq!(policy.max_open_issues, 5);
        assert_eq!(policy.renewal_cap, 3);
        assert_eq!(policy.loan_days, 14);
        assert_eq!(policy.replacement_fee, None);
    }

    #[test]
    fn extension_bounds_are_inclusive() {
        assert!(check_extension_days(1).is_ok());
        assert!(check_extension_days(30).is_ok());
        assert!(check_extension_days(0).is_err());
        assert!(check_extension_days(31).is_err());
    }

    #[test]
    fn due_days_rejects_out_of_range() {
        let policy = CirculationPolicy::default();
        assert!(policy.check_due_days(14).is_ok());
        assert!(policy.check_due_days(0).is_err());
        assert!(policy.check_due_days(31).is_err());
    }
}
