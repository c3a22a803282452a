//! Error taxonomy for the circulation engine.
//!
//! Expected business conditions are data, not panics: every denial carries
//! a typed reason so callers can present precise feedback.

use thiserror::Error;

/// Why an otherwise well-formed request was refused by business rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The reader's account is inactive.
    InactiveReader,
    /// The reader holds at least one overdue open issue.
    HasOverdue,
    /// The reader is at the open-issue limit.
    LimitReached,
    /// The target copy is not available to this reader.
    CopyUnavailable,
    /// The issue has already been renewed the maximum number of times.
    RenewalLimit,
    /// The issue is already closed.
    AlreadyReturned,
    /// The reader already holds an active reservation for this title.
    DuplicateReservation,
    /// A copy of the title is on the shelf; no reservation is needed.
    CopyAvailable,
    /// The copy is not in a circulating state (reserved, lost, or damaged).
    NotCirculating,
}

impl DenialReason {
    /// Stable machine-readable code, used as the HTTP error code.
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::InactiveReader => "inactive_reader",
            DenialReason::HasOverdue => "has_overdue",
            DenialReason::LimitReached => "limit_reached",
            DenialReason::CopyUnavailable => "copy_unavailable",
            DenialReason::RenewalLimit => "renewal_limit",
            DenialReason::AlreadyReturned => "already_returned",
            DenialReason::DuplicateReservation => "duplicate_reservation",
            DenialReason::CopyAvailable => "copy_available",
            DenialReason::NotCirculating => "not_circulating",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DenialReason::InactiveReader => "reader account is inactive",
            DenialReason::HasOverdue => "reader has an overdue issue",
            DenialReason::LimitReached => "reader reached the open-issue limit",
            DenialReason::CopyUnavailable => "copy is not available",
            DenialReason::RenewalLimit => "renewal limit reached",
            DenialReason::AlreadyReturned => "issue is already returned",
            DenialReason::DuplicateReservation => {
                "reader already holds an active reservation for this title"
            }
            DenialReason::CopyAvailable => "a copy of this title is currently available",
            DenialReason::NotCirculating => "copy is not in a circulating state",
        };
        f.write_str(text)
    }
}

/// Error type for every circulation operation.
#[derive(Error, Debug)]
pub enum CirculationError {
    /// Malformed input, rejected before any state change.
    #[error("validation error: {0}")]
    Validation(String),

    /// Expected business-rule denial; non-fatal, typed.
    #[error("denied: {0}")]
    Denied(DenialReason),

    /// Lost a compare-and-swap or commit race. The caller should re-fetch
    /// and decide; the engine never retries on its own.
    #[error("concurrent update conflict")]
    Conflict,

    /// Unknown entity id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Datastore failure; the whole request rolls back.
    #[error("datastore failure: {0}")]
    Store(String),
}

impl CirculationError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Shorthand used across the engine.
pub type CircResult<T> = Result<T, CirculationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_codes_are_stable() {
        assert_eq!(DenialReason::HasOverdue.code(), "has_overdue");
        assert_eq!(DenialReason::CopyUnavailable.code(), "copy_unavailable");
    }

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = CirculationError::not_found("issue", "abc");
        assert_eq!(err.to_string(), "issue not found: abc");
    }
}
