//! # Error Types
//!
//! Domain error types for webpos-core.
//!
//! ## Error Flow
//! ```text
//! ValidationError → CoreError → DbError (webpos-db) → caller / API layer
//! ```
//!
//! Invariant violations surface immediately to the caller and are never
//! silently corrected. Nothing in this layer retries.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Gift-card redemption exceeding the current balance.
    ///
    /// A normal failure result, not a fatal error: the balance is left
    /// unchanged and the caller reports it to the user.
    #[error("gift card {code}: balance {balance_cents} cannot cover {requested_cents}")]
    InsufficientBalance {
        code: String,
        balance_cents: i64,
        requested_cents: i64,
    },

    /// Operation against a deactivated gift card.
    #[error("gift card {code} is not active")]
    GiftCardInactive { code: String },

    /// Operation against a gift card past its expiry timestamp.
    #[error("gift card {code} expired at {expired_at}")]
    GiftCardExpired { code: String, expired_at: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level and cross-field validation failures.
///
/// Raised before any persistence happens; the write is never attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not a member of a closed choice set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Cross-field exclusivity: exactly one of two references must be set.
    ///
    /// Raised both when neither is set and when both are.
    #[error("exactly one of {first} or {second} must be set")]
    ExactlyOneOf { first: String, second: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
