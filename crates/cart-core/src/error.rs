//! # Domain Errors
//!
//! Cart transitions never return errors: invalid input degrades to an
//! unchanged cart. The types here say *why* something was refused, for
//! snapshot loading, promo code parsing and logs.
//!
//! ```text
//! CoreError
//! ├── UnknownPromoCode(code)
//! └── Validation(ValidationError)
//!         ├── Required / OutOfRange / MustBePositive   field rules
//!         ├── DuplicateLine                            two lines, one key
//!         └── Inconsistent                             stored total ≠ fold
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Promo code is not recognised.
    ///
    /// ## When This Occurs
    /// - Shopper types a code at checkout that is not in the promo table
    #[error("Unknown promo code: {0}")]
    UnknownPromoCode(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Validation errors for products and persisted snapshots.
///
/// A persisted snapshot that produces any of these is discarded by the loader
/// and the cart starts empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Two cart lines share the same identity key.
    #[error("duplicate cart line for product '{product_id}'")]
    DuplicateLine { product_id: String },

    /// A stored derived field does not match the value recomputed from lines.
    #[error("{field} is {stored} but lines add up to {computed}")]
    Inconsistent {
        field: String,
        stored: i64,
        computed: i64,
    },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
