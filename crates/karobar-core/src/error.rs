//! # Error Types
//!
//! Domain-specific error types for karobar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  karobar-core errors (this file)                                        │
//! │  └── ValidationError  - Invariant violations and missing fields,        │
//! │                         caught BEFORE any network call                  │
//! │                                                                         │
//! │  karobar-entry errors (separate crate)                                  │
//! │  ├── GatewayError     - Stock shortage (typed, retryable once),         │
//! │  │                      transport failures, timeouts                    │
//! │  └── EntryError       - Validation | Gateway, what the UI sees          │
//! │                                                                         │
//! │  NOT an error: numeric coercion fallback. Invalid numeric text          │
//! │  silently becomes 0 so the screen always renders (see numeric.rs).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, amounts, item codes)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message; the host UI decides
//!    presentation (no alert side effects inside the engine)

use thiserror::Error;

/// Convenience type alias for Results with ValidationError.
pub type CoreResult<T> = Result<T, ValidationError>;

// =============================================================================
// Validation Error
// =============================================================================

/// Invariant violations and missing required fields.
///
/// These are all caught client-side, before any network call, and are never
/// surfaced as server errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// The invoice has no lines.
    #[error("Add at least one item before saving")]
    NoLines,

    /// A line is missing a positive quantity.
    ///
    /// ## When This Occurs
    /// An item was added to the invoice but its quantity field was left
    /// empty or zero at submission time.
    #[error("Quantity is required for item {code}")]
    MissingQuantity { code: String },

    /// Attempted to set the trade-off rate above the trade price.
    ///
    /// This is a hard invariant, not a clamp: the field keeps its prior
    /// value and the caller surfaces this warning.
    #[error("Rate {rate:.2} should not exceed trade price {trade_price:.2}")]
    RateAboveTradePrice { rate: f64, trade_price: f64 },

    /// Discount percentage outside [0, 100] on a sales line.
    #[error("Discount must be between 0 and 100 percent, got {value:.2}")]
    DiscountOutOfRange { value: f64 },

    /// The selected supplier has nothing outstanding to pay.
    #[error("Selected supplier has no outstanding payable")]
    NoPayable,

    /// The selected supplier is owed money, not owing it.
    ///
    /// Distinguished from [`ValidationError::NoPayable`] so the message can
    /// name the receivable case explicitly.
    #[error("Selected supplier currently has a receivable balance. No payment is due")]
    SupplierInReceivable,

    /// Payment amount is empty, non-finite, or not positive.
    #[error("Enter a valid payment amount")]
    InvalidPaymentAmount,

    /// Payment amount exceeds the outstanding payable beyond tolerance.
    #[error("Payment amount {amount:.2} cannot exceed outstanding payable {payable:.2}")]
    ExceedsPayable { amount: f64, payable: f64 },

    /// Non-cash payment mode without a bank selection.
    #[error("Select a bank for this payment mode")]
    BankRequired,

    /// Online payment without a transaction reference.
    #[error("Enter the transaction reference for online payments")]
    TransactionReferenceRequired,
}

// =============================================================================
// Unit Tests
// =============================================================================
