//! # karobar-core: Pure Business Logic for Karobar
//!
//! This crate is the **heart** of the Karobar operations console. It contains
//! the invoice pricing and financial-reconciliation rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Karobar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Console Frontend (forms/reports)               │   │
//! │  │   Sales Entry ──► Purchase Entry ──► Payments ──► Profit UI     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ field-change events                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 karobar-entry (sessions, submission)            │   │
//! │  │   balance lookups, stock-override protocol, gateway trait       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ karobar-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐ │   │
//! │  │  │ numeric  │ │  sales   │ │ purchase │ │ invoice │ │ profit │ │   │
//! │  │  │ coercion │ │  pricer  │ │  pricer  │ │ totals  │ │ derive │ │   │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └─────────┘ └────────┘ │   │
//! │  │  ┌──────────┐ ┌───────────┐                                    │   │
//! │  │  │ payable  │ │validation │                                    │   │
//! │  │  │ gating   │ │  rules    │                                    │   │
//! │  │  └──────────┘ └───────────┘                                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`numeric`] - Coercion of user-entered text to safe floats
//! - [`sales`] - Sales line pricing and the discount ↔ rate derivation pair
//! - [`purchase`] - Purchase line pricing with bonus-blended effective rate
//! - [`invoice`] - Invoice aggregation and balance reconciliation
//! - [`payable`] - Supplier payable gating for payment entry
//! - [`profit`] - Realized/pending profit derivation and roll-ups
//! - [`validation`] - Pre-submission required-field checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system, and clock access is FORBIDDEN here
//! 3. **Round Late**: Amounts accumulate at full precision; 2-decimal rounding
//!    happens only at submission/display boundaries via [`numeric::round2`]
//! 4. **Explicit Errors**: Invariant violations are typed `Result`s, never
//!    alerts or panics - the host UI decides how to present them
//!
//! ## Example Usage
//!
//! ```rust
//! use karobar_core::sales::SalesLine;
//!
//! let mut line = SalesLine::new("IT001", "Rice 5kg");
//! line.quantity = 10.0;
//! line.trade_price = 100.0;
//! line.discount_percent = 10.0;
//!
//! let amounts = line.price();
//! // Rate 90.00, base 900.00
//! assert_eq!(amounts.base_amount, 900.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod numeric;
pub mod payable;
pub mod profit;
pub mod purchase;
pub mod sales;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use karobar_core::SalesLine` instead of
// `use karobar_core::sales::SalesLine`

pub use error::{CoreResult, ValidationError};
pub use invoice::{PurchaseInvoice, PurchaseTotals, SalesInvoice, SalesTotals};
pub use payable::{PayableBreakdown, PayableSnapshot, PaymentDraft, PaymentMode, PaymentRequest};
pub use profit::{BalanceFigure, ProfitLabel, ProfitRecord, ProfitSummary};
pub use purchase::PurchaseLine;
pub use sales::{SalesField, SalesLine, SalesLineAmounts};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tolerance for payment-vs-payable comparison, in currency units.
///
/// ## Why a tolerance?
/// Payable figures travel through float arithmetic on both sides of the API.
/// A payment of 500.009 against a payable of 500.00 is the same amount after
/// rounding; rejecting it would block legitimate full settlements.
pub const PAYABLE_TOLERANCE: f64 = 0.01;
