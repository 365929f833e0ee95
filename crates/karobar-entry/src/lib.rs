//! # karobar-entry: Entry Sessions & Submission Protocol
//!
//! The async layer between the pure pricing core and the console API.
//!
//! ## What Lives Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        karobar-entry                                    │
//! │                                                                         │
//! │  api.rs      InvoiceGateway trait + wire payload/receipt types          │
//! │  submit.rs   Submission protocol: validate → submit → one-shot          │
//! │              negative-stock override retry, with a timeout boundary     │
//! │  lookup.rs   Sequence-guarded balance lookups (stale responses are      │
//! │              discarded, not applied)                                    │
//! │  session.rs  Per-screen entry sessions owning their invoice state       │
//! │  error.rs    GatewayError / EntryError taxonomy                         │
//! │                                                                         │
//! │  CONCURRENCY MODEL                                                      │
//! │  ─────────────────                                                      │
//! │  Pricing recomputation is synchronous per field edit. The only async    │
//! │  operations are gateway calls: balance/payable lookups and invoice      │
//! │  submission. The override retry is the single case of an automatic      │
//! │  second call, and it fires only after the first call's rejection        │
//! │  resolves - never concurrently. Each entry session owns its invoice     │
//! │  exclusively.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod error;
pub mod lookup;
pub mod session;
pub mod submit;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use api::{InvoiceGateway, StockShortage, SubmitReceipt};
pub use error::{EntryError, EntryResult, GatewayError};
pub use lookup::{LookupGuard, LookupTicket};
pub use session::{PaymentSession, PurchaseSession, SalesSession};
pub use submit::{SubmitOutcome, SubmitState, Submitter};
