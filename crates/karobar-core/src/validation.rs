//! # Pre-Submission Validation
//!
//! Required-field checks that must pass BEFORE any network call. Failures
//! return the entry to draft with a typed, field-level error; no request is
//! ever attempted.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Field coercion (numeric.rs)                                   │
//! │  ├── Invalid text silently becomes 0 - screen always renders            │
//! │  └── Not an error by design                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Edit-time invariants (sales.rs apply_edit)                    │
//! │  ├── Rate ≤ trade price, discount ∈ [0,100]                             │
//! │  └── Rejected edits keep the prior value                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE - submission gate                                 │
//! │  ├── Counterparty selected, date present                                │
//! │  ├── At least one line, every line quantity > 0                         │
//! │  └── Purchase: supplier's invoice number entered                        │
//! │                                                                         │
//! │  Server-side checks (stock, ledger) happen after, over the wire.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreResult, ValidationError};
use crate::invoice::{PurchaseInvoice, SalesInvoice};

/// Validates a sales invoice for submission.
///
/// ## Rules
/// - Customer and salesman both selected
/// - Date present
/// - At least one line
/// - Every line has quantity > 0
pub fn validate_sales_submit(invoice: &SalesInvoice) -> CoreResult<()> {
    if invoice.customer_code.is_empty() {
        return Err(ValidationError::Required { field: "customer" });
    }
    if invoice.salesman_code.is_empty() {
        return Err(ValidationError::Required { field: "salesman" });
    }
    if invoice.date.is_none() {
        return Err(ValidationError::Required { field: "date" });
    }
    if invoice.lines.is_empty() {
        return Err(ValidationError::NoLines);
    }
    for line in &invoice.lines {
        if line.quantity <= 0.0 {
            return Err(ValidationError::MissingQuantity {
                code: line.code.clone(),
            });
        }
    }
    Ok(())
}

/// Validates a purchase invoice for submission.
///
/// ## Rules
/// - Supplier selected
/// - Supplier's invoice number entered
/// - Date present
/// - At least one line
/// - Every line has quantity > 0
pub fn validate_purchase_submit(invoice: &PurchaseInvoice) -> CoreResult<()> {
    if invoice.supplier_code.is_empty() {
        return Err(ValidationError::Required { field: "supplier" });
    }
    if invoice.invoice_no.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "invoice number",
        });
    }
    if invoice.date.is_none() {
        return Err(ValidationError::Required { field: "date" });
    }
    if invoice.lines.is_empty() {
        return Err(ValidationError::NoLines);
    }
    for line in &invoice.lines {
        if line.quantity <= 0.0 {
            return Err(ValidationError::MissingQuantity {
                code: line.code.clone(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
