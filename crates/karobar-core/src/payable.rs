//! # Supplier Payable Gating
//!
//! Validates a payment draft against a fetched payable snapshot and builds
//! the submission payload.
//!
//! ## Gate Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Payment Gate (fail-fast order)                        │
//! │                                                                         │
//! │  1. supplier selected?          ──► Required("supplier")                │
//! │  2. payment date present?       ──► Required("payment date")            │
//! │  3. payable > 0?                ──► NoPayable                           │
//! │       └─ receivable > 0?        ──► SupplierInReceivable (named case)   │
//! │  4. amount finite and > 0?      ──► InvalidPaymentAmount                │
//! │  5. amount − payable ≤ 0.01?    ──► ExceedsPayable                      │
//! │  6. mode fields:                                                        │
//! │       cash   - nothing more                                             │
//! │       online - bank + transaction reference                             │
//! │       bank   - bank + slip date (defaulted to today, reference is       │
//! │                NEVER silently filled)                                   │
//! │                                                                         │
//! │  Pass ⇒ PaymentRequest with non-cash fields nulled for cash mode        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot is read-only server truth: payable, receivable and net are
//! never recomputed locally from a ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::numeric::{coerce, round2};
use crate::PAYABLE_TOLERANCE;

// =============================================================================
// Payable Snapshot
// =============================================================================

/// Supplier payable position as fetched per counterparty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PayableSnapshot {
    /// Amount we owe the supplier (≥ 0).
    pub payable: f64,
    /// Amount the supplier owes us (≥ 0).
    pub receivable: f64,
    /// Signed net: positive = we owe, negative = supplier owes us.
    pub net: f64,
    /// Itemized composition of the payable, display-only.
    pub breakdown: Option<PayableBreakdown>,
}

/// How the payable figure is composed. Display-only; never summed locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PayableBreakdown {
    pub opening: f64,
    pub purchase_total: f64,
    pub purchase_paid: f64,
    pub returns_total: f64,
    pub payments_total: f64,
}

// =============================================================================
// Payment Draft
// =============================================================================

/// Payment method for a supplier payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMode {
    #[default]
    Cash,
    Online,
    Bank,
}

/// In-progress supplier payment entry.
///
/// Mode-conditional fields follow the mode: switching clears whatever the
/// new mode does not use, and a successful submission resets everything to
/// cash defaults via [`PaymentDraft::reset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentDraft {
    /// Selected supplier (business code). Empty until selected.
    pub supplier_code: String,
    /// Supplier label for display.
    pub supplier_label: String,
    /// Payment date. Required before submission.
    pub payment_date: Option<NaiveDate>,
    pub mode: PaymentMode,
    /// Bank code, required for online and bank modes.
    pub bank_code: String,
    /// Transaction reference (online) / slip number (bank).
    pub slip_no: String,
    /// Slip date, bank mode only.
    pub slip_date: Option<NaiveDate>,
    /// Payment amount as coerced from field text.
    pub amount: f64,
    /// Whether the operator has typed into the amount field this session.
    /// Guards the pre-fill from overwriting a deliberate entry.
    pub amount_touched: bool,
    /// Optional remarks.
    pub details: String,
}

impl PaymentDraft {
    /// Fresh draft in cash-mode defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the supplier and pre-fills the amount from the payable.
    ///
    /// The pre-fill never overwrites an amount the operator already typed
    /// that diverges from the payable by more than the tolerance.
    pub fn select_supplier(
        &mut self,
        code: impl Into<String>,
        label: impl Into<String>,
        payable: f64,
    ) {
        self.supplier_code = code.into();
        self.supplier_label = label.into();
        self.details.clear();
        if self.amount_touched
            && self.amount > 0.0
            && (self.amount - payable).abs() > PAYABLE_TOLERANCE
        {
            return;
        }
        self.amount = if payable > 0.0 { round2(payable) } else { 0.0 };
        self.amount_touched = false;
    }

    /// Switches payment mode, clearing fields the new mode does not use.
    ///
    /// Bank mode defaults the slip date to `today` when unset; the
    /// transaction reference is never defaulted.
    pub fn set_mode(&mut self, mode: PaymentMode, today: NaiveDate) {
        self.mode = mode;
        match mode {
            PaymentMode::Cash => {
                self.bank_code.clear();
                self.slip_no.clear();
                self.slip_date = None;
            }
            PaymentMode::Online => {
                self.slip_date = None;
            }
            PaymentMode::Bank => {
                if self.slip_date.is_none() {
                    self.slip_date = Some(today);
                }
            }
        }
    }

    /// Sets the amount from raw field text.
    pub fn set_amount(&mut self, raw: &str) {
        self.amount = coerce(raw);
        self.amount_touched = true;
    }

    /// Resets to cash-mode defaults, as after a successful submission.
    pub fn reset(&mut self) {
        *self = PaymentDraft::new();
    }

    /// Gates the draft against the supplier's payable position.
    ///
    /// Returns the wire-ready request on success. See the module docs for
    /// the fail-fast order.
    pub fn gate(&self, snapshot: &PayableSnapshot, today: NaiveDate) -> CoreResult<PaymentRequest> {
        if self.supplier_code.is_empty() {
            return Err(ValidationError::Required { field: "supplier" });
        }
        let payment_date = self
            .payment_date
            .ok_or(ValidationError::Required {
                field: "payment date",
            })?;

        if snapshot.payable <= 0.0 {
            if snapshot.receivable > 0.0 {
                return Err(ValidationError::SupplierInReceivable);
            }
            return Err(ValidationError::NoPayable);
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::InvalidPaymentAmount);
        }
        if self.amount - snapshot.payable > PAYABLE_TOLERANCE {
            return Err(ValidationError::ExceedsPayable {
                amount: self.amount,
                payable: snapshot.payable,
            });
        }

        let slip_no = self.slip_no.trim();
        if self.mode != PaymentMode::Cash && self.bank_code.is_empty() {
            return Err(ValidationError::BankRequired);
        }
        if self.mode == PaymentMode::Online && slip_no.is_empty() {
            return Err(ValidationError::TransactionReferenceRequired);
        }
        // Bank mode: slip date defaults to today, the reference does not.
        let slip_date = match self.mode {
            PaymentMode::Bank => Some(self.slip_date.unwrap_or(today)),
            _ => None,
        };

        let is_cash = self.mode == PaymentMode::Cash;
        let details = self.details.trim();
        Ok(PaymentRequest {
            supplier_code: self.supplier_code.clone(),
            payment_date,
            amount: self.amount,
            details: (!details.is_empty()).then(|| details.to_string()),
            payment_mode: self.mode,
            bank_code: (!is_cash).then(|| self.bank_code.clone()),
            slip_no: (!is_cash && !slip_no.is_empty()).then(|| slip_no.to_string()),
            slip_date,
        })
    }
}

// =============================================================================
// Payment Request (wire shape)
// =============================================================================

/// Submission payload for `POST /supplier-payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentRequest {
    pub supplier_code: String,
    pub payment_date: NaiveDate,
    pub amount: f64,
    pub details: Option<String>,
    pub payment_mode: PaymentMode,
    pub bank_code: Option<String>,
    pub slip_no: Option<String>,
    pub slip_date: Option<NaiveDate>,
}

// =============================================================================
// Unit Tests
// =============================================================================
