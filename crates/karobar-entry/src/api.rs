//! # Invoice Gateway
//!
//! Wire payloads and the async seam to the backing service.
//!
//! ## Payload Construction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Draft → Wire Payload                                │
//! │                                                                         │
//! │  SalesInvoice ──────► SalesInvoicePayload                               │
//! │    lines                items: [SalesLinePayload]                       │
//! │    (f64 working         tradeOffPrice  = round2(resolved rate)          │
//! │     values, never       tradeOffTotal  = round2(net balance)            │
//! │     rounded while       previousBalance = round2(baseline)              │
//! │     editing)                                                            │
//! │                                                                         │
//! │  PurchaseInvoice ───► PurchaseInvoicePayload                            │
//! │    lines                purchaseRate = blended effective rate           │
//! │                         subtotal     = round2(total)                    │
//! │                                                                         │
//! │  Rounding happens HERE, at the submission boundary, and only here.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gateway trait owns transport and auth; the engine never sees a URL.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use karobar_core::{
    numeric::round2, PayableSnapshot, PaymentRequest, PurchaseInvoice, SalesInvoice,
};

// =============================================================================
// Sales Payloads
// =============================================================================

/// One sales line as the server accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLinePayload {
    pub item_code: String,
    pub quantity: f64,
    /// Bonus units ship with the invoice but never price it.
    pub bonus: f64,
    pub discount_percent: f64,
    pub trade_price: f64,
    /// The effective per-unit rate, rounded to 2 decimals.
    pub trade_off_price: f64,
    pub tax_percent: f64,
    pub company_name: String,
}

/// A complete sales invoice submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesInvoicePayload {
    pub customer_code: String,
    pub salesman_code: String,
    pub date: NaiveDate,
    pub amount_paid: f64,
    /// The balance as fetched at customer selection, NOT the computed
    /// net balance. The server derives its own running ledger.
    pub previous_balance: f64,
    /// The NET balance (total − paid + previous), rounded at this boundary.
    pub trade_off_total: f64,
    pub allow_negative_stock: bool,
    pub items: Vec<SalesLinePayload>,
}

impl SalesInvoicePayload {
    /// Builds the wire payload from a validated draft.
    ///
    /// ## Preconditions
    /// The draft passed [`karobar_core::validation::validate_sales_submit`],
    /// so customer, salesman, and date are present and every line has a
    /// positive quantity.
    pub fn from_draft(draft: &SalesInvoice, allow_negative_stock: bool) -> SalesInvoicePayload {
        let items = draft
            .lines
            .iter()
            .map(|line| SalesLinePayload {
                item_code: line.code.clone(),
                quantity: line.quantity,
                bonus: line.bonus,
                discount_percent: line.discount_percent,
                trade_price: line.trade_price,
                trade_off_price: round2(line.resolved_rate()),
                tax_percent: line.tax_percent,
                company_name: line.company_name.clone(),
            })
            .collect();
        let totals = draft.totals();
        SalesInvoicePayload {
            customer_code: draft.customer_code.clone(),
            salesman_code: draft.salesman_code.clone(),
            date: draft.date.unwrap_or_default(),
            amount_paid: draft.amount_paid,
            previous_balance: round2(draft.balance_baseline),
            trade_off_total: round2(totals.net_balance),
            allow_negative_stock,
            items,
        }
    }
}

// =============================================================================
// Purchase Payloads
// =============================================================================

/// One purchase line as the server accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLinePayload {
    pub item_code: String,
    pub quantity: f64,
    pub bonus: f64,
    pub discount_percent: f64,
    pub tax_percent: f64,
    /// The blended effective rate when bonus units dilute the nominal
    /// rate, otherwise the nominal rate unchanged.
    pub purchase_rate: f64,
}

/// A complete purchase invoice submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInvoicePayload {
    pub supplier_code: String,
    pub invoice_no: String,
    pub date: NaiveDate,
    pub amount_paid: f64,
    pub previous_balance: f64,
    pub subtotal: f64,
    pub allow_negative_stock: bool,
    pub items: Vec<PurchaseLinePayload>,
}

impl PurchaseInvoicePayload {
    /// Builds the wire payload from a validated draft.
    pub fn from_draft(
        draft: &PurchaseInvoice,
        allow_negative_stock: bool,
    ) -> PurchaseInvoicePayload {
        let items = draft
            .lines
            .iter()
            .map(|line| PurchaseLinePayload {
                item_code: line.code.clone(),
                quantity: line.quantity,
                bonus: line.bonus,
                discount_percent: line.discount_percent,
                tax_percent: line.tax_percent,
                purchase_rate: line.effective_rate(),
            })
            .collect();
        PurchaseInvoicePayload {
            supplier_code: draft.supplier_code.clone(),
            invoice_no: draft.invoice_no.clone(),
            date: draft.date.unwrap_or_default(),
            amount_paid: draft.amount_paid,
            previous_balance: draft.previous_balance,
            subtotal: draft.submission_subtotal(),
            allow_negative_stock,
            items,
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// One item the server could not cover from stock on hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortage {
    pub item_code: String,
    /// Units short, reported by the server. May be fractional.
    pub shortage: f64,
}

/// The warning block attached to an override-committed invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeStockWarning {
    /// Always `"NEGATIVE_STOCK"` on the wire.
    #[serde(rename = "type")]
    pub kind: String,
    pub items: Vec<StockShortage>,
}

/// Server acknowledgement of a committed invoice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    /// The next invoice number to prefill, when the server issues one.
    pub next_invoice: Option<String>,
    /// Present only when the commit drove stock negative.
    pub warnings: Option<NegativeStockWarning>,
}

/// Customer ledger balance at a point in time.
///
/// Positive means the customer owes; negative means they hold an advance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

/// Supplier payable position as the server reports it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayableResponse {
    pub payable: f64,
    pub receivable: f64,
    pub net: f64,
    pub opening: Option<f64>,
    pub purchase_total: Option<f64>,
    pub purchase_paid: Option<f64>,
    pub returns_total: Option<f64>,
    pub payments_total: Option<f64>,
}

impl From<PayableResponse> for PayableSnapshot {
    fn from(resp: PayableResponse) -> PayableSnapshot {
        let breakdown = match (
            resp.opening,
            resp.purchase_total,
            resp.purchase_paid,
            resp.returns_total,
            resp.payments_total,
        ) {
            (Some(opening), Some(purchase_total), Some(purchase_paid), Some(returns_total), Some(payments_total)) => {
                Some(karobar_core::PayableBreakdown {
                    opening,
                    purchase_total,
                    purchase_paid,
                    returns_total,
                    payments_total,
                })
            }
            _ => None,
        };
        PayableSnapshot {
            payable: resp.payable,
            receivable: resp.receivable,
            net: resp.net,
            breakdown,
        }
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// The async seam to the backing service.
///
/// Implementations own transport, base URLs, and auth headers. The engine
/// only depends on this trait, so tests script responses directly.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    /// Submits a sales invoice for commit.
    async fn post_sales(&self, payload: &SalesInvoicePayload)
        -> Result<SubmitReceipt, GatewayError>;

    /// Submits a purchase invoice for commit.
    async fn post_purchase(
        &self,
        payload: &PurchaseInvoicePayload,
    ) -> Result<SubmitReceipt, GatewayError>;

    /// Records a supplier payment against the outstanding payable.
    async fn post_supplier_payment(
        &self,
        payload: &PaymentRequest,
    ) -> Result<SubmitReceipt, GatewayError>;

    /// Fetches the current ledger balance for a customer.
    async fn customer_balance(&self, customer_code: &str)
        -> Result<BalanceResponse, GatewayError>;

    /// Fetches the current payable position for a supplier.
    async fn supplier_payable(&self, supplier_code: &str)
        -> Result<PayableResponse, GatewayError>;
}

// =============================================================================
// Unit Tests
// =============================================================================
