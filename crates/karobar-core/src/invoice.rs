//! # Invoice Aggregation
//!
//! Combines line results with payment fields into invoice totals and a net
//! balance.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Invoice Aggregation                                 │
//! │                                                                         │
//! │  SALES                              PURCHASE                            │
//! │  ─────                              ────────                            │
//! │  subtotal  = Σ base_amount          total = Σ net_amount                │
//! │  tax       = Σ tax_amount                   (tax already folded in)     │
//! │  total     = subtotal + tax                                             │
//! │                                                                         │
//! │  BOTH: net_balance = total − amount_paid + previous_balance             │
//! │                                                                         │
//! │  net_balance < 0  ⇒  counterparty advance. The sign is preserved        │
//! │  through to display, never inverted.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! An invoice is constructed fresh per entry session and cleared on
//! successful submission or explicit reset. Selecting a different
//! counterparty resets the balance baseline AND the amount paid, so a stale
//! balance can never leak into the new party's invoice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::numeric::{coerce, coerce_signed, round2};
use crate::purchase::PurchaseLine;
use crate::sales::SalesLine;

// =============================================================================
// Sales Invoice
// =============================================================================

/// A sales invoice under entry.
///
/// Lines keep insertion order; order is display-only, never semantic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesInvoice {
    /// Selected customer (business code). Empty until selected.
    pub customer_code: String,
    /// Customer label for display ("C001 — Name").
    pub customer_display: String,
    /// Selected salesman code. Empty until selected.
    pub salesman_code: String,
    /// Salesman label for display.
    pub salesman_display: String,
    /// Invoice date. Required before submission.
    pub date: Option<NaiveDate>,
    /// Ordered line items.
    pub lines: Vec<SalesLine>,
    /// Amount paid at entry time (≥ 0).
    pub amount_paid: f64,
    /// Previous balance applied to this invoice. Signed: negative = advance.
    pub previous_balance: f64,
    /// Balance as fetched from the server, before any local edits.
    ///
    /// Submitted alongside the invoice so the server can detect drift.
    pub balance_baseline: f64,
}

/// Aggregated totals for a sales invoice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub previous_balance: f64,
    /// total − paid + previous. Negative = customer advance.
    pub net_balance: f64,
}

impl SalesInvoice {
    /// Creates a fresh invoice for a new entry session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the customer, resetting payment fields and the balance
    /// baseline so the prior party's figures cannot leak in.
    pub fn select_customer(&mut self, code: impl Into<String>, display: impl Into<String>) {
        self.customer_code = code.into();
        self.customer_display = display.into();
        self.amount_paid = 0.0;
        self.previous_balance = 0.0;
        self.balance_baseline = 0.0;
    }

    /// Selects the salesman.
    pub fn select_salesman(&mut self, code: impl Into<String>, display: impl Into<String>) {
        self.salesman_code = code.into();
        self.salesman_display = display.into();
    }

    /// Applies a fetched customer balance as the baseline.
    pub fn apply_balance(&mut self, balance: f64) {
        self.balance_baseline = balance;
        self.previous_balance = balance;
    }

    /// Sets the amount paid from raw field text.
    pub fn set_amount_paid(&mut self, raw: &str) {
        self.amount_paid = coerce(raw);
    }

    /// Appends a line. Insertion order is preserved.
    pub fn add_line(&mut self, line: SalesLine) {
        self.lines.push(line);
    }

    /// Removes a line by position.
    pub fn remove_line(&mut self, index: usize) -> Option<SalesLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    /// Clears all lines, keeping the header fields.
    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    /// Resets the whole invoice to a fresh entry session.
    pub fn reset(&mut self) {
        *self = SalesInvoice::new();
    }

    /// Aggregates line amounts and payment fields.
    ///
    /// Runs at full precision - rounding happens only when a payload is
    /// built for submission.
    pub fn totals(&self) -> SalesTotals {
        let mut subtotal = 0.0;
        let mut tax_amount = 0.0;
        for line in &self.lines {
            let amounts = line.price();
            subtotal += amounts.base_amount;
            tax_amount += amounts.tax_amount;
        }
        let total_amount = subtotal + tax_amount;
        SalesTotals {
            subtotal,
            tax_amount,
            total_amount,
            amount_paid: self.amount_paid,
            previous_balance: self.previous_balance,
            net_balance: total_amount - self.amount_paid + self.previous_balance,
        }
    }
}

// =============================================================================
// Purchase Invoice
// =============================================================================

/// A purchase invoice under entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseInvoice {
    /// Selected supplier (business code). Empty until selected.
    pub supplier_code: String,
    /// Supplier label for display.
    pub supplier_display: String,
    /// Supplier's invoice number, entered by the operator.
    pub invoice_no: String,
    /// Last recorded invoice number for the supplier, display-only.
    pub last_invoice: String,
    /// Invoice date. Required before submission.
    pub date: Option<NaiveDate>,
    /// Ordered line items.
    pub lines: Vec<PurchaseLine>,
    /// Amount paid to the supplier at entry time (≥ 0).
    pub amount_paid: f64,
    /// Previous balance with the supplier. Signed: negative = advance.
    pub previous_balance: f64,
}

/// Aggregated totals for a purchase invoice.
///
/// Purchase lines fold discount and tax into `net_amount`, so there is a
/// single total rather than a subtotal/tax split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseTotals {
    pub total_amount: f64,
    pub amount_paid: f64,
    pub previous_balance: f64,
    /// total − paid + previous. Negative = supplier advance.
    pub net_balance: f64,
}

impl PurchaseInvoice {
    /// Creates a fresh invoice for a new entry session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the supplier, resetting payment fields so the prior party's
    /// figures cannot leak in.
    pub fn select_supplier(&mut self, code: impl Into<String>, display: impl Into<String>) {
        self.supplier_code = code.into();
        self.supplier_display = display.into();
        self.amount_paid = 0.0;
        self.previous_balance = 0.0;
    }

    /// Sets the amount paid from raw field text.
    pub fn set_amount_paid(&mut self, raw: &str) {
        self.amount_paid = coerce(raw);
    }

    /// Sets the previous balance from raw field text. Sign is kept: a
    /// negative entry records an advance with the supplier.
    pub fn set_previous_balance(&mut self, raw: &str) {
        self.previous_balance = coerce_signed(raw);
    }

    /// Appends a line. Insertion order is preserved.
    pub fn add_line(&mut self, line: PurchaseLine) {
        self.lines.push(line);
    }

    /// Removes a line by position.
    pub fn remove_line(&mut self, index: usize) -> Option<PurchaseLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    /// Clears all lines, keeping the header fields.
    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    /// Resets the whole invoice to a fresh entry session.
    pub fn reset(&mut self) {
        *self = PurchaseInvoice::new();
    }

    /// Aggregates line amounts and payment fields at full precision.
    pub fn totals(&self) -> PurchaseTotals {
        let total_amount: f64 = self.lines.iter().map(|line| line.net_amount()).sum();
        PurchaseTotals {
            total_amount,
            amount_paid: self.amount_paid,
            previous_balance: self.previous_balance,
            net_balance: total_amount - self.amount_paid + self.previous_balance,
        }
    }

    /// Subtotal as submitted: 2-decimal rounding applied here and nowhere
    /// earlier.
    pub fn submission_subtotal(&self) -> f64 {
        round2(self.totals().total_amount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::SalesField;

    fn sales_line(qty: &str, price: &str, discount: &str, tax: &str) -> SalesLine {
        let mut line = SalesLine::new("IT001", "Rice 5kg");
        line.apply_edit(SalesField::TradePrice, price).unwrap();
        line.apply_edit(SalesField::Quantity, qty).unwrap();
        line.apply_edit(SalesField::DiscountPercent, discount).unwrap();
        line.apply_edit(SalesField::TaxPercent, tax).unwrap();
        line
    }

    #[test]
    fn test_sales_totals_across_lines() {
        let mut invoice = SalesInvoice::new();
        invoice.add_line(sales_line("10", "100", "10", "5")); // base 900, tax 45
        invoice.add_line(sales_line("2", "50", "0", "0")); // base 100, tax 0

        let totals = invoice.totals();
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.tax_amount, 45.0);
        assert_eq!(totals.total_amount, 1045.0);
    }

    #[test]
    fn test_net_balance_formula_and_advance_sign() {
        let mut invoice = SalesInvoice::new();
        invoice.add_line(sales_line("2", "50", "0", "0")); // total 100
        invoice.set_amount_paid("300");
        invoice.apply_balance(50.0);

        // 100 − 300 + 50 = −150: a customer advance, sign preserved.
        assert_eq!(invoice.totals().net_balance, -150.0);
    }

    #[test]
    fn test_customer_switch_resets_payment_fields() {
        let mut invoice = SalesInvoice::new();
        invoice.select_customer("C001", "C001 — Ahmed Stores");
        invoice.apply_balance(420.0);
        invoice.set_amount_paid("100");

        invoice.select_customer("C002", "C002 — Bilal Traders");
        assert_eq!(invoice.amount_paid, 0.0);
        assert_eq!(invoice.previous_balance, 0.0);
        assert_eq!(invoice.balance_baseline, 0.0);
    }

    #[test]
    fn test_remove_line_by_position() {
        let mut invoice = SalesInvoice::new();
        invoice.add_line(sales_line("1", "10", "0", "0"));
        invoice.add_line(sales_line("2", "20", "0", "0"));

        let removed = invoice.remove_line(0).unwrap();
        assert_eq!(removed.quantity, 1.0);
        assert_eq!(invoice.lines.len(), 1);
        assert!(invoice.remove_line(5).is_none());
    }

    #[test]
    fn test_purchase_totals_fold_tax() {
        let mut invoice = PurchaseInvoice::new();
        let mut line = PurchaseLine::new("IT002", "Tea 250g");
        line.quantity = 8.0;
        line.bonus = 2.0;
        line.purchase_rate = 50.0;
        invoice.add_line(line); // net 400

        let mut second = PurchaseLine::new("IT003", "Sugar 1kg");
        second.quantity = 10.0;
        second.purchase_rate = 100.0;
        second.discount_percent = 10.0;
        second.tax_percent = 17.0;
        invoice.add_line(second); // net 1053

        let totals = invoice.totals();
        assert!((totals.total_amount - 1453.0).abs() < 1e-9);

        invoice.set_amount_paid("1000");
        invoice.set_previous_balance("-53");
        // 1453 − 1000 − 53 = 400
        assert!((invoice.totals().net_balance - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_submission_subtotal_rounds_last() {
        let mut invoice = PurchaseInvoice::new();
        for _ in 0..3 {
            let mut line = PurchaseLine::new("IT", "x");
            line.quantity = 1.0;
            line.purchase_rate = 33.335;
            invoice.add_line(line);
        }
        // Sum at full precision (100.005), round once at the boundary.
        assert_eq!(invoice.submission_subtotal(), round2(33.335 * 3.0));
    }

    #[test]
    fn test_supplier_switch_resets_payment_fields() {
        let mut invoice = PurchaseInvoice::new();
        invoice.select_supplier("S001", "S001 — Karachi Wholesale");
        invoice.set_amount_paid("500");
        invoice.set_previous_balance("250");

        invoice.select_supplier("S002", "S002 — Lahore Depot");
        assert_eq!(invoice.amount_paid, 0.0);
        assert_eq!(invoice.previous_balance, 0.0);
    }
}
