//! # Purchase Line Pricing
//!
//! Per-line computation for purchase entries: bonus-blended effective rate,
//! discount, tax, net line amount.
//!
//! ## Bonus Blending
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Supplier ships 8 paid units + 2 bonus units at rate 50                 │
//! │                                                                         │
//! │  effective_rate = 8 · 50 / (8 + 2) = 40.00                              │
//! │                                                                         │
//! │  Bonus units are free goods; blending spreads the paid cost across      │
//! │  ALL received units so unit cost reflects true landed cost.             │
//! │                                                                         │
//! │  net_amount then applies that rate to the COMBINED quantity:            │
//! │  (8 + 2) · 40.00 = 400.00  (= what was actually paid, pre discount/tax) │
//! │                                                                         │
//! │  Contrast with the sales side, where bonus never prices at all.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::numeric::coerce;

// =============================================================================
// Purchase Line
// =============================================================================

/// One line of a purchase invoice.
///
/// No explicit trade-off rate here: the effective rate is always derived
/// from quantity, bonus, and the entered purchase rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseLine {
    /// Item code (business key).
    pub code: String,

    /// Item name at the time the line was added.
    pub name: String,

    /// Base unit of measure.
    pub base_unit: String,

    /// Paid quantity.
    pub quantity: f64,

    /// Free units shipped alongside the paid quantity.
    pub bonus: f64,

    /// Paid unit rate as entered.
    pub purchase_rate: f64,

    /// Discount percentage (≥ 0).
    pub discount_percent: f64,

    /// Tax percentage (≥ 0).
    pub tax_percent: f64,
}

/// Field selector for [`PurchaseLine::apply_edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseField {
    Quantity,
    Bonus,
    PurchaseRate,
    DiscountPercent,
    TaxPercent,
}

impl PurchaseLine {
    /// Creates an empty line for an item picked from the catalogue.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        PurchaseLine {
            code: code.into(),
            name: name.into(),
            base_unit: String::new(),
            quantity: 0.0,
            bonus: 0.0,
            purchase_rate: 0.0,
            discount_percent: 0.0,
            tax_percent: 0.0,
        }
    }

    /// Blended unit cost across paid + bonus units.
    ///
    /// `quantity · purchase_rate / (quantity + bonus)` when both quantity
    /// and bonus are positive, otherwise the entered rate unchanged.
    ///
    /// ## Example
    /// ```rust
    /// use karobar_core::purchase::PurchaseLine;
    ///
    /// let mut line = PurchaseLine::new("IT002", "Tea 250g");
    /// line.quantity = 8.0;
    /// line.bonus = 2.0;
    /// line.purchase_rate = 50.0;
    /// assert_eq!(line.effective_rate(), 40.0);
    /// ```
    pub fn effective_rate(&self) -> f64 {
        if self.bonus > 0.0 && self.quantity > 0.0 {
            self.quantity * self.purchase_rate / (self.quantity + self.bonus)
        } else {
            self.purchase_rate
        }
    }

    /// Net line amount: discount and tax applied over the combined quantity
    /// at the blended rate.
    ///
    /// Unlike the sales side, the rate multiplies quantity + bonus - the
    /// effective rate already amortizes the bonus.
    pub fn net_amount(&self) -> f64 {
        (self.quantity + self.bonus)
            * self.effective_rate()
            * (1.0 - self.discount_percent / 100.0)
            * (1.0 + self.tax_percent / 100.0)
    }

    /// Applies a single field edit.
    ///
    /// Purchase lines have no paired-field derivation; every field is an
    /// independent coerced input.
    pub fn apply_edit(&mut self, field: PurchaseField, raw: &str) {
        let value = coerce(raw);
        match field {
            PurchaseField::Quantity => self.quantity = value,
            PurchaseField::Bonus => self.bonus = value,
            PurchaseField::PurchaseRate => self.purchase_rate = value,
            PurchaseField::DiscountPercent => self.discount_percent = value,
            PurchaseField::TaxPercent => self.tax_percent = value,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_bonus_blending() {
        // quantity=8, bonus=2, rate=50 → effective 8·50/10 = 40.00
        // no discount/tax → net = 10 · 40 = 400.00
        let mut line = PurchaseLine::new("IT002", "Tea 250g");
        line.apply_edit(PurchaseField::Quantity, "8");
        line.apply_edit(PurchaseField::Bonus, "2");
        line.apply_edit(PurchaseField::PurchaseRate, "50");

        assert_eq!(line.effective_rate(), 40.0);
        assert_eq!(line.net_amount(), 400.0);
    }

    #[test]
    fn test_no_bonus_effective_rate_is_exact() {
        // bonus=0 ⇒ effective_rate == purchase_rate with no float drift
        let mut line = PurchaseLine::new("IT", "x");
        line.quantity = 7.0;
        line.purchase_rate = 33.33;
        assert_eq!(line.effective_rate(), 33.33);
    }

    #[test]
    fn test_bonus_without_quantity_keeps_entered_rate() {
        let mut line = PurchaseLine::new("IT", "x");
        line.bonus = 3.0;
        line.purchase_rate = 20.0;
        assert_eq!(line.effective_rate(), 20.0);
    }

    #[test]
    fn test_net_amount_discount_and_tax() {
        let mut line = PurchaseLine::new("IT", "x");
        line.quantity = 10.0;
        line.purchase_rate = 100.0;
        line.discount_percent = 10.0;
        line.tax_percent = 17.0;

        // 10 · 100 · 0.9 · 1.17 = 1053.00
        assert!((line.net_amount() - 1053.0).abs() < 1e-9);
    }

    #[test]
    fn test_blended_net_equals_paid_amount_pre_adjustments() {
        // With no discount/tax, the net amount equals quantity · rate
        // regardless of bonus: blending conserves the amount actually paid.
        let mut line = PurchaseLine::new("IT", "x");
        line.quantity = 12.0;
        line.bonus = 3.0;
        line.purchase_rate = 41.5;
        assert!((line.net_amount() - 12.0 * 41.5).abs() < 1e-9);
    }
}
