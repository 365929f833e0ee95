//! # Sales Line Pricing
//!
//! Per-line computation for sales entries: the discount ↔ rate round-trip,
//! tax, and line totals.
//!
//! ## Field Derivation (two-way binding, made explicit)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Discount ↔ Trade-Off Rate Derivation                      │
//! │                                                                         │
//! │  Edit RATE ──────► guard: rate ≤ trade price (reject, keep prior)       │
//! │                    discount% = (trade_price − rate) / trade_price · 100 │
//! │                                                                         │
//! │  Edit DISCOUNT% ─► rate = trade_price · (1 − discount% / 100)           │
//! │                                                                         │
//! │  Edit T.PRICE ───► rate re-derived from the standing discount%          │
//! │                    (only when discount% > 0)                            │
//! │                                                                         │
//! │  trade_price == 0 ──► derivation skipped, edited field kept as typed    │
//! │                       (no division by zero, no recompute)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Bonus Asymmetry
//! Bonus units deduct stock at submission but do NOT price: `base_amount`
//! multiplies the paid quantity only. The purchase side blends bonus into
//! the effective rate instead - see [`crate::purchase`]. This asymmetry is
//! deliberate and must be preserved.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::numeric::{coerce, round2, sanitize};

// =============================================================================
// Sales Line
// =============================================================================

/// One line of a sales invoice.
///
/// ## Rate Resolution
/// `trade_off_rate` is `None` until the operator touches the rate or
/// discount field; in that state the effective rate is derived from
/// `trade_price` and `discount_percent` on demand. Once set it is the
/// operator's explicit unit rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesLine {
    /// Item code (business key).
    pub code: String,

    /// Item name at the time the line was added.
    pub name: String,

    /// Base unit of measure ("Pieces", "Cartons", ...).
    pub base_unit: String,

    /// Pack size carried for display; not used in pricing.
    pub pack_size: Option<String>,

    /// Supplier company, carried through to the submission payload.
    pub company_name: String,

    /// Paid quantity. Prices AND deducts stock.
    pub quantity: f64,

    /// Free units. Deducts stock at submission, never prices.
    pub bonus: f64,

    /// List unit price before discount.
    pub trade_price: f64,

    /// Discount percentage in [0, 100].
    pub discount_percent: f64,

    /// Effective discounted unit rate, once explicitly set.
    pub trade_off_rate: Option<f64>,

    /// Sales tax percentage (≥ 0).
    pub tax_percent: f64,
}

/// Field selector for [`SalesLine::apply_edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesField {
    Quantity,
    Bonus,
    TradePrice,
    DiscountPercent,
    TradeOffRate,
    TaxPercent,
}

/// Computed amounts for one sales line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesLineAmounts {
    /// quantity × effective rate.
    pub base_amount: f64,
    /// base × tax% / 100.
    pub tax_amount: f64,
    /// base + tax.
    pub line_total: f64,
    /// trade price − effective rate, per unit.
    pub discount_value: f64,
}

impl SalesLine {
    /// Creates an empty line for an item picked from the catalogue.
    ///
    /// Trade price and tax default from the item record via the field
    /// setters; everything else starts at zero.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        SalesLine {
            code: code.into(),
            name: name.into(),
            base_unit: String::new(),
            pack_size: None,
            company_name: String::new(),
            quantity: 0.0,
            bonus: 0.0,
            trade_price: 0.0,
            discount_percent: 0.0,
            trade_off_rate: None,
            tax_percent: 0.0,
        }
    }

    /// Resolves the effective unit rate for pricing.
    ///
    /// Explicitly set rate wins; otherwise derived as
    /// `trade_price · (1 − discount% / 100)`.
    pub fn resolved_rate(&self) -> f64 {
        match self.trade_off_rate {
            Some(rate) => sanitize(rate),
            None => self.trade_price * (1.0 - self.discount_percent / 100.0),
        }
    }

    /// Prices the line.
    ///
    /// ## Example
    /// ```rust
    /// use karobar_core::sales::SalesLine;
    ///
    /// let mut line = SalesLine::new("IT001", "Rice 5kg");
    /// line.quantity = 10.0;
    /// line.trade_price = 100.0;
    /// line.discount_percent = 10.0;
    /// line.tax_percent = 5.0;
    ///
    /// let amounts = line.price();
    /// assert_eq!(amounts.base_amount, 900.0);
    /// assert_eq!(amounts.tax_amount, 45.0);
    /// assert_eq!(amounts.line_total, 945.0);
    /// ```
    pub fn price(&self) -> SalesLineAmounts {
        let rate = sanitize(self.resolved_rate());
        let base_amount = self.quantity * rate;
        let tax_amount = base_amount * (self.tax_percent / 100.0);
        SalesLineAmounts {
            base_amount,
            tax_amount,
            line_total: base_amount + tax_amount,
            discount_value: self.trade_price - rate,
        }
    }

    /// Applies a single field edit, keeping discount% and rate consistent.
    ///
    /// This is the explicit reducer behind the entry form's two-way binding.
    /// Precedence rule: the edited field is authoritative and the paired
    /// field is recomputed from it; a trade-price edit re-derives the rate
    /// from the standing discount. When `trade_price == 0` the derivation is
    /// skipped entirely and the edited field is kept as typed.
    ///
    /// ## Errors
    /// - [`ValidationError::RateAboveTradePrice`] - rate edits above the
    ///   trade price are rejected outright; the line keeps its prior value
    /// - [`ValidationError::DiscountOutOfRange`] - discount edits outside
    ///   [0, 100] are rejected the same way
    pub fn apply_edit(&mut self, field: SalesField, raw: &str) -> CoreResult<()> {
        match field {
            SalesField::Quantity => self.quantity = coerce(raw),
            SalesField::Bonus => self.bonus = coerce(raw),
            SalesField::TaxPercent => self.tax_percent = coerce(raw),

            SalesField::TradeOffRate => {
                let rate = coerce(raw);
                if self.trade_price > 0.0 && rate > self.trade_price {
                    return Err(ValidationError::RateAboveTradePrice {
                        rate,
                        trade_price: self.trade_price,
                    });
                }
                self.trade_off_rate = Some(rate);
                if self.trade_price > 0.0 {
                    let discount = (self.trade_price - rate) / self.trade_price * 100.0;
                    self.discount_percent = round2(discount);
                }
            }

            SalesField::DiscountPercent => {
                let discount = coerce(raw);
                if !(0.0..=100.0).contains(&discount) {
                    return Err(ValidationError::DiscountOutOfRange { value: discount });
                }
                self.discount_percent = discount;
                if self.trade_price > 0.0 {
                    let rate = self.trade_price * (1.0 - discount / 100.0);
                    self.trade_off_rate = Some(round2(rate));
                }
            }

            SalesField::TradePrice => {
                self.trade_price = coerce(raw);
                if self.discount_percent > 0.0 && self.trade_price > 0.0 {
                    let rate = self.trade_price * (1.0 - self.discount_percent / 100.0);
                    self.trade_off_rate = Some(round2(rate));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
