//! # Profit Derivation
//!
//! Converts aggregate sales/cost/payment figures into realized vs. pending
//! profit, for single entities and for cross-entity roll-ups.
//!
//! ## Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Profit Derivation Rules                            │
//! │                                                                         │
//! │  invoice_profit   = total_sales − total_cost   (supplied upstream,      │
//! │                                                 never recomputed here)  │
//! │  realized_profit  = amount_paid − total_cost                            │
//! │  pending_profit   = invoice_profit − realized_profit                    │
//! │  outstanding_ratio = outstanding / total_sales · 100   (0 if sales ≤ 0) │
//! │                                                                         │
//! │  ROLL-UP RULE                                                           │
//! │  ────────────                                                           │
//! │  Sum every RAW field across rows first, then derive once from the       │
//! │  sums. Never average per-row ratios - a 2% ratio on a 1M row and a      │
//! │  50% ratio on a 100 row do not average to 26%.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows arrive pre-aggregated from the reporting endpoints; this module only
//! interprets them.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Profit Record
// =============================================================================

/// One pre-aggregated profit row (per invoice, company, customer, salesman,
/// or date, depending on the report).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfitRecord {
    pub total_sales: f64,
    pub total_cost: f64,
    /// total_sales − total_cost, computed upstream. Carried as supplied.
    pub invoice_profit: f64,
    pub amount_paid: f64,
    /// Uncollected balance (≥ 0 in practice).
    pub outstanding: f64,
    /// Pre-payment beyond what is owed (> 0 suppresses outstanding display).
    pub advance_amount: f64,
}

/// Sign label for a profit figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProfitLabel {
    /// Realized profit ≥ 0: "Gained Profit".
    GainedProfit,
    /// Realized profit < 0: "Loss".
    Loss,
}

impl fmt::Display for ProfitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitLabel::GainedProfit => write!(f, "Gained Profit"),
            ProfitLabel::Loss => write!(f, "Loss"),
        }
    }
}

/// Which balance figure a report card should show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "amount")]
#[ts(export)]
pub enum BalanceFigure {
    /// advance_amount > 0: show the advance, suppress outstanding.
    Advance(f64),
    /// Otherwise show outstanding (which may be 0).
    Outstanding(f64),
}

/// Derived profit metrics for one record or one roll-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfitSummary {
    /// amount_paid − total_cost.
    pub realized_profit: f64,
    /// invoice_profit − realized_profit.
    pub pending_profit: f64,
    /// outstanding / total_sales · 100, or 0 when sales ≤ 0.
    pub outstanding_ratio: f64,
    /// Sign label for the realized figure.
    pub label: ProfitLabel,
    /// Advance-vs-outstanding display rule applied.
    pub balance_figure: BalanceFigure,
    /// invoice_profit / total_cost · 100, or 0 when cost ≤ 0.
    pub invoice_margin: f64,
    /// realized_profit / total_cost · 100, or 0 when cost ≤ 0.
    pub realized_margin: f64,
    /// pending_profit / total_sales · 100, or 0 when sales ≤ 0.
    pub pending_share: f64,
}

impl ProfitRecord {
    /// Derives the profit metrics for this record.
    pub fn summarize(&self) -> ProfitSummary {
        let realized_profit = self.amount_paid - self.total_cost;
        let pending_profit = self.invoice_profit - realized_profit;

        let outstanding_ratio = if self.outstanding > 0.0 && self.total_sales > 0.0 {
            self.outstanding / self.total_sales * 100.0
        } else {
            0.0
        };

        let label = if realized_profit >= 0.0 {
            ProfitLabel::GainedProfit
        } else {
            ProfitLabel::Loss
        };

        let balance_figure = if self.advance_amount > 0.0 {
            BalanceFigure::Advance(self.advance_amount)
        } else {
            BalanceFigure::Outstanding(self.outstanding)
        };

        let over_cost = |value: f64| {
            if self.total_cost > 0.0 {
                value / self.total_cost * 100.0
            } else {
                0.0
            }
        };
        let pending_share = if self.total_sales > 0.0 {
            pending_profit / self.total_sales * 100.0
        } else {
            0.0
        };

        ProfitSummary {
            realized_profit,
            pending_profit,
            outstanding_ratio,
            label,
            balance_figure,
            invoice_margin: over_cost(self.invoice_profit),
            realized_margin: over_cost(realized_profit),
            pending_share,
        }
    }

    /// Rolls N records up into one by summing every raw field.
    ///
    /// Derivation then happens ONCE on the sums (`rollup(...).summarize()`),
    /// never by averaging per-row ratios.
    pub fn rollup<'a, I>(records: I) -> ProfitRecord
    where
        I: IntoIterator<Item = &'a ProfitRecord>,
    {
        let mut total = ProfitRecord::default();
        for record in records {
            total.total_sales += record.total_sales;
            total.total_cost += record.total_cost;
            total.invoice_profit += record.invoice_profit;
            total.amount_paid += record.amount_paid;
            total.outstanding += record.outstanding;
            total.advance_amount += record.advance_amount;
        }
        total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sales: f64, cost: f64, paid: f64, outstanding: f64) -> ProfitRecord {
        ProfitRecord {
            total_sales: sales,
            total_cost: cost,
            invoice_profit: sales - cost,
            amount_paid: paid,
            outstanding,
            advance_amount: 0.0,
        }
    }

    #[test]
    fn test_realized_and_pending_partition_invoice_profit() {
        let row = record(1000.0, 700.0, 400.0, 600.0);
        let summary = row.summarize();

        assert_eq!(summary.realized_profit, -300.0); // 400 − 700
        assert_eq!(summary.pending_profit, 600.0); // 300 − (−300)

        // pending + realized == invoice_profit, by construction.
        assert_eq!(
            summary.pending_profit + summary.realized_profit,
            row.invoice_profit
        );
    }

    #[test]
    fn test_label_follows_realized_sign() {
        assert_eq!(
            record(1000.0, 700.0, 900.0, 100.0).summarize().label,
            ProfitLabel::GainedProfit
        );
        assert_eq!(
            record(1000.0, 700.0, 200.0, 800.0).summarize().label,
            ProfitLabel::Loss
        );
        assert_eq!(ProfitLabel::Loss.to_string(), "Loss");
    }

    #[test]
    fn test_outstanding_ratio_zero_when_no_sales() {
        let summary = record(0.0, 0.0, 0.0, 500.0).summarize();
        assert_eq!(summary.outstanding_ratio, 0.0);

        let summary = record(2000.0, 1500.0, 1500.0, 500.0).summarize();
        assert_eq!(summary.outstanding_ratio, 25.0);
    }

    #[test]
    fn test_advance_suppresses_outstanding_display() {
        let mut row = record(1000.0, 700.0, 1200.0, 0.0);
        row.advance_amount = 200.0;
        assert_eq!(
            row.summarize().balance_figure,
            BalanceFigure::Advance(200.0)
        );

        row.advance_amount = 0.0;
        row.outstanding = 0.0;
        assert_eq!(
            row.summarize().balance_figure,
            BalanceFigure::Outstanding(0.0)
        );
    }

    #[test]
    fn test_rollup_sums_raw_fields_then_derives() {
        let rows = vec![
            record(1_000_000.0, 900_000.0, 980_000.0, 20_000.0), // ratio 2%
            record(100.0, 40.0, 50.0, 50.0),                     // ratio 50%
        ];

        let rolled = ProfitRecord::rollup(&rows).summarize();

        // Derived from the sums: 20050 / 1000100 · 100 ≈ 2.0048%,
        // nowhere near the 26% a per-row average would give.
        assert!((rolled.outstanding_ratio - 20_050.0 / 1_000_100.0 * 100.0).abs() < 1e-9);
        assert!(rolled.outstanding_ratio < 3.0);

        // Roll-up equivalence: identical to a single pre-summed record.
        let pre_summed = record(1_000_100.0, 900_040.0, 980_050.0, 20_050.0);
        assert_eq!(rolled, pre_summed.summarize());
    }

    #[test]
    fn test_margins_zero_on_zero_cost() {
        let row = ProfitRecord {
            total_sales: 500.0,
            total_cost: 0.0,
            invoice_profit: 500.0,
            amount_paid: 500.0,
            outstanding: 0.0,
            advance_amount: 0.0,
        };
        let summary = row.summarize();
        assert_eq!(summary.invoice_margin, 0.0);
        assert_eq!(summary.realized_margin, 0.0);
    }
}
