//! Breakdown types and the rounding/banding policy.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Banding factors around the subtotal. Inferred from the original pricing
/// flow; kept here as the single place to retune if the reference numbers
/// ever shift.
pub fn range_low_factor() -> Decimal {
    Decimal::new(85, 2)
}

pub fn range_high_factor() -> Decimal {
    Decimal::new(125, 2)
}

/// Round to whole currency units, midpoint away from zero. Applied exactly
/// once per derived figure; intermediate arithmetic stays unrounded so
/// per-step rounding error cannot compound.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineItemKind {
    Base,
    Additive,
    Bundle,
    Multiplicative,
    Complexity,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
    pub kind: LineItemKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedRange {
    pub low: Decimal,
    pub average: Decimal,
    pub high: Decimal,
}

impl EstimatedRange {
    /// Band a rounded subtotal into low/average/high estimates.
    pub fn around(subtotal: Decimal) -> Self {
        Self {
            low: round_currency(subtotal * range_low_factor()),
            average: subtotal,
            high: round_currency(subtotal * range_high_factor()),
        }
    }
}

/// The structured result of one pricing run. Field names follow the JSON
/// surface consumed by the wizard and back office.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub base_price: Decimal,
    pub line_items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total_multiplier: Decimal,
    pub estimated_range: EstimatedRange,
}

impl PricingBreakdown {
    /// Sum of every line item, pre-rounding. Reconciles with `subtotal`
    /// within one currency unit.
    pub fn line_item_total(&self) -> Decimal {
        self.line_items.iter().map(|item| item.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{round_currency, EstimatedRange};

    #[test]
    fn rounding_is_midpoint_away_from_zero() {
        assert_eq!(round_currency(Decimal::new(105, 1)), Decimal::from(11)); // 10.5
        assert_eq!(round_currency(Decimal::new(104, 1)), Decimal::from(10)); // 10.4
        assert_eq!(round_currency(Decimal::new(-105, 1)), Decimal::from(-11));
    }

    #[test]
    fn range_is_ordered_around_the_subtotal() {
        let range = EstimatedRange::around(Decimal::from(10_000));
        assert_eq!(range.low, Decimal::from(8_500));
        assert_eq!(range.average, Decimal::from(10_000));
        assert_eq!(range.high, Decimal::from(12_500));
        assert!(range.low <= range.average && range.average <= range.high);
    }
}
