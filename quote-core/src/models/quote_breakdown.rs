use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An itemized price quote. `total` is the exact sum of the numeric line
/// items; the advisory note never contributes to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    pub base: Decimal,
    pub schedule_c: Decimal,
    pub schedule_d: Decimal,
    pub schedule_e: Decimal,
    pub home_ownership: Decimal,
    pub k1_forms: Decimal,
    pub jurisdictions: Decimal,
    pub total: Decimal,
    pub foreign_income_note: Option<String>,
}

impl QuoteBreakdown {
    /// Labeled line items for rendering: the base fee always, every other
    /// item only when it charges something.
    pub fn line_items(&self) -> Vec<(&'static str, Decimal)> {
        let mut items = vec![("Base filing", self.base)];
        for (label, amount) in [
            ("Schedule C", self.schedule_c),
            ("Schedule D", self.schedule_d),
            ("Schedule E", self.schedule_e),
            ("Home ownership", self.home_ownership),
            ("K-1 forms", self.k1_forms),
            ("Filing jurisdictions", self.jurisdictions),
        ] {
            if !amount.is_zero() {
                items.push((label, amount));
            }
        }
        items
    }
}
