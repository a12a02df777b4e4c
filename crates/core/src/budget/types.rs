//! Budget data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the controller last entered a company's budget.
///
/// Recorded for round-tripping the edit form, not for computation - the
/// canonical 12-month array is the single source of truth either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetMode {
    /// One annual figure, distributed evenly.
    Annual,
    /// Four quarterly figures.
    Quarterly,
    /// Twelve monthly figures.
    Monthly,
}

impl BudgetMode {
    /// Parses a mode from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "annual" => Some(Self::Annual),
            "quarterly" => Some(Self::Quarterly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Returns the string representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for BudgetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The canonical ordered 12-month budget array, January first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetMonths([Decimal; 12]);

impl BudgetMonths {
    /// Number of months in the canonical array.
    pub const COUNT: usize = 12;

    /// Wraps an ordered January-first array.
    #[must_use]
    pub const fn new(months: [Decimal; 12]) -> Self {
        Self(months)
    }

    /// An all-zero budget.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns the month at `index` (0 = January), zero when out of range.
    #[must_use]
    pub fn month(&self, index: usize) -> Decimal {
        self.0.get(index).copied().unwrap_or_default()
    }

    /// Sum of all twelve months.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.0.iter().copied().sum()
    }

    /// Returns true when every month is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(Decimal::is_zero)
    }

    /// The months as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Decimal] {
        &self.0
    }

    /// The inner array.
    #[must_use]
    pub const fn into_inner(self) -> [Decimal; 12] {
        self.0
    }
}

impl From<[Decimal; 12]> for BudgetMonths {
    fn from(months: [Decimal; 12]) -> Self {
        Self(months)
    }
}

/// Budget figures as the controller entered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "values", rename_all = "lowercase")]
pub enum BudgetInput {
    /// A single annual figure.
    Annual(Decimal),
    /// Four quarterly figures, Q1 first.
    Quarterly([Decimal; 4]),
    /// Twelve monthly figures, January first.
    Monthly([Decimal; 12]),
}

impl BudgetInput {
    /// The entry mode this input round-trips as.
    #[must_use]
    pub const fn mode(&self) -> BudgetMode {
        match self {
            Self::Annual(_) => BudgetMode::Annual,
            Self::Quarterly(_) => BudgetMode::Quarterly,
            Self::Monthly(_) => BudgetMode::Monthly,
        }
    }
}

/// A normalized budget: the recomputed annual total plus the canonical
/// monthly array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    /// Annual total, always consistent with the months.
    pub budget_total: Decimal,
    /// Canonical 12-month array.
    pub budget_months: BudgetMonths,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_budget_mode_roundtrip() {
        for mode in [BudgetMode::Annual, BudgetMode::Quarterly, BudgetMode::Monthly] {
            assert_eq!(BudgetMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(BudgetMode::parse("weekly"), None);
    }

    #[test]
    fn test_budget_months_accessors() {
        let mut raw = [Decimal::ZERO; 12];
        raw[0] = dec!(100);
        raw[11] = dec!(200);
        let months = BudgetMonths::new(raw);

        assert_eq!(months.month(0), dec!(100));
        assert_eq!(months.month(11), dec!(200));
        assert_eq!(months.month(12), Decimal::ZERO);
        assert_eq!(months.total(), dec!(300));
        assert!(!months.is_zero());
        assert!(BudgetMonths::zero().is_zero());
    }

    #[test]
    fn test_budget_months_serde_as_plain_array() {
        let months = BudgetMonths::new([Decimal::ONE; 12]);
        let json = serde_json::to_value(months).expect("serializes");
        assert!(json.is_array());
        assert_eq!(json.as_array().map(Vec::len), Some(12));
    }

    #[test]
    fn test_budget_input_mode() {
        assert_eq!(BudgetInput::Annual(dec!(1)).mode(), BudgetMode::Annual);
        assert_eq!(
            BudgetInput::Quarterly([Decimal::ZERO; 4]).mode(),
            BudgetMode::Quarterly
        );
        assert_eq!(
            BudgetInput::Monthly([Decimal::ZERO; 12]).mode(),
            BudgetMode::Monthly
        );
    }
}
