use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::BasketLine;

#[derive(Debug, Clone, Error)]
pub enum BenefitError {
    #[error("A percentage discount must be between 0 and 100. Got {0}")]
    InvalidPercentage(Decimal),
    #[error("A fixed discount cannot be negative. Got {0}")]
    NegativeAmount(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenefitType {
    Percentage,
    Fixed,
}

/// A discount on the digital book lines that a [`super::JournalBundleCondition`] (or any other condition) selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalBookBenefit {
    benefit_type: BenefitType,
    value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiscount {
    pub line_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitApplication {
    pub discounts: Vec<LineDiscount>,
}

impl BenefitApplication {
    pub fn total(&self) -> Decimal {
        self.discounts.iter().map(|d| d.amount).sum()
    }
}

impl DigitalBookBenefit {
    pub fn percentage(value: Decimal) -> Result<Self, BenefitError> {
        if value.is_sign_negative() || value > Decimal::ONE_HUNDRED {
            return Err(BenefitError::InvalidPercentage(value));
        }
        Ok(Self { benefit_type: BenefitType::Percentage, value })
    }

    pub fn fixed(value: Decimal) -> Result<Self, BenefitError> {
        if value.is_sign_negative() {
            return Err(BenefitError::NegativeAmount(value));
        }
        Ok(Self { benefit_type: BenefitType::Fixed, value })
    }

    pub fn benefit_type(&self) -> BenefitType {
        self.benefit_type
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn name(&self) -> String {
        let value = self.value.normalize();
        match self.benefit_type {
            BenefitType::Percentage => format!("{value}% digital book discount"),
            BenefitType::Fixed => format!("{value} fixed-price enterprise discount"),
        }
    }

    /// Works out the discount on each of the `(unit price, line)` pairs, which are consumed in the order given.
    ///
    /// A percentage discount takes its share of every line, rounded to cents. A fixed discount is used up line by line
    /// and never takes more than a line is worth. Lines that get no discount are left out of the result.
    pub fn apply(&self, lines: &[(Decimal, BasketLine)]) -> BenefitApplication {
        let mut discounts = Vec::with_capacity(lines.len());
        match self.benefit_type {
            BenefitType::Percentage => {
                for (price, line) in lines {
                    let amount = (*price * Decimal::from(line.quantity) * self.value / Decimal::ONE_HUNDRED).round_dp(2);
                    if amount > Decimal::ZERO {
                        discounts.push(LineDiscount { line_id: line.id, amount });
                    }
                }
            },
            BenefitType::Fixed => {
                let mut remaining = self.value;
                for (price, line) in lines {
                    if remaining <= Decimal::ZERO {
                        break;
                    }
                    let amount = remaining.min(*price * Decimal::from(line.quantity));
                    if amount > Decimal::ZERO {
                        discounts.push(LineDiscount { line_id: line.id, amount });
                        remaining -= amount;
                    }
                }
            },
        }
        BenefitApplication { discounts }
    }
}

impl Display for DigitalBookBenefit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
