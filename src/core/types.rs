use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WithdrawalRate {
    ThreePercent,
    FourPercent,
}

impl WithdrawalRate {
    /// Only the exact fractions offered by the form are accepted.
    pub fn from_fraction(value: f64) -> Option<Self> {
        if value == 0.03 {
            Some(Self::ThreePercent)
        } else if value == 0.04 {
            Some(Self::FourPercent)
        } else {
            None
        }
    }

    pub fn fraction(self) -> f64 {
        match self {
            Self::ThreePercent => 0.03,
            Self::FourPercent => 0.04,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationInput {
    pub age: u32,
    pub net_worth: f64,
    pub state_id: String,
    pub withdrawal_rate: WithdrawalRate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub pre_tax_withdrawal: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub after_tax_withdrawal: f64,
    pub monthly_after_tax: f64,
}

impl CalculationResult {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Outcome of a form submission: either a populated result with no errors,
/// or a zeroed result with every validation message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub result: CalculationResult,
    pub errors: Vec<String>,
}
