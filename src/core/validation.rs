use thiserror::Error;

use super::types::{CalculationInput, WithdrawalRate};

/// One violated input rule.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Current Age must be a positive number.")]
    InvalidAge,

    #[error("Net Worth cannot be negative.")]
    NegativeNetWorth,

    #[error("Please select a State of Residence.")]
    MissingState,

    #[error("Please select a valid withdrawal strategy.")]
    InvalidWithdrawalRate,
}

impl ValidationError {
    /// Form field the rule applies to.
    pub fn field(self) -> &'static str {
        match self {
            Self::InvalidAge => "age",
            Self::NegativeNetWorth => "netWorth",
            Self::MissingState => "stateId",
            Self::InvalidWithdrawalRate => "withdrawalRate",
        }
    }
}

/// Every rule that failed, in form order. Never empty.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Form values before validation. `None` marks a field that did not parse
/// as a number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    pub age: Option<f64>,
    pub net_worth: Option<f64>,
    pub state_id: String,
    pub withdrawal_rate: Option<f64>,
}

impl RawInput {
    pub fn from_fields(age: &str, net_worth: &str, state_id: &str, withdrawal_rate: &str) -> Self {
        Self {
            age: parse_number(age),
            net_worth: parse_number(net_worth),
            state_id: state_id.to_string(),
            withdrawal_rate: parse_number(withdrawal_rate),
        }
    }
}

pub fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Checks every rule and reports all failures together.
pub fn validate(raw: &RawInput) -> Result<CalculationInput, ValidationErrors> {
    let mut errors = Vec::new();
    let mut check = |failed: bool, error: ValidationError| {
        if failed {
            errors.push(error);
        }
    };

    let age = raw
        .age
        .filter(|age| age.is_finite())
        .map(f64::trunc)
        .filter(|age| *age > 0.0 && *age <= f64::from(u32::MAX));
    check(age.is_none(), ValidationError::InvalidAge);

    let net_worth = raw
        .net_worth
        .filter(|net_worth| net_worth.is_finite() && *net_worth >= 0.0);
    check(net_worth.is_none(), ValidationError::NegativeNetWorth);

    let state_id = raw.state_id.trim();
    check(state_id.is_empty(), ValidationError::MissingState);

    let withdrawal_rate = raw.withdrawal_rate.and_then(WithdrawalRate::from_fraction);
    check(withdrawal_rate.is_none(), ValidationError::InvalidWithdrawalRate);

    match (age, net_worth, withdrawal_rate) {
        (Some(age), Some(net_worth), Some(withdrawal_rate)) if errors.is_empty() => {
            Ok(CalculationInput {
                age: age as u32,
                net_worth,
                state_id: state_id.to_string(),
                withdrawal_rate,
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}
