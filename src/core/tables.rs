use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or checking a tax table file.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read tax tables from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tax table file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("standard deduction must be a finite amount >= 0, got {0}")]
    InvalidDeduction(f64),

    #[error("at least one federal bracket is required")]
    NoBrackets,

    #[error("federal bracket {index} rate must be in [0, 1), got {rate}")]
    BracketRate { index: usize, rate: f64 },

    #[error("federal bracket {index} has no upper limit but is not the last bracket")]
    UnboundedBracket { index: usize },

    #[error("federal bracket {index} limit {limit} must be finite and above the previous limit")]
    UnorderedBracket { index: usize, limit: f64 },

    #[error("last federal bracket must be unbounded, got limit {0}")]
    BoundedTopBracket(f64),

    #[error("state rate for {state} must be in [0, 1), got {rate}")]
    StateRate { state: String, rate: f64 },

    #[error("default state rate must be in [0, 1), got {0}")]
    DefaultStateRate(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FederalBracket {
    /// Upper edge of the slice of taxable income; `None` for the top bracket.
    pub upper_limit: Option<f64>,
    pub rate: f64,
}

/// Federal brackets, standard deduction and flat state rates for one tax year.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxTables {
    pub standard_deduction: f64,
    pub default_state_rate: f64,
    pub federal_brackets: Vec<FederalBracket>,
    pub state_rates: BTreeMap<String, f64>,
}

// 2023 single filer, long-term capital gains schedule.
const STANDARD_DEDUCTION_2023: f64 = 13_850.0;
const DEFAULT_STATE_RATE: f64 = 0.04;

const FEDERAL_BRACKETS_2023: [FederalBracket; 3] = [
    FederalBracket {
        upper_limit: Some(44_625.0),
        rate: 0.0,
    },
    FederalBracket {
        upper_limit: Some(492_300.0),
        rate: 0.15,
    },
    FederalBracket {
        upper_limit: None,
        rate: 0.20,
    },
];

const STATE_RATES_2023: [(&str, f64); 50] = [
    ("alabama", 0.045),
    ("alaska", 0.0),
    ("arizona", 0.025),
    ("arkansas", 0.045),
    ("california", 0.08),
    ("colorado", 0.044),
    ("connecticut", 0.055),
    ("delaware", 0.05),
    ("florida", 0.0),
    ("georgia", 0.054),
    ("hawaii", 0.07),
    ("idaho", 0.05),
    ("illinois", 0.0495),
    ("indiana", 0.0315),
    ("iowa", 0.039),
    ("kansas", 0.05),
    ("kentucky", 0.045),
    ("louisiana", 0.04),
    ("maine", 0.06),
    ("maryland", 0.055),
    ("massachusetts", 0.05),
    ("michigan", 0.0425),
    ("minnesota", 0.07),
    ("mississippi", 0.04),
    ("missouri", 0.045),
    ("montana", 0.055),
    ("nebraska", 0.05),
    ("nevada", 0.0),
    ("new-hampshire", 0.0),
    ("new-jersey", 0.07),
    ("new-mexico", 0.05),
    ("new-york", 0.065),
    ("north-carolina", 0.045),
    ("north-dakota", 0.02),
    ("ohio", 0.035),
    ("oklahoma", 0.045),
    ("oregon", 0.08),
    ("pennsylvania", 0.0307),
    ("rhode-island", 0.05),
    ("south-carolina", 0.06),
    ("south-dakota", 0.0),
    ("tennessee", 0.0),
    ("texas", 0.0),
    ("utah", 0.0465),
    ("vermont", 0.07),
    ("virginia", 0.05),
    ("washington", 0.0),
    ("west-virginia", 0.05),
    ("wisconsin", 0.06),
    ("wyoming", 0.0),
];

impl Default for TaxTables {
    fn default() -> Self {
        Self::tax_year_2023()
    }
}

impl TaxTables {
    pub fn tax_year_2023() -> Self {
        Self {
            standard_deduction: STANDARD_DEDUCTION_2023,
            default_state_rate: DEFAULT_STATE_RATE,
            federal_brackets: FEDERAL_BRACKETS_2023.to_vec(),
            state_rates: STATE_RATES_2023
                .iter()
                .map(|(id, rate)| ((*id).to_string(), *rate))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let text = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, TableError> {
        let tables: Self = toml::from_str(text)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if !self.standard_deduction.is_finite() || self.standard_deduction < 0.0 {
            return Err(TableError::InvalidDeduction(self.standard_deduction));
        }

        if self.federal_brackets.is_empty() {
            return Err(TableError::NoBrackets);
        }

        let last = self.federal_brackets.len() - 1;
        let mut previous_limit = 0.0;
        for (index, bracket) in self.federal_brackets.iter().enumerate() {
            if !is_rate(bracket.rate) {
                return Err(TableError::BracketRate {
                    index,
                    rate: bracket.rate,
                });
            }
            match (bracket.upper_limit, index == last) {
                (None, true) => {}
                (None, false) => return Err(TableError::UnboundedBracket { index }),
                (Some(limit), true) => return Err(TableError::BoundedTopBracket(limit)),
                (Some(limit), false) => {
                    if !limit.is_finite() || limit <= previous_limit {
                        return Err(TableError::UnorderedBracket { index, limit });
                    }
                    previous_limit = limit;
                }
            }
        }

        for (state, rate) in &self.state_rates {
            if !is_rate(*rate) {
                return Err(TableError::StateRate {
                    state: state.clone(),
                    rate: *rate,
                });
            }
        }

        if !is_rate(self.default_state_rate) {
            return Err(TableError::DefaultStateRate(self.default_state_rate));
        }

        Ok(())
    }

    pub fn state_rate(&self, state_id: &str) -> Option<f64> {
        self.state_rates.get(state_id).copied()
    }
}

fn is_rate(rate: f64) -> bool {
    (0.0..1.0).contains(&rate)
}
