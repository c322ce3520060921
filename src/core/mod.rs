mod engine;
mod states;
mod tables;
mod tax;
mod types;
mod validation;

pub use engine::{calculate, evaluate};
pub use states::{StateOption, US_STATES, state_id, states};
pub use tables::{FederalBracket, TableError, TaxTables};
pub use tax::{federal_tax, state_tax};
pub use types::{CalculationInput, CalculationResult, Evaluation, WithdrawalRate};
pub use validation::{RawInput, ValidationError, ValidationErrors, parse_number, validate};
