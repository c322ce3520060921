use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::core::{CalculationResult, RawInput, TableError, TaxTables, states};

#[derive(Parser, Debug)]
#[command(
    name = "withdrawal",
    about = "Tax-adjusted retirement withdrawal estimator (federal brackets + flat state rates)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the web form and the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[command(flatten)]
        tables: TablesArgs,
    },
    /// Calculate one withdrawal from form-style values.
    Calculate(CalculateArgs),
    /// List the state identifiers known to the rate table.
    States,
}

#[derive(Args, Debug)]
pub struct TablesArgs {
    #[arg(long, help = "TOML file replacing the built-in 2023 tax tables")]
    pub tables: Option<PathBuf>,
}

impl TablesArgs {
    pub fn load(&self) -> Result<TaxTables, TableError> {
        match &self.tables {
            Some(path) => {
                let tables = TaxTables::load(path)?;
                info!(
                    path = %path.display(),
                    brackets = tables.federal_brackets.len(),
                    states = tables.state_rates.len(),
                    "loaded tax tables"
                );
                Ok(tables)
            }
            None => Ok(TaxTables::default()),
        }
    }
}

#[derive(Args, Debug)]
pub struct CalculateArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub age: String,
    #[arg(long, allow_hyphen_values = true)]
    pub net_worth: String,
    #[arg(long, default_value = "", help = "State identifier, e.g. new-york")]
    pub state: String,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Withdrawal rate as a fraction: 0.03 or 0.04"
    )]
    pub rate: String,
    #[arg(long, help = "Print the result as JSON")]
    pub json: bool,
    #[command(flatten)]
    pub tables: TablesArgs,
}

impl CalculateArgs {
    pub fn raw_input(&self) -> RawInput {
        RawInput::from_fields(&self.age, &self.net_worth, &self.state, &self.rate)
    }
}

pub fn render_report(result: &CalculationResult) -> String {
    let rows = [
        ("Annual withdrawal (pre-tax)", result.pre_tax_withdrawal),
        ("Federal taxes", result.federal_tax),
        ("State taxes", result.state_tax),
        ("Annual withdrawal (after-tax)", result.after_tax_withdrawal),
        ("Monthly income (after-tax)", result.monthly_after_tax),
    ];
    rows.iter()
        .map(|(label, amount)| format!("{:<31}{}\n", format!("{label}:"), format_usd(*amount)))
        .collect()
}

pub fn render_states() -> String {
    states()
        .iter()
        .map(|option| format!("{:<16}{}\n", option.id, option.name))
        .collect()
}

/// Dollar amount with thousands separators and cents, e.g. `$70,371.25`.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
