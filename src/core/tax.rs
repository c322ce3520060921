use tracing::debug;

use super::tables::TaxTables;

/// Progressive federal tax on `income` after the standard deduction.
pub fn federal_tax(income: f64, tables: &TaxTables) -> f64 {
    let taxable_income = (income - tables.standard_deduction).max(0.0);

    let mut tax = 0.0;
    let mut previous_limit = 0.0;
    for bracket in &tables.federal_brackets {
        if taxable_income <= previous_limit {
            break;
        }
        let upper_limit = bracket.upper_limit.unwrap_or(f64::INFINITY);
        let income_in_bracket = taxable_income.min(upper_limit) - previous_limit;
        tax += income_in_bracket * bracket.rate;
        previous_limit = upper_limit;
    }
    tax
}

/// Flat state tax; unlisted states pay the default rate.
pub fn state_tax(income: f64, state_id: &str, tables: &TaxTables) -> f64 {
    let rate = tables.state_rate(state_id).unwrap_or_else(|| {
        debug!(state_id, rate = tables.default_state_rate, "state not listed, using default rate");
        tables.default_state_rate
    });
    income * rate
}
