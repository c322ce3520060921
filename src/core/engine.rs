use tracing::debug;

use super::tables::TaxTables;
use super::tax::{federal_tax, state_tax};
use super::types::{CalculationInput, CalculationResult, Evaluation};
use super::validation::{RawInput, validate};

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn calculate(input: &CalculationInput, tables: &TaxTables) -> CalculationResult {
    let pre_tax_withdrawal = input.net_worth * input.withdrawal_rate.fraction();
    let federal_tax = federal_tax(pre_tax_withdrawal, tables);
    let state_tax = state_tax(pre_tax_withdrawal, &input.state_id, tables);
    let after_tax_withdrawal = (pre_tax_withdrawal - federal_tax - state_tax).max(0.0);

    debug!(
        age = input.age,
        state_id = %input.state_id,
        pre_tax_withdrawal,
        federal_tax,
        state_tax,
        after_tax_withdrawal,
        "withdrawal calculated"
    );

    CalculationResult {
        pre_tax_withdrawal,
        federal_tax,
        state_tax,
        after_tax_withdrawal,
        monthly_after_tax: after_tax_withdrawal / MONTHS_PER_YEAR,
    }
}

/// Validates the raw form values and calculates when they pass. Failed
/// validation yields a zeroed result alongside every error message.
pub fn evaluate(raw: &RawInput, tables: &TaxTables) -> Evaluation {
    match validate(raw) {
        Ok(input) => Evaluation {
            result: calculate(&input, tables),
            errors: Vec::new(),
        },
        Err(errors) => Evaluation {
            result: CalculationResult::zero(),
            errors: errors.messages(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tables::FederalBracket;
    use crate::core::types::WithdrawalRate;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn input(net_worth: f64, state_id: &str, withdrawal_rate: WithdrawalRate) -> CalculationInput {
        CalculationInput {
            age: 65,
            net_worth,
            state_id: state_id.to_string(),
            withdrawal_rate,
        }
    }

    #[test]
    fn oracle_texas_four_percent_is_untaxed() {
        let tables = TaxTables::default();
        let result = calculate(&input(1_000_000.0, "texas", WithdrawalRate::FourPercent), &tables);

        assert_approx(result.pre_tax_withdrawal, 40_000.0);
        assert_approx(result.federal_tax, 0.0);
        assert_approx(result.state_tax, 0.0);
        assert_approx(result.after_tax_withdrawal, 40_000.0);
        assert_approx_tol(result.monthly_after_tax, 3_333.33, 0.005);
    }

    #[test]
    fn oracle_california_four_percent_matches_hand_calculation() {
        let tables = TaxTables::default();
        let result = calculate(
            &input(2_000_000.0, "california", WithdrawalRate::FourPercent),
            &tables,
        );

        assert_approx(result.pre_tax_withdrawal, 80_000.0);
        assert_approx(result.federal_tax, (66_150.0 - 44_625.0) * 0.15);
        assert_approx(result.federal_tax, 3_228.75);
        assert_approx(result.state_tax, 6_400.0);
        assert_approx(result.after_tax_withdrawal, 70_371.25);
        assert_approx_tol(result.monthly_after_tax, 5_864.27, 0.005);
    }

    #[test]
    fn three_percent_rate_scales_withdrawal() {
        let tables = TaxTables::default();
        let result = calculate(&input(1_000_000.0, "florida", WithdrawalRate::ThreePercent), &tables);
        assert_approx(result.pre_tax_withdrawal, 30_000.0);
        assert_approx(result.after_tax_withdrawal, 30_000.0);
        assert_approx(result.monthly_after_tax, 2_500.0);
    }

    #[test]
    fn unknown_state_uses_default_rate_end_to_end() {
        let tables = TaxTables::default();
        let result = calculate(&input(1_000_000.0, "atlantis", WithdrawalRate::FourPercent), &tables);
        assert_approx(result.state_tax, 1_600.0);
        assert_approx(result.after_tax_withdrawal, 38_400.0);
    }

    #[test]
    fn after_tax_is_clamped_when_taxes_exceed_withdrawal() {
        let tables = TaxTables {
            standard_deduction: 0.0,
            default_state_rate: 0.9,
            federal_brackets: vec![FederalBracket {
                upper_limit: None,
                rate: 0.5,
            }],
            ..TaxTables::default()
        };
        let result = calculate(&input(1_000_000.0, "atlantis", WithdrawalRate::FourPercent), &tables);
        assert!(result.federal_tax + result.state_tax > result.pre_tax_withdrawal);
        assert_approx(result.after_tax_withdrawal, 0.0);
        assert_approx(result.monthly_after_tax, 0.0);
    }

    #[test]
    fn zero_net_worth_yields_zero_result() {
        let tables = TaxTables::default();
        let result = calculate(&input(0.0, "california", WithdrawalRate::ThreePercent), &tables);
        assert_eq!(result, CalculationResult::zero());
    }

    #[test]
    fn evaluate_returns_result_without_errors_for_valid_form() {
        let tables = TaxTables::default();
        let raw = RawInput::from_fields("65", "2000000", "california", "0.04");
        let evaluation = evaluate(&raw, &tables);
        assert!(evaluation.errors.is_empty());
        assert_approx(evaluation.result.after_tax_withdrawal, 70_371.25);
    }

    #[test]
    fn evaluate_zeroes_result_and_lists_errors_for_invalid_form() {
        let tables = TaxTables::default();
        let raw = RawInput::from_fields("0", "2000000", "", "0.05");
        let evaluation = evaluate(&raw, &tables);
        assert_eq!(evaluation.result, CalculationResult::zero());
        assert_eq!(
            evaluation.errors,
            vec![
                "Current Age must be a positive number.",
                "Please select a State of Residence.",
                "Please select a valid withdrawal strategy.",
            ]
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_result_fields_are_non_negative_and_consistent(
            net_worth_dollars in 0u64..100_000_000,
            state_index in 0usize..52,
            four_percent in proptest::bool::ANY
        ) {
            let tables = TaxTables::default();
            let states: Vec<&String> = tables.state_rates.keys().collect();
            let state_id = states
                .get(state_index)
                .map(|s| s.as_str())
                .unwrap_or("nowhere");
            let rate = if four_percent {
                WithdrawalRate::FourPercent
            } else {
                WithdrawalRate::ThreePercent
            };
            let result = calculate(&input(net_worth_dollars as f64, state_id, rate), &tables);

            prop_assert!(result.pre_tax_withdrawal >= 0.0);
            prop_assert!(result.federal_tax >= 0.0);
            prop_assert!(result.state_tax >= 0.0);
            prop_assert!(result.after_tax_withdrawal >= 0.0);
            let expected_after = (result.pre_tax_withdrawal - result.federal_tax - result.state_tax).max(0.0);
            prop_assert!((result.after_tax_withdrawal - expected_after).abs() <= EPS);
            prop_assert!((result.monthly_after_tax * 12.0 - result.after_tax_withdrawal).abs() <= EPS);
        }
    }
}
