//! Custom Test Assertions
//!
//! Provides assertion helpers for rule results and calculation reports that
//! print the failing rules or unresolved variables on failure.

use core_kernel::{Currency, Money};
use domain_calculation::CalculationReport;
use domain_rules::{failure_messages, RuleResult};
use rust_decimal::Decimal;

/// Asserts that every rule was satisfied
pub fn assert_all_satisfied(results: &[RuleResult]) {
    let failures = failure_messages(results);
    assert!(failures.is_empty(), "Expected all rules satisfied, failed: {:?}", failures);
}

/// Asserts that exactly the rules on the given left keys failed, in order
pub fn assert_failed_rules(results: &[RuleResult], left_keys: &[&str]) {
    let failed: Vec<&str> = results
        .iter()
        .filter(|r| !r.satisfied)
        .map(|r| r.rule.left_key.as_str())
        .collect();
    assert_eq!(failed, left_keys, "Failed rules differ: {:?}", failure_messages(results));
}

/// Asserts that a calculation left nothing unresolved
pub fn assert_complete(report: &CalculationReport) {
    assert!(
        report.is_complete(),
        "Expected a complete calculation, unresolved: {:?}",
        report.unresolved
    );
}

/// Asserts the set of unresolved variable codes, in first-occurrence order
pub fn assert_unresolved(report: &CalculationReport, codes: &[&str]) {
    assert_eq!(
        report.unresolved_variable_codes(),
        codes,
        "Unresolved variables differ: {:?}",
        report.unresolved
    );
}

/// Asserts the premium of one cover
pub fn assert_premium(report: &CalculationReport, object_index: usize, cover_code: &str, expected: Decimal) {
    let cover = report
        .cover(object_index, cover_code)
        .unwrap_or_else(|| panic!("No result for cover {} of object {}", cover_code, object_index));
    assert_eq!(
        cover.premium,
        Some(expected),
        "Premium of cover {} on object {}",
        cover_code,
        object_index
    );
}

/// Asserts a money amount and currency
pub fn assert_money_eq(actual: &Money, amount: Decimal, currency: Currency) {
    assert_eq!(actual.currency(), currency, "Currency mismatch");
    assert_eq!(actual.amount(), amount, "Amount mismatch for {}", actual);
}
