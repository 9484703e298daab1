//! Calculation lifecycle and results

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use core_kernel::{CalculationId, Money};
use domain_rules::RuleResult;
use domain_variables::VariableDefinition;

/// Lifecycle of one calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationState {
    /// Product version found, nothing read yet
    Loaded,
    /// Product-level variables read from the document
    VariablesResolved,
    /// Computed variables and covers in progress
    Computing,
    Done,
    /// Stopped by a configuration error
    Failed,
}

impl CalculationState {
    pub fn can_transition_to(&self, target: CalculationState) -> bool {
        use CalculationState::*;
        matches!(
            (self, target),
            (Loaded, VariablesResolved) |
            (VariablesResolved, Computing) |
            (Computing, Done) |
            (Loaded, Failed) |
            (VariablesResolved, Failed) |
            (Computing, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CalculationState::Done | CalculationState::Failed)
    }
}

/// A computed variable that stayed unset, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unresolved {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_index: Option<usize>,
    pub reason: String,
}

/// Results for one cover of one insured object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverResult {
    pub object_index: usize,
    pub cover_code: String,
    pub premium: Option<Decimal>,
    pub sum_insured: Option<Decimal>,
    pub deductible_id: Option<String>,
}

/// Everything a calculation produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    pub calculation_id: CalculationId,
    /// The input document with computed values written in
    pub document: Value,
    /// Sum of cover premiums, rounded to the currency once
    pub total_premium: Money,
    pub covers: Vec<CoverResult>,
    /// Product-level variables with their final values
    pub variables: Vec<VariableDefinition>,
    pub unresolved: Vec<Unresolved>,
    pub post_rule_results: Vec<RuleResult>,
    pub state: CalculationState,
}

impl CalculationReport {
    /// Codes of the computed variables that stayed unset, first occurrence order
    pub fn unresolved_variable_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for item in &self.unresolved {
            if !codes.contains(&item.code) {
                codes.push(item.code.clone());
            }
        }
        codes
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn cover(&self, object_index: usize, cover_code: &str) -> Option<&CoverResult> {
        self.covers
            .iter()
            .find(|c| c.object_index == object_index && c.cover_code == cover_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use CalculationState::*;
        assert!(Loaded.can_transition_to(VariablesResolved));
        assert!(Computing.can_transition_to(Done));
        assert!(Loaded.can_transition_to(Failed));
        assert!(!Loaded.can_transition_to(Done));
        assert!(!Done.can_transition_to(Computing));
        assert!(Done.is_terminal());
    }
}
