//! Deductible options offered per cover

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A deductible option of a cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductible {
    pub id: String,
    /// Display order; options without one come last
    #[serde(default)]
    pub nr: Option<u32>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<Decimal>,
}

impl Deductible {
    pub fn new(id: impl Into<String>, nr: Option<u32>) -> Self {
        Self {
            id: id.into(),
            nr,
            text: String::new(),
            value: None,
        }
    }

    fn sort_key(&self) -> (bool, u32) {
        (self.nr.is_none(), self.nr.unwrap_or(0))
    }
}

/// Sorts by `nr` ascending, options without `nr` last, ties kept in order
pub fn sort_deductibles(deductibles: &mut [Deductible]) {
    deductibles.sort_by_key(Deductible::sort_key);
}

/// The option selected when the policy names none: the first after sorting
pub fn default_deductible(deductibles: &[Deductible]) -> Option<&Deductible> {
    deductibles.iter().min_by_key(|d| d.sort_key())
}
