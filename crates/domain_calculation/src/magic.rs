//! Derived values computed from other variables
//!
//! "Magic" values are the small set of derivations every product needs and
//! that a plain formula cannot express: ages, contract terms and flags.

use serde::{Deserialize, Serialize};

use core_kernel::temporal::{age_on, term_days, term_months};
use domain_variables::VariableContext;

use crate::error::ComputeFailure;

/// A derivation over other variables, named by variable code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum MagicValue {
    /// Full years between a birth date and a reference date
    Age { birth_date: String, on_date: String },
    /// Contract term in months; a started month counts as a whole one
    TermMonths { start: String, end: String },
    /// Contract term in days, both ends included
    TermDays { start: String, end: String },
    /// `"1"` when the gender variable equals `expected`, `"0"` otherwise
    GenderFlag { gender: String, expected: String },
}

impl MagicValue {
    /// Computes the raw text of the value
    pub fn compute(&self, ctx: &VariableContext) -> Result<String, ComputeFailure> {
        match self {
            MagicValue::Age { birth_date, on_date } => {
                let age = age_on(date(ctx, birth_date)?, date(ctx, on_date)?)?;
                Ok(age.to_string())
            }
            MagicValue::TermMonths { start, end } => {
                let months = term_months(date(ctx, start)?, date(ctx, end)?)?;
                Ok(months.to_string())
            }
            MagicValue::TermDays { start, end } => {
                let days = term_days(date(ctx, start)?, date(ctx, end)?)?;
                Ok(days.to_string())
            }
            MagicValue::GenderFlag { gender, expected } => {
                let value = ctx
                    .text(gender)
                    .ok_or_else(|| ComputeFailure::MissingOperand(gender.clone()))?;
                let flag = value.trim().eq_ignore_ascii_case(expected.trim());
                Ok(if flag { "1" } else { "0" }.to_string())
            }
        }
    }
}

fn date(ctx: &VariableContext, code: &str) -> Result<chrono::NaiveDate, ComputeFailure> {
    ctx.date(code)
        .ok_or_else(|| ComputeFailure::MissingOperand(code.to_string()))
}
