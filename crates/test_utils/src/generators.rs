//! Property-Based Test Generators
//!
//! Provides proptest strategies for engine inputs that keep their domain
//! invariants: amounts with currency scale, ordered periods, well-formed masks.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::builders::PolicyDocumentBuilder;

/// Strategy for positive amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

/// Strategy for sums insured in whole currency units
pub fn sum_insured_strategy() -> impl Strategy<Value = Decimal> {
    (1_000i64..5_000_000i64).prop_map(Decimal::from)
}

/// Strategy for dates between 1940 and 2040
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..36_500).prop_map(|days| {
        NaiveDate::from_ymd_opt(1940, 1, 1).expect("valid date") + Duration::days(days)
    })
}

/// Strategy for periods whose end is not before their start
pub fn period_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (date_strategy(), 0i64..1_100).prop_map(|(start, length)| (start, start + Duration::days(length)))
}

/// Strategy for region codes, one of them outside every table
pub fn region_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("MSK".to_string()),
        Just("SPB".to_string()),
        Just("KZN".to_string()),
        Just("VLD".to_string()),
    ]
}

/// Strategy for well-formed masks with a counter placeholder
pub fn mask_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just(""), Just("{YYYY}-"), Just("{YY}{MM}/"), Just("{BRANCH}-")],
        1usize..8,
        "[A-Z]{0,3}",
    )
        .prop_map(|(prefix, width, suffix)| format!("{}{{{}}}{}", prefix, "X".repeat(width), suffix))
}

/// Strategy for travel documents with one to three insured objects
pub fn travel_document_strategy() -> impl Strategy<Value = Value> {
    (
        period_strategy(),
        prop::collection::vec((region_strategy(), sum_insured_strategy()), 1..4),
    )
        .prop_map(|((start, end), objects)| {
            objects
                .into_iter()
                .fold(PolicyDocumentBuilder::new().with_period(start, end), |builder, (region, sum)| {
                    builder.with_object(region, &[("MEDICAL", sum)])
                })
                .build()
        })
}
