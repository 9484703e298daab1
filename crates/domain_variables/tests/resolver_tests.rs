//! Variable resolution tests
//!
//! # Test Organization
//!
//! - `document_reading` - resolving definitions from realistic policy documents
//! - `document_writing` - writing computed values and structure creation
//! - `round_trip` - write at a path, then resolve a definition with that path

use domain_variables::{
    read_raw, resolve, write, DataType, TypedValue, VariableContext, VariableDefinition,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn property_policy() -> Value {
    json!({
        "policyHolder": {
            "person": { "lastName": "Petrov", "birthDate": "12.04.1985", "gender": "M" },
            "organization": null
        },
        "startDate": "2024-03-01",
        "endDate": "2025-02-28",
        "insuredObjects": [
            {
                "type": "FLAT",
                "address": { "region": "MSK" },
                "covers": [
                    { "code": "FIRE", "sumInsured": 2500000, "deductible": null },
                    { "code": "FLOOD", "sumInsured": "1 000 000,00" }
                ]
            },
            {
                "type": "HOUSE",
                "covers": [ { "code": "FIRE", "sumInsured": 4000000 } ]
            }
        ]
    })
}

mod document_reading {
    use super::*;

    #[test]
    fn test_resolves_each_type() {
        let ctx = resolve(
            &property_policy(),
            &[
                VariableDefinition::new("lastName", "", "policyHolder.person.lastName", DataType::String),
                VariableDefinition::new("birthDate", "", "$.policyHolder.person.birthDate", DataType::Date),
                VariableDefinition::new("startDate", "", "startDate", DataType::Date),
                VariableDefinition::new(
                    "floodSum",
                    "",
                    "insuredObjects[0].covers[?(@.code == \"FLOOD\")].sumInsured",
                    DataType::Number,
                ),
            ],
        );

        assert_eq!(ctx.text("lastName"), Some("Petrov"));
        assert_eq!(ctx.raw("birthDate"), "1985-04-12");
        assert_eq!(ctx.raw("startDate"), "2024-03-01");
        assert_eq!(ctx.number("floodSum"), Some(dec!(1000000)));
    }

    #[test]
    fn test_second_object_is_independent() {
        let ctx = resolve(
            &property_policy(),
            &[VariableDefinition::new(
                "houseFire",
                "",
                "insuredObjects[1].covers[?(@.code == 'FIRE')].sumInsured",
                DataType::Number,
            )],
        );
        assert_eq!(ctx.number("houseFire"), Some(dec!(4000000)));
    }

    #[test]
    fn test_null_object_is_unset() {
        let ctx = resolve(
            &property_policy(),
            &[VariableDefinition::new("inn", "", "policyHolder.organization.inn", DataType::String)],
        );
        assert!(ctx.contains("inn"));
        assert!(!ctx.is_set("inn"));
        assert_eq!(ctx.raw("inn"), "");
    }

    #[test]
    fn test_constants_keep_declared_values() {
        let ctx = resolve(
            &property_policy(),
            &[VariableDefinition::constant("baseRate", DataType::Number, "0.0035")],
        );
        assert_eq!(ctx.number("baseRate"), Some(dec!(0.0035)));
    }
}

mod document_writing {
    use super::*;

    #[test]
    fn test_write_into_existing_cover() {
        let mut document = property_policy();
        write(
            &mut document,
            "insuredObjects[0].covers[?(@.code == 'FIRE')].premium",
            &TypedValue::Number(dec!(8750)),
        )
        .unwrap();

        assert_eq!(document["insuredObjects"][0]["covers"][0]["premium"], json!(8750));
        assert_eq!(document["insuredObjects"][0]["covers"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_builds_missing_tree() {
        let mut document = json!(null);
        write(&mut document, "result.totals[1].premium", &TypedValue::Number(dec!(1.5))).unwrap();
        assert_eq!(document, json!({ "result": { "totals": [ {}, { "premium": 1.5 } ] } }));
    }

    #[test]
    fn test_write_date_as_iso_text() {
        let mut document = json!({});
        let date = TypedValue::parse(DataType::Date, "01.03.2024").unwrap();
        write(&mut document, "issueDate", &date).unwrap();
        assert_eq!(read_raw(&document, "issueDate"), Some("2024-03-01".to_string()));
    }
}

mod round_trip {
    use super::*;

    fn path_strategy() -> impl Strategy<Value = String> {
        (
            "[a-z][a-zA-Z]{0,8}",
            0usize..4,
            prop::sample::select(vec!["FIRE", "FLOOD", "THEFT"]),
            "x[a-zA-Z]{0,8}",
        )
            .prop_map(|(root, index, cover, leaf)| {
                format!("{}[{}].covers[?(@.code == '{}')].{}", root, index, cover, leaf)
            })
    }

    proptest! {
        #[test]
        fn written_number_resolves_to_same_value(
            path in path_strategy(),
            minor in -10_000_000_000i64..10_000_000_000i64,
            scale in 0u32..6,
        ) {
            let value = Decimal::new(minor, scale);
            let mut document = property_policy();
            write(&mut document, &path, &TypedValue::Number(value)).unwrap();

            let ctx: VariableContext =
                resolve(&document, &[VariableDefinition::new("v", "", path.clone(), DataType::Number)]);
            prop_assert_eq!(ctx.number("v"), Some(value));
        }

        #[test]
        fn written_text_resolves_to_same_value(path in path_strategy(), text in "[A-Za-z0-9 ]{1,20}") {
            prop_assume!(!text.trim().is_empty());
            let mut document = json!({});
            write(&mut document, &path, &TypedValue::Text(text.clone())).unwrap();

            let ctx = resolve(&document, &[VariableDefinition::new("v", "", path.clone(), DataType::String)]);
            prop_assert_eq!(ctx.text("v"), Some(text.as_str()));
        }
    }
}
