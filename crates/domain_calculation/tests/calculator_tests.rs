//! Calculation engine tests
//!
//! # Test Organization
//!
//! - `premiums` - per-cover premiums, totals and written results
//! - `failures` - unresolved variables and configuration errors
//! - `deductibles` - default selection and write-back
//! - `loading` - product versions from JSON
//! - `properties` - total premium invariants

use core_kernel::{CalculatorId, Currency, TenantId};
use domain_calculation::{
    ArithmeticOp, CalculationError, CalculationState, Calculator, ComputedVariable, CoverDefinition, Deductible,
    MagicValue, Operand, ProductCatalog, ProductVersion, ValueSource, TOTAL_PREMIUM,
};
use domain_coefficient::{CoefficientCatalog, CoefficientColumn, CoefficientTable, CoefficientTableId};
use domain_rules::{Operator, ValidationRule};
use domain_variables::{DataType, VariableDefinition};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn number(code: &str, path: &str) -> VariableDefinition {
    VariableDefinition::new(code, code, path, DataType::Number)
}

fn computed(code: &str, path: &str, source: ValueSource) -> ComputedVariable {
    ComputedVariable::new(number(code, path), source)
}

fn multiply(codes: &[&str]) -> ValueSource {
    ValueSource::Arithmetic {
        op: ArithmeticOp::Multiply,
        operands: codes.iter().map(|c| Operand::Variable(c.to_string())).collect(),
        scale: Some(2),
    }
}

fn property_product(calculator: CalculatorId) -> ProductVersion {
    let mut product = ProductVersion::new("PROPERTY", 1, calculator);
    product.currency = Currency::RUB;
    product.variables = vec![
        VariableDefinition::new("startDate", "Start", "startDate", DataType::Date),
        VariableDefinition::new("endDate", "End", "endDate", DataType::Date),
        VariableDefinition::new("birthDate", "Birth date", "policyHolder.person.birthDate", DataType::Date),
        VariableDefinition::new("region", "Region", "insuredObjects[0].address.region", DataType::String),
    ];
    product.computed = vec![
        computed(
            "age",
            "",
            ValueSource::Magic {
                kind: MagicValue::Age {
                    birth_date: "birthDate".into(),
                    on_date: "startDate".into(),
                },
            },
        ),
        computed(
            "termMonths",
            "termMonths",
            ValueSource::Magic {
                kind: MagicValue::TermMonths {
                    start: "startDate".into(),
                    end: "endDate".into(),
                },
            },
        ),
        computed("regionFactor", "", ValueSource::Coefficient { code: "KT".into() }),
    ];

    let mut fire = CoverDefinition::new("FIRE", "premium");
    fire.variables = vec![
        number("sumInsured", "sumInsured"),
        VariableDefinition::new("deductible", "Deductible", "deductibleId", DataType::String),
    ];
    fire.computed = vec![
        computed("baseRate", "", ValueSource::Literal { value: "0.002".into() }),
        computed("premium", "premium", multiply(&["sumInsured", "baseRate", "regionFactor"])),
    ];
    fire.sum_insured_code = Some("sumInsured".into());
    fire.deductible_code = Some("deductible".into());
    fire.deductible_path = Some("deductibleId".into());
    fire.deductibles = vec![
        Deductible::new("D0", Some(2)),
        Deductible::new("D5000", Some(1)),
        Deductible::new("NONE", None),
    ];

    let mut flood = CoverDefinition::new("FLOOD", "premium");
    flood.variables = vec![number("sumInsured", "sumInsured")];
    flood.computed = vec![computed("premium", "premium", multiply(&["sumInsured", "floodRate"]))];

    product.covers = vec![fire, flood];
    product.post_rules = vec![ValidationRule::literal("age", Operator::GreaterOrEquals, "18")];
    product
}

fn coefficients(tenant: TenantId, calculator: CalculatorId) -> CoefficientCatalog {
    let mut catalog = CoefficientCatalog::new();
    let table = CoefficientTable::new(
        CoefficientTableId::new(tenant, calculator, "KT"),
        vec![CoefficientColumn::exact("region", "region")],
    )
    .unwrap()
    .with_row(["MSK"], "1.2")
    .unwrap()
    .with_row(["SPB"], "1.1")
    .unwrap();
    catalog.insert(table).unwrap();
    catalog
}

fn policy() -> Value {
    json!({
        "startDate": "2024-01-15",
        "endDate": "2025-01-14",
        "policyHolder": { "person": { "birthDate": "1985-04-12" } },
        "insuredObjects": [
            {
                "address": { "region": "MSK" },
                "covers": [
                    { "code": "FIRE", "sumInsured": 1000000 },
                    { "code": "FLOOD", "sumInsured": 500000 }
                ]
            },
            {
                "address": { "region": "MSK" },
                "covers": [
                    { "code": "FIRE", "sumInsured": "250 000,50", "deductibleId": "D0" }
                ]
            }
        ]
    })
}

struct Fixture {
    tenant: TenantId,
    product: ProductVersion,
    coefficients: CoefficientCatalog,
}

impl Fixture {
    fn new() -> Self {
        let tenant = TenantId::new();
        let calculator = CalculatorId::new();
        Self {
            tenant,
            product: property_product(calculator),
            coefficients: coefficients(tenant, calculator),
        }
    }

    fn calculator(&self) -> Calculator<'_> {
        Calculator::new(self.tenant, &self.coefficients)
    }
}

mod premiums {
    use super::*;

    #[test]
    fn test_cover_premiums_and_total() {
        let fx = Fixture::new();
        let report = fx.calculator().calculate(policy(), &fx.product).unwrap();

        assert_eq!(report.state, CalculationState::Done);
        assert_eq!(report.cover(0, "FIRE").unwrap().premium, Some(dec!(2400)));
        assert_eq!(report.cover(1, "FIRE").unwrap().premium, Some(dec!(600)));
        assert_eq!(report.cover(1, "FIRE").unwrap().sum_insured, Some(dec!(250000.5)));
        assert_eq!(report.total_premium.amount(), dec!(3000));
        assert_eq!(report.total_premium.currency(), Currency::RUB);
    }

    #[test]
    fn test_results_written_into_document() {
        let fx = Fixture::new();
        let report = fx.calculator().calculate(policy(), &fx.product).unwrap();
        let document = &report.document;

        assert_eq!(document["insuredObjects"][0]["covers"][0]["premium"], json!(2400));
        assert_eq!(document["insuredObjects"][1]["covers"][0]["premium"], json!(600));
        assert_eq!(document["premium"], json!(3000));
        assert_eq!(document["termMonths"], json!(12));
        assert!(document["insuredObjects"][0]["covers"][1].get("premium").is_none());
    }

    #[test]
    fn test_product_level_variables_reported() {
        let fx = Fixture::new();
        let report = fx.calculator().calculate(policy(), &fx.product).unwrap();
        let age = report.variables.iter().find(|v| v.code() == "age").unwrap();
        assert_eq!(age.value(), "38");
        assert!(report.post_rule_results.iter().all(|r| r.satisfied));
    }

    #[test]
    fn test_cover_variables_do_not_leak_between_covers() {
        let fx = Fixture::new();
        let report = fx.calculator().calculate(policy(), &fx.product).unwrap();
        let product_codes: Vec<&str> = report.variables.iter().map(|v| v.code()).collect();
        assert!(!product_codes.contains(&"sumInsured"));
        assert_eq!(report.cover(0, "FIRE").unwrap().sum_insured, Some(dec!(1000000)));
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_failed_formula_is_reported_not_raised() {
        let fx = Fixture::new();
        let report = fx.calculator().calculate(policy(), &fx.product).unwrap();

        assert_eq!(report.unresolved_variable_codes(), vec!["premium".to_string()]);
        let flood = &report.unresolved[0];
        assert_eq!(flood.cover.as_deref(), Some("FLOOD"));
        assert_eq!(flood.object_index, Some(0));
        assert!(flood.reason.contains("floodRate"));
        assert_eq!(report.cover(0, "FLOOD").unwrap().premium, None);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_missing_region_row_leaves_dependent_premiums_unset() {
        let fx = Fixture::new();
        let mut document = policy();
        document["insuredObjects"][0]["address"]["region"] = json!("KZN");

        let report = fx.calculator().calculate(document, &fx.product).unwrap();

        let codes = report.unresolved_variable_codes();
        assert_eq!(codes, vec!["regionFactor".to_string(), "premium".to_string()]);
        assert_eq!(report.total_premium.amount(), Decimal::ZERO);
        assert_eq!(report.state, CalculationState::Done);
    }

    #[test]
    fn test_missing_coefficient_table_is_configuration_error() {
        let fx = Fixture::new();
        let empty = CoefficientCatalog::new();
        let result = Calculator::new(fx.tenant, &empty).calculate(policy(), &fx.product);
        assert!(matches!(result, Err(CalculationError::MissingCoefficientTable(_))));
    }

    #[test]
    fn test_total_overflow_is_reported_not_raised() {
        let tenant = TenantId::new();
        let empty = CoefficientCatalog::new();
        let mut product = ProductVersion::new("BULK", 1, CalculatorId::new());
        let mut lump = CoverDefinition::new("LUMP", "premium");
        lump.variables = vec![number("premium", "premium")];
        product.covers = vec![lump];

        let huge = Decimal::MAX.to_string();
        let document = json!({
            "insuredObjects": [
                { "covers": [{ "code": "LUMP", "premium": huge }] },
                { "covers": [{ "code": "LUMP", "premium": huge }] }
            ]
        });

        let report = Calculator::new(tenant, &empty).calculate(document, &product).unwrap();

        assert_eq!(report.state, CalculationState::Done);
        assert_eq!(report.cover(0, "LUMP").unwrap().premium, Some(Decimal::MAX));
        assert_eq!(report.cover(1, "LUMP").unwrap().premium, Some(Decimal::MAX));
        assert_eq!(report.unresolved_variable_codes(), vec![TOTAL_PREMIUM.to_string()]);
        assert_eq!(report.total_premium.amount(), Decimal::ZERO);
        assert!(report.document.get("premium").is_none());
    }

    #[test]
    fn test_document_without_objects() {
        let fx = Fixture::new();
        let report = fx
            .calculator()
            .calculate(json!({ "startDate": "2024-01-15" }), &fx.product)
            .unwrap();
        assert!(report.covers.is_empty());
        assert_eq!(report.document["premium"], json!(0));
    }
}

mod deductibles {
    use super::*;

    #[test]
    fn test_default_deductible_written_when_absent() {
        let fx = Fixture::new();
        let report = fx.calculator().calculate(policy(), &fx.product).unwrap();

        assert_eq!(report.cover(0, "FIRE").unwrap().deductible_id.as_deref(), Some("D5000"));
        assert_eq!(report.document["insuredObjects"][0]["covers"][0]["deductibleId"], json!("D5000"));
    }

    #[test]
    fn test_chosen_deductible_kept() {
        let fx = Fixture::new();
        let report = fx.calculator().calculate(policy(), &fx.product).unwrap();
        assert_eq!(report.cover(1, "FIRE").unwrap().deductible_id.as_deref(), Some("D0"));
        assert_eq!(report.document["insuredObjects"][1]["covers"][0]["deductibleId"], json!("D0"));
    }
}

mod loading {
    use super::*;

    fn product_json(calculator: CalculatorId) -> String {
        format!(
            r#"{{
                "productCode": "ACCIDENT",
                "versionNo": 2,
                "calculatorId": "{}",
                "currency": "RUB",
                "variables": [
                    {{ "code": "sumInsured", "path": "sumInsured", "dataType": "NUMBER" }}
                ],
                "computed": [
                    {{
                        "code": "policyPremium",
                        "dataType": "NUMBER",
                        "source": {{
                            "type": "ARITHMETIC",
                            "op": "MULTIPLY",
                            "operands": [{{ "variable": "sumInsured" }}, {{ "literal": "0.015" }}],
                            "scale": 2
                        }}
                    }}
                ],
                "covers": [
                    {{
                        "code": "DEATH",
                        "premiumCode": "premium",
                        "computed": [
                            {{
                                "code": "premium",
                                "dataType": "NUMBER",
                                "path": "premium",
                                "source": {{ "type": "VARIABLE", "code": "policyPremium" }}
                            }}
                        ]
                    }}
                ],
                "totalPremiumPath": "result.totalPremium",
                "preRules": [
                    {{ "leftKey": "sumInsured", "rightLiteral": "100000-3000000", "operator": "RANGE" }}
                ]
            }}"#,
            calculator.as_uuid()
        )
    }

    #[test]
    fn test_product_from_catalog_json() {
        let tenant = TenantId::new();
        let calculator = CalculatorId::new();
        let mut catalog = ProductCatalog::new();
        assert_eq!(catalog.load_from_str(tenant, &product_json(calculator)).unwrap(), 1);

        let product = catalog.get(tenant, "ACCIDENT", 2).unwrap();
        let coefficients = CoefficientCatalog::new();
        let calculator = Calculator::new(tenant, &coefficients);
        let document = json!({
            "sumInsured": 2000000,
            "insuredObjects": [ { "covers": [ { "code": "DEATH" } ] } ]
        });

        assert!(calculator.pre_validate(&document, &product).iter().all(|r| r.satisfied));
        let report = calculator.calculate(document, &product).unwrap();
        assert_eq!(report.document["result"]["totalPremium"], json!(30000));
        assert_eq!(report.document["insuredObjects"][0]["covers"][0]["premium"], json!(30000));
    }

    #[test]
    fn test_unknown_version() {
        let catalog = ProductCatalog::new();
        assert!(matches!(
            catalog.get(TenantId::new(), "ACCIDENT", 7),
            Err(CalculationError::ProductNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_cover_path_pattern_rejected() {
        let json = product_json(CalculatorId::new()).replace(
            r#""totalPremiumPath""#,
            r#""coverPath": "insuredObjects[{object}].covers[?(@.code == ", "totalPremiumPath""#,
        );
        assert!(matches!(
            ProductVersion::from_json(&json),
            Err(CalculationError::InvalidPath { .. })
        ));
    }
}

mod properties {
    use super::*;

    proptest! {
        #[test]
        fn total_is_rounded_sum_of_cover_premiums(sums in prop::collection::vec(1u64..50_000_000, 1..6)) {
            let fx = Fixture::new();
            let objects: Vec<Value> = sums
                .iter()
                .map(|s| json!({ "address": { "region": "MSK" }, "covers": [ { "code": "FIRE", "sumInsured": s } ] }))
                .collect();
            let document = json!({ "startDate": "2024-01-15", "endDate": "2025-01-14", "insuredObjects": objects });

            let report = fx.calculator().calculate(document, &fx.product).unwrap();

            let premiums: Decimal = report.covers.iter().filter_map(|c| c.premium).sum();
            prop_assert_eq!(report.covers.len(), sums.len());
            prop_assert_eq!(report.total_premium.amount(), Currency::RUB.round(premiums));
        }
    }
}
