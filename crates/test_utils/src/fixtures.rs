//! Pre-built Test Fixtures
//!
//! Provides ready-to-use product configuration for engine tests. The TRAVEL
//! product prices one MEDICAL cover per traveller:
//!
//! ```text
//! premium = sumInsured * 0.0001 * ageFactor(KAGE) * termDays
//! ```

use chrono::NaiveDate;
use core_kernel::{CalculatorId, TenantId};
use domain_coefficient::{CoefficientColumn, CoefficientTable, CoefficientTableId};
use domain_numbering::NumberGeneratorState;
use domain_rules::{Operator, ValidationRule};
use domain_variables::{DataType, VariableDefinition};

/// Fixture for product definitions
pub struct ProductFixtures;

impl ProductFixtures {
    /// Product code of the travel fixture
    pub const TRAVEL: &'static str = "TRAVEL";

    /// TRAVEL version 1 as catalog JSON
    pub fn travel_json(calculator: CalculatorId) -> String {
        format!(
            r#"{{
                "productCode": "TRAVEL",
                "versionNo": 1,
                "calculatorId": "{}",
                "variables": [
                    {{"code": "startDate", "path": "startDate", "dataType": "DATE"}},
                    {{"code": "endDate", "path": "endDate", "dataType": "DATE"}},
                    {{"code": "birthDate", "path": "policyHolder.person.birthDate", "dataType": "DATE"}},
                    {{"code": "email", "path": "policyHolder.contacts.email", "dataType": "STRING"}},
                    {{"code": "phone", "path": "policyHolder.contacts.phone", "dataType": "STRING"}}
                ],
                "computed": [
                    {{"code": "age", "dataType": "NUMBER",
                      "source": {{"type": "MAGIC", "kind": {{"name": "AGE", "birthDate": "birthDate", "onDate": "startDate"}}}}}},
                    {{"code": "termDays", "path": "termDays", "dataType": "NUMBER",
                      "source": {{"type": "MAGIC", "kind": {{"name": "TERM_DAYS", "start": "startDate", "end": "endDate"}}}}}},
                    {{"code": "ageFactor", "dataType": "NUMBER",
                      "source": {{"type": "COEFFICIENT", "code": "KAGE"}}}}
                ],
                "covers": [
                    {{
                        "code": "MEDICAL",
                        "variables": [{{"code": "sumInsured", "path": "sumInsured", "dataType": "NUMBER"}}],
                        "computed": [
                            {{"code": "premium", "path": "premium", "dataType": "NUMBER",
                              "source": {{"type": "ARITHMETIC", "op": "MULTIPLY", "scale": 2,
                                         "operands": [{{"variable": "sumInsured"}}, {{"literal": "0.0001"}},
                                                      {{"variable": "ageFactor"}}, {{"variable": "termDays"}}]}}}}
                        ],
                        "premiumCode": "premium",
                        "sumInsuredCode": "sumInsured"
                    }}
                ],
                "totalPremiumPath": "premium",
                "preRules": [
                    {{"leftKey": "birthDate", "operator": "NOT_NULL", "message": "Birth date is required"}},
                    {{"leftKey": "email", "operator": "EMAIL", "message": "Email is invalid"}},
                    {{"leftKey": "startDate", "operator": "<=", "rightKey": "endDate", "message": "Period is reversed"}}
                ],
                "postRules": [
                    {{"leftKey": "age", "operator": "RANGE", "rightLiteral": "18-75", "message": "Age out of range"}}
                ]
            }}"#,
            calculator.as_uuid()
        )
    }
}

/// Fixture for coefficient tables
pub struct CoefficientFixtures;

impl CoefficientFixtures {
    /// Age factor table used by TRAVEL
    pub fn age_table(tenant: TenantId, calculator: CalculatorId) -> CoefficientTable {
        let mut table = CoefficientTable::new(
            CoefficientTableId::new(tenant, calculator, "KAGE"),
            vec![CoefficientColumn::range("age", "age")],
        )
        .expect("age table columns are distinct");
        for (ages, factor) in [("0-17", "0.8"), ("18-64", "1.0"), ("65-120", "2.5")] {
            table.push_row([ages], factor).expect("one cell per row");
        }
        table
    }

    /// Region table with a literal `*` row
    pub fn region_table(tenant: TenantId, calculator: CalculatorId) -> CoefficientTable {
        let mut table = CoefficientTable::new(
            CoefficientTableId::new(tenant, calculator, "KT"),
            vec![CoefficientColumn::exact("region", "region")],
        )
        .expect("region table columns are distinct");
        for (region, factor) in [("MSK", "1.2"), ("*", "1.0")] {
            table.push_row([region], factor).expect("one cell per row");
        }
        table
    }
}

/// Fixture for standalone variables and rules
pub struct RuleFixtures;

impl RuleFixtures {
    /// Contact variables of a policy holder
    pub fn contact_variables() -> Vec<VariableDefinition> {
        vec![
            VariableDefinition::new("email", "Email", "policyHolder.contacts.email", DataType::String),
            VariableDefinition::new("phone", "Phone", "policyHolder.contacts.phone", DataType::String),
            VariableDefinition::new("birthDate", "Birth date", "policyHolder.person.birthDate", DataType::Date),
            VariableDefinition::new("region", "Region", "insuredObjects[0].address.region", DataType::String),
            VariableDefinition::new("sumInsured", "Sum insured", "insuredObjects[0].covers[0].sumInsured", DataType::Number),
        ]
    }

    /// Rules over [`RuleFixtures::contact_variables`]
    pub fn contact_rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::unary("email", Operator::Email).with_message("Email is invalid"),
            ValidationRule::unary("phone", Operator::Phone).with_message("Phone is invalid"),
            ValidationRule::unary("birthDate", Operator::NotNull).with_message("Birth date is required"),
            ValidationRule::literal("region", Operator::InList, "MSK,SPB,KZN").with_message("Region not served"),
            ValidationRule::literal("sumInsured", Operator::Range, "10000-1000000").with_message("Sum insured out of range"),
        ]
    }
}

/// Fixture for number generators
pub struct NumberFixtures;

impl NumberFixtures {
    /// A generator created on 2024-01-01
    pub fn generator(tenant: TenantId, product_code: &str, mask: &str) -> NumberGeneratorState {
        NumberGeneratorState::new(tenant, product_code, mask, Self::created_on())
            .expect("fixture masks are well formed")
    }

    pub fn created_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }
}
