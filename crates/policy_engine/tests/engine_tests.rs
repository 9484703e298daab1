//! Engine facade tests
//!
//! These tests drive the engine the way an orchestrator does: product
//! definitions loaded from JSON, raw documents in, reports and numbers out.
//!
//! # Test Organization
//!
//! - `calculation` - premiums, totals and post rules for the TRAVEL product
//! - `validation` - pre rules and standalone rule sets
//! - `coefficients` - lookups through the facade
//! - `numbering` - issuing numbers through the configured generator
//! - `properties` - totals over generated documents

use chrono::NaiveDate;
use core_kernel::{CalculatorId, Currency, TenantId};
use domain_calculation::{CalculationError, CalculationState};
use domain_coefficient::{CoefficientColumn, CoefficientTableId};
use domain_numbering::{InMemoryNumberGeneratorStore, NumberGeneratorPort, NumberingError};
use policy_engine::{EngineConfig, EngineError, PolicyEngine};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use test_utils::*;

// ============================================================================
// TEST FIXTURES
// ============================================================================

struct Fixture {
    tenant: TenantId,
    calculator: CalculatorId,
    store: Arc<InMemoryNumberGeneratorStore>,
    engine: PolicyEngine,
}

impl Fixture {
    fn new() -> Self {
        let tenant = TenantId::new();
        let calculator = CalculatorId::new();
        let store = Arc::new(InMemoryNumberGeneratorStore::new());
        let mut engine = PolicyEngine::from_config(&EngineConfig::default(), store.clone()).unwrap();

        engine
            .products_mut()
            .load_from_str(tenant, &ProductFixtures::travel_json(calculator))
            .unwrap();
        engine
            .coefficients_mut()
            .insert(CoefficientFixtures::age_table(tenant, calculator))
            .unwrap();
        engine
            .coefficients_mut()
            .insert(CoefficientFixtures::region_table(tenant, calculator))
            .unwrap();

        Self {
            tenant,
            calculator,
            store,
            engine,
        }
    }

    fn two_travellers() -> PolicyDocumentBuilder {
        PolicyDocumentBuilder::new()
            .with_object("MSK", &[("MEDICAL", dec!(50000))])
            .with_object("SPB", &[("MEDICAL", dec!(30000))])
    }
}

mod calculation {
    use super::*;

    #[test]
    fn test_travel_premiums() {
        let fx = Fixture::new();
        let document = Fixture::two_travellers().build();

        let report = fx
            .engine
            .calculate(fx.tenant, ProductFixtures::TRAVEL, None, document)
            .unwrap();

        assert_eq!(report.state, CalculationState::Done);
        assert_complete(&report);
        assert_premium(&report, 0, "MEDICAL", dec!(70));
        assert_premium(&report, 1, "MEDICAL", dec!(42));
        assert_money_eq(&report.total_premium, dec!(112), Currency::RUB);
        assert_all_satisfied(&report.post_rule_results);

        assert_eq!(report.document["termDays"], json!(14));
        assert_eq!(report.document["premium"], json!(112));
        assert_eq!(report.document["insuredObjects"][1]["covers"][0]["premium"], json!(42));
    }

    #[test]
    fn test_senior_traveller_fails_post_rule_only() {
        let fx = Fixture::new();
        let document = PolicyDocumentBuilder::new()
            .with_birth_date(NaiveDate::from_ymd_opt(1944, 1, 1).unwrap())
            .with_object("MSK", &[("MEDICAL", dec!(50000))])
            .build();

        let report = fx
            .engine
            .calculate(fx.tenant, ProductFixtures::TRAVEL, Some(1), document)
            .unwrap();

        assert_premium(&report, 0, "MEDICAL", dec!(175));
        assert_failed_rules(&report.post_rule_results, &["age"]);
        assert_eq!(report.post_rule_results[0].message.as_deref(), Some("Age out of range"));
    }

    #[test]
    fn test_missing_birth_date_reported_not_raised() {
        let fx = Fixture::new();
        let document = Fixture::two_travellers().without_birth_date().build();

        let report = fx
            .engine
            .calculate(fx.tenant, ProductFixtures::TRAVEL, None, document)
            .unwrap();

        assert_unresolved(&report, &["age", "ageFactor", "premium"]);
        assert!(report.covers.iter().all(|c| c.premium.is_none()));
        assert_money_eq(&report.total_premium, Decimal::ZERO, Currency::RUB);
        assert_eq!(report.document["termDays"], json!(14));
    }

    #[test]
    fn test_unknown_product_version() {
        let fx = Fixture::new();
        let err = fx
            .engine
            .calculate(fx.tenant, ProductFixtures::TRAVEL, Some(9), json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Calculation(CalculationError::ProductNotFound { version_no: Some(9), .. })
        ));
    }

    #[test]
    fn test_missing_coefficient_table_is_configuration_error() {
        let tenant = TenantId::new();
        let store = Arc::new(InMemoryNumberGeneratorStore::new());
        let mut engine = PolicyEngine::from_config(&EngineConfig::default(), store).unwrap();
        engine
            .products_mut()
            .load_from_str(tenant, &ProductFixtures::travel_json(CalculatorId::new()))
            .unwrap();

        let err = engine
            .calculate(tenant, ProductFixtures::TRAVEL, None, Fixture::two_travellers().build())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Calculation(CalculationError::MissingCoefficientTable(_))
        ));
    }

    #[test]
    fn test_configured_currency_applies_to_loaded_products() {
        let tenant = TenantId::new();
        let calculator = CalculatorId::new();
        let config = EngineConfig {
            default_currency: "EUR".to_string(),
            ..EngineConfig::default()
        };
        let mut engine = PolicyEngine::from_config(&config, Arc::new(InMemoryNumberGeneratorStore::new())).unwrap();
        engine
            .products_mut()
            .load_from_str(tenant, &ProductFixtures::travel_json(calculator))
            .unwrap();
        engine
            .coefficients_mut()
            .insert(CoefficientFixtures::age_table(tenant, calculator))
            .unwrap();

        let report = engine
            .calculate(tenant, ProductFixtures::TRAVEL, None, Fixture::two_travellers().build())
            .unwrap();
        assert_money_eq(&report.total_premium, dec!(112), Currency::EUR);
    }
}

mod validation {
    use super::*;

    #[test]
    fn test_pre_rules_pass() {
        let fx = Fixture::new();
        let document = Fixture::two_travellers().with_random_holder().build();
        let results = fx
            .engine
            .pre_validate(fx.tenant, ProductFixtures::TRAVEL, None, &document)
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_all_satisfied(&results);
    }

    #[test]
    fn test_pre_rules_report_every_failure() {
        let fx = Fixture::new();
        let document = Fixture::two_travellers()
            .without_birth_date()
            .with_email("not-an-email")
            .with_raw_period("2024-07-14", "2024-07-01")
            .build();

        let results = fx
            .engine
            .pre_validate(fx.tenant, ProductFixtures::TRAVEL, None, &document)
            .unwrap();
        assert_failed_rules(&results, &["birthDate", "email", "startDate"]);
    }

    #[test]
    fn test_standalone_rule_set() {
        let fx = Fixture::new();
        let document = Fixture::two_travellers().build();
        let ctx = fx.engine.resolve_variables(&document, &RuleFixtures::contact_variables());

        let results = fx.engine.validate(&ctx, &RuleFixtures::contact_rules());
        assert_eq!(results.len(), 5);
        assert_all_satisfied(&results);
    }

    #[test]
    fn test_standalone_rule_set_collects_failures() {
        let fx = Fixture::new();
        let document = PolicyDocumentBuilder::new()
            .with_phone("12345")
            .with_object("VLD", &[("MEDICAL", dec!(5000))])
            .build();
        let ctx = fx.engine.resolve_variables(&document, &RuleFixtures::contact_variables());

        let results = fx.engine.validate(&ctx, &RuleFixtures::contact_rules());
        assert_eq!(results.len(), 5);
        assert_failed_rules(&results, &["phone", "region", "sumInsured"]);
    }
}

mod coefficients {
    use super::*;

    #[test]
    fn test_lookup_through_facade() {
        let fx = Fixture::new();
        let document = Fixture::two_travellers().build();
        let ctx = fx.engine.resolve_variables(&document, &RuleFixtures::contact_variables());
        let id = CoefficientTableId::new(fx.tenant, fx.calculator, "KT");
        let columns = [CoefficientColumn::exact("region", "region")];

        assert_eq!(fx.engine.lookup_coefficient(&id, &ctx, &columns), Some("1.2".to_string()));
    }

    #[test]
    fn test_star_row_is_not_a_wildcard() {
        let fx = Fixture::new();
        let document = PolicyDocumentBuilder::new()
            .with_object("SPB", &[("MEDICAL", dec!(50000))])
            .build();
        let ctx = fx.engine.resolve_variables(&document, &RuleFixtures::contact_variables());
        let id = CoefficientTableId::new(fx.tenant, fx.calculator, "KT");
        let columns = [CoefficientColumn::exact("region", "region")];

        assert_eq!(fx.engine.lookup_coefficient(&id, &ctx, &columns), None);
    }
}

mod numbering {
    use super::*;

    #[tokio::test]
    async fn test_next_number_through_facade() {
        let fx = Fixture::new();
        fx.store
            .save(NumberFixtures::generator(fx.tenant, ProductFixtures::TRAVEL, "TR-{BRANCH}-{XXXX}"))
            .await
            .unwrap();

        let values = HashMap::from([("BRANCH".to_string(), "MSK".to_string())]);
        let first = fx.engine.next_number(fx.tenant, ProductFixtures::TRAVEL, &values).await.unwrap();
        let second = fx.engine.next_number(fx.tenant, ProductFixtures::TRAVEL, &values).await.unwrap();

        assert_eq!(first, "TR-MSK-0001");
        assert_eq!(second, "TR-MSK-0002");
    }

    #[tokio::test]
    async fn test_next_number_without_generator() {
        let fx = Fixture::new();
        let err = fx
            .engine
            .next_number(fx.tenant, "KASKO", &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Numbering(NumberingError::NotFound { .. })));
        assert!(!err.is_retryable());
    }
}

mod properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_total_is_rounded_sum_of_covers(document in travel_document_strategy()) {
            let fx = Fixture::new();
            let objects = document["insuredObjects"].as_array().map(Vec::len).unwrap_or(0);

            let report = fx
                .engine
                .calculate(fx.tenant, ProductFixtures::TRAVEL, None, document)
                .unwrap();

            prop_assert_eq!(report.covers.len(), objects);
            let sum: Decimal = report.covers.iter().filter_map(|c| c.premium).sum();
            prop_assert_eq!(report.total_premium.amount(), Currency::RUB.round(sum));
            prop_assert!(report.state.is_terminal());
        }
    }
}
