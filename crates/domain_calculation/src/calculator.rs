//! Calculation engine
//!
//! Runs one product version over one policy document:
//!
//! 1. Resolve the product-level variables and run the product-level
//!    computations in declaration order.
//! 2. For every insured object and every cover the product defines that is
//!    present on the object, resolve the cover variables relative to the
//!    cover node in a child context and run the cover computations.
//! 3. Select the deductible of each cover, falling back to the first option.
//! 4. Sum the cover premiums, round once to the currency, and write the total.
//!
//! A computed variable that cannot be produced is left unset and listed in
//! the report; the calculation carries on. Only configuration errors stop it.

use serde_json::Value;
use tracing::{debug, info, instrument, warn, Span};

use core_kernel::{CalculationId, Money, MoneyError, TenantId};
use domain_coefficient::{CoefficientCatalog, CoefficientTableId};
use domain_rules::{RuleResult, Validator};
use domain_variables::{resolve, resolve_into, write_at, Path, TypedValue, VariableContext};

use crate::computed::{CoefficientScope, ComputedVariable};
use crate::deductible::default_deductible;
use crate::error::{CalculationError, ComputeFailure};
use crate::product::{CoverDefinition, ProductVersion};
use crate::report::{CalculationReport, CalculationState, CoverResult, Unresolved};

/// Where a computation runs: product level or one cover of one object
#[derive(Debug, Clone, Copy)]
struct Scope<'p> {
    prefix: Option<&'p Path>,
    cover: Option<(usize, &'p str)>,
}

const PRODUCT_SCOPE: Scope<'static> = Scope {
    prefix: None,
    cover: None,
};

impl Scope<'_> {
    fn unresolved(&self, code: &str, reason: impl Into<String>) -> Unresolved {
        Unresolved {
            code: code.to_string(),
            cover: self.cover.map(|(_, code)| code.to_string()),
            object_index: self.cover.map(|(index, _)| index),
            reason: reason.into(),
        }
    }
}

/// Code reported when the cover premiums cannot be summed
pub const TOTAL_PREMIUM: &str = "totalPremium";

/// Sums the resolved cover premiums, rounding once at the end
fn sum_premiums(covers: &[CoverResult], product: &ProductVersion) -> Result<Money, MoneyError> {
    let total = covers
        .iter()
        .filter_map(|c| c.premium)
        .try_fold(Money::zero(product.currency), |acc, premium| acc.checked_add_amount(premium))?;
    Ok(total.round_to_currency())
}

fn advance(state: &mut CalculationState, next: CalculationState) {
    debug_assert!(state.can_transition_to(next), "{:?} -> {:?}", state, next);
    debug!(from = ?state, to = ?next, "Calculation state");
    *state = next;
}

/// Calculates premiums for one tenant's products
pub struct Calculator<'a> {
    tenant: TenantId,
    coefficients: &'a CoefficientCatalog,
}

impl<'a> Calculator<'a> {
    pub fn new(tenant: TenantId, coefficients: &'a CoefficientCatalog) -> Self {
        Self { tenant, coefficients }
    }

    /// Runs the product over the document
    ///
    /// Returns `Err` only for configuration errors: invalid output paths or
    /// coefficient tables the product refers to but the catalog lacks.
    #[instrument(
        skip(self, document, product),
        fields(
            tenant = %self.tenant,
            product = %product.product_code,
            version = product.version_no,
            calculation_id = tracing::field::Empty
        )
    )]
    pub fn calculate(&self, document: Value, product: &ProductVersion) -> Result<CalculationReport, CalculationError> {
        let calculation_id = CalculationId::new();
        Span::current().record("calculation_id", tracing::field::display(calculation_id));

        let mut state = CalculationState::Loaded;
        match self.run(calculation_id, &mut state, document, product) {
            Ok(report) => Ok(report),
            Err(err) => {
                advance(&mut state, CalculationState::Failed);
                warn!(error = %err, "Calculation failed");
                Err(err)
            }
        }
    }

    /// Evaluates the product's pre-calculation rules against the document
    pub fn pre_validate(&self, document: &Value, product: &ProductVersion) -> Vec<RuleResult> {
        let ctx = resolve(document, &product.variables);
        Validator::validate(&ctx, &product.pre_rules)
    }

    fn run(
        &self,
        calculation_id: CalculationId,
        state: &mut CalculationState,
        mut document: Value,
        product: &ProductVersion,
    ) -> Result<CalculationReport, CalculationError> {
        self.check(product)?;
        let objects_path = product.insured_objects()?;
        let total_path = product.total_premium()?;
        let scope = CoefficientScope {
            catalog: self.coefficients,
            tenant: self.tenant,
            calculator: product.calculator_id,
        };

        let mut ctx = resolve(&document, &product.variables);
        advance(state, CalculationState::VariablesResolved);

        advance(state, CalculationState::Computing);
        let mut unresolved = Vec::new();
        for computed in &product.computed {
            execute(&mut ctx, &mut document, computed, PRODUCT_SCOPE, &scope, &mut unresolved);
        }

        let object_count = objects_path
            .read(&document)
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);

        let mut covers = Vec::new();
        for object_index in 0..object_count {
            for cover in &product.covers {
                let cover_path = product.cover_path_for(object_index, &cover.code)?;
                if cover_path.read(&document).is_none() {
                    continue;
                }
                let result = calculate_cover(
                    &ctx,
                    &mut document,
                    cover,
                    Scope {
                        prefix: Some(&cover_path),
                        cover: Some((object_index, cover.code.as_str())),
                    },
                    &scope,
                    &mut unresolved,
                );
                covers.push(result);
            }
        }

        let total_premium = match sum_premiums(&covers, product) {
            Ok(total) => {
                write_at(&mut document, &total_path, &TypedValue::Number(total.amount()));
                total
            }
            Err(err) => {
                warn!(error = %err, "Total premium left unset");
                unresolved.push(PRODUCT_SCOPE.unresolved(TOTAL_PREMIUM, ComputeFailure::Overflow.to_string()));
                Money::zero(product.currency)
            }
        };

        let post_rule_results = Validator::validate(&ctx, &product.post_rules);
        advance(state, CalculationState::Done);

        info!(
            covers = covers.len(),
            total_premium = %total_premium,
            unresolved = unresolved.len(),
            "Calculation finished"
        );

        Ok(CalculationReport {
            calculation_id,
            document,
            total_premium,
            covers,
            variables: ctx.snapshot(),
            unresolved,
            post_rule_results,
            state: *state,
        })
    }

    fn check(&self, product: &ProductVersion) -> Result<(), CalculationError> {
        product.check()?;
        for code in product.coefficient_codes() {
            let id = CoefficientTableId::new(self.tenant, product.calculator_id, code);
            if !self.coefficients.contains(&id) {
                return Err(CalculationError::MissingCoefficientTable(id));
            }
        }
        Ok(())
    }
}

fn calculate_cover(
    parent: &VariableContext,
    document: &mut Value,
    cover: &CoverDefinition,
    scope: Scope<'_>,
    coefficients: &CoefficientScope<'_>,
    unresolved: &mut Vec<Unresolved>,
) -> CoverResult {
    let mut ctx = parent.child();
    resolve_into(&mut ctx, document, &cover.variables, scope.prefix);

    for computed in &cover.computed {
        execute(&mut ctx, document, computed, scope, coefficients, unresolved);
    }

    let deductible_id = select_deductible(&mut ctx, document, cover, scope);

    let premium = ctx.number(&cover.premium_code);
    if premium.is_none() {
        let reported = unresolved.iter().any(|u| {
            u.code == cover.premium_code
                && u.cover.as_deref() == Some(cover.code.as_str())
                && u.object_index == scope.cover.map(|(index, _)| index)
        });
        if !reported {
            unresolved.push(scope.unresolved(&cover.premium_code, "Premium not resolved"));
        }
    }

    CoverResult {
        object_index: scope.cover.map(|(index, _)| index).unwrap_or_default(),
        cover_code: cover.code.clone(),
        premium,
        sum_insured: cover
            .sum_insured_code
            .as_deref()
            .and_then(|code| ctx.number(code)),
        deductible_id,
    }
}

/// Computes one variable, writing it to its path on success
fn execute(
    ctx: &mut VariableContext,
    document: &mut Value,
    computed: &ComputedVariable,
    scope: Scope<'_>,
    coefficients: &CoefficientScope<'_>,
    unresolved: &mut Vec<Unresolved>,
) {
    let code = computed.code();
    ctx.insert_definition(computed.definition.clone());

    let outcome = computed.source.evaluate(ctx, coefficients).and_then(|raw| {
        if raw.trim().is_empty() {
            return Err(ComputeFailure::Unparsable(raw));
        }
        ctx.set_raw(code, &raw).map_err(|_| ComputeFailure::Unparsable(raw))
    });

    match outcome {
        Ok(()) => {
            if let Some(value) = ctx.get(code) {
                if let Some(path) = output_path(&computed.definition.path, scope.prefix) {
                    write_at(document, &path, value);
                }
            }
        }
        Err(failure) => {
            ctx.unset(code);
            debug!(code, cover = ?scope.cover, reason = %failure, "Computed variable unresolved");
            unresolved.push(scope.unresolved(code, failure.to_string()));
        }
    }
}

fn output_path(raw: &str, prefix: Option<&Path>) -> Option<Path> {
    if raw.trim().is_empty() {
        return None;
    }
    match Path::parse(raw) {
        Ok(path) => Some(match prefix {
            Some(prefix) => prefix.join(&path),
            None => path,
        }),
        Err(e) => {
            debug!(path = raw, error = %e, "Skipping unparsable output path");
            None
        }
    }
}

/// Picks the cover's deductible and writes its id
fn select_deductible(
    ctx: &mut VariableContext,
    document: &mut Value,
    cover: &CoverDefinition,
    scope: Scope<'_>,
) -> Option<String> {
    let chosen = cover
        .deductible_code
        .as_deref()
        .map(|code| ctx.raw(code))
        .filter(|id| !id.is_empty());

    let id = match chosen {
        Some(id) => id,
        None => {
            let id = default_deductible(&cover.deductibles)?.id.clone();
            if let Some(code) = cover.deductible_code.as_deref() {
                if let Err(e) = ctx.set_raw(code, &id) {
                    debug!(code, error = %e, "Default deductible not stored");
                }
            }
            id
        }
    };

    if let Some(path) = cover.deductible_path.as_deref().and_then(|p| output_path(p, scope.prefix)) {
        write_at(document, &path, &TypedValue::Text(id.clone()));
    }
    Some(id)
}
