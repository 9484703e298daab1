//! Computed variables
//!
//! A computed variable is a [`VariableDefinition`] plus the [`ValueSource`]
//! its value comes from. Sources form a closed set: literals, copies,
//! coefficient lookups, decimal arithmetic over variables and literals, and
//! magic derivations. There is no expression language.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use core_kernel::{CalculatorId, TenantId};
use domain_coefficient::{CoefficientCatalog, CoefficientTableId};
use domain_variables::{VariableContext, VariableDefinition};

use crate::error::ComputeFailure;
use crate::magic::MagicValue;

/// Decimal operation applied left to right over the operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// An arithmetic operand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operand {
    /// A NUMBER variable, by code
    Variable(String),
    Literal(Decimal),
}

/// Where a computed variable's value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueSource {
    Literal {
        value: String,
    },
    /// Copy of another variable's value
    Variable {
        code: String,
    },
    /// Result of the calculator's coefficient table with this code
    Coefficient {
        code: String,
    },
    Arithmetic {
        op: ArithmeticOp,
        operands: Vec<Operand>,
        /// Decimal places of the result, rounded half away from zero
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<u32>,
    },
    Magic {
        kind: MagicValue,
    },
}

/// Coefficient tables visible to one calculation
#[derive(Debug, Clone, Copy)]
pub struct CoefficientScope<'a> {
    pub catalog: &'a CoefficientCatalog,
    pub tenant: TenantId,
    pub calculator: CalculatorId,
}

impl CoefficientScope<'_> {
    pub fn table_id(&self, code: &str) -> CoefficientTableId {
        CoefficientTableId::new(self.tenant, self.calculator, code)
    }
}

impl ValueSource {
    /// Produces the raw text of the value
    pub fn evaluate(&self, ctx: &VariableContext, scope: &CoefficientScope<'_>) -> Result<String, ComputeFailure> {
        match self {
            ValueSource::Literal { value } => Ok(value.clone()),
            ValueSource::Variable { code } => ctx
                .get(code)
                .map(|v| v.to_raw())
                .ok_or_else(|| ComputeFailure::MissingOperand(code.clone())),
            ValueSource::Coefficient { code } => scope
                .catalog
                .lookup_in_context(&scope.table_id(code), ctx)
                .ok_or_else(|| ComputeFailure::NoCoefficientRow(code.clone())),
            ValueSource::Arithmetic { op, operands, scale } => {
                let mut result = apply(*op, ctx, operands)?;
                if let Some(scale) = scale {
                    result = result.round_dp_with_strategy(*scale, RoundingStrategy::MidpointAwayFromZero);
                }
                Ok(result.normalize().to_string())
            }
            ValueSource::Magic { kind } => kind.compute(ctx),
        }
    }

    /// Code of the coefficient table this source reads, if any
    pub fn coefficient_code(&self) -> Option<&str> {
        match self {
            ValueSource::Coefficient { code } => Some(code),
            _ => None,
        }
    }
}

fn operand_value(ctx: &VariableContext, operand: &Operand) -> Result<Decimal, ComputeFailure> {
    match operand {
        Operand::Literal(value) => Ok(*value),
        Operand::Variable(code) => ctx
            .number(code)
            .ok_or_else(|| ComputeFailure::MissingOperand(code.clone())),
    }
}

fn apply(op: ArithmeticOp, ctx: &VariableContext, operands: &[Operand]) -> Result<Decimal, ComputeFailure> {
    let (first, rest) = operands.split_first().ok_or(ComputeFailure::NoOperands)?;
    let mut acc = operand_value(ctx, first)?;

    for operand in rest {
        let value = operand_value(ctx, operand)?;
        acc = match op {
            ArithmeticOp::Add => acc.checked_add(value),
            ArithmeticOp::Subtract => acc.checked_sub(value),
            ArithmeticOp::Multiply => acc.checked_mul(value),
            ArithmeticOp::Divide => {
                if value.is_zero() {
                    return Err(ComputeFailure::DivisionByZero);
                }
                acc.checked_div(value)
            }
        }
        .ok_or(ComputeFailure::Overflow)?;
    }
    Ok(acc)
}

/// A variable whose value the calculator produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedVariable {
    #[serde(flatten)]
    pub definition: VariableDefinition,
    pub source: ValueSource,
}

impl ComputedVariable {
    pub fn new(definition: VariableDefinition, source: ValueSource) -> Self {
        Self { definition, source }
    }

    pub fn code(&self) -> &str {
        self.definition.code()
    }
}
