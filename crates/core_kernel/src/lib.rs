//! Core Kernel - Foundational types shared by the calculation engine
//!
//! This crate provides the building blocks used by every engine component:
//! - Money and currency scale with precise decimal arithmetic
//! - Calendar arithmetic for ages and contract terms
//! - Typed identifiers for tenants, calculators and number generators
//! - Port error types for durable product catalog state
//! - Inclusive decimal ranges shared by rules and coefficient tables

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod range;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{Timezone, TemporalError};
pub use identifiers::{
    TenantId, CalculatorId, NumberGeneratorId, CalculationId,
};
pub use ports::{PortError, DomainPort};
pub use range::DecimalRange;
