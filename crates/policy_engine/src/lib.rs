//! Policy Calculation & Validation Engine
//!
//! Turns raw policy documents into typed variables, validation results,
//! premiums and contract numbers, driven by declarative product versions.
//!
//! # Architecture
//!
//! - **domain_variables**: typed values read from and written to documents
//! - **domain_rules**: operator-based validation rules
//! - **domain_coefficient**: pricing factor tables
//! - **domain_calculation**: product versions and the calculator
//! - **domain_numbering**: mask-formatted contract numbers
//!
//! This crate ties them together behind [`PolicyEngine`] and ships the
//! `policy-calc` command line tool.
//!
//! # Example
//!
//! ```rust,ignore
//! use policy_engine::{EngineConfig, PolicyEngine};
//!
//! let config = EngineConfig::from_env()?;
//! let mut engine = PolicyEngine::from_config(&config, port)?;
//! engine.load_products(tenant, &products_dir)?;
//! let report = engine.calculate(tenant, "PROPERTY", None, document)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;

pub use config::EngineConfig;
pub use engine::PolicyEngine;
pub use error::EngineError;
pub use telemetry::init_tracing;
