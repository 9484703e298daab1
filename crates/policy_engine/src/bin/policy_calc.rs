//! policy-calc - run the engine over JSON files
//!
//! # Usage
//!
//! ```bash
//! # Calculate a policy with the latest version of a product
//! policy-calc --tenant <uuid> calculate --products products/ --coefficients kt.json \
//!     --product PROPERTY --document policy.json
//!
//! # Validate a document against a rule set
//! policy-calc validate --variables vars.json --rules rules.json --document policy.json
//!
//! # Issue the next number of a stored generator and save the advanced counter
//! policy-calc next-number --generator osago.json --value BRANCH=MSK --write
//! ```
//!
//! # Environment Variables
//!
//! * `ENGINE_LOG_LEVEL` - log filter when `RUST_LOG` is unset (default: info)
//! * `ENGINE_LOG_JSON` - emit JSON logs (default: false)
//! * `ENGINE_TIMEZONE` - timezone for dates in numbers (default: Europe/Moscow)
//! * `ENGINE_NUMBER_CAS_MAX_RETRIES` - attempts per issued number (default: 5)
//! * `ENGINE_DEFAULT_CURRENCY` - currency of products that name none (default: RUB)
//! * `ENGINE_PRODUCTS_DIR` - product definitions when `--products` is not given

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use core_kernel::TenantId;
use domain_numbering::{InMemoryNumberGeneratorStore, NumberGeneratorPort, NumberGeneratorState};
use domain_rules::{all_satisfied, parse_rules};
use domain_variables::VariableDefinition;
use policy_engine::{init_tracing, EngineConfig, PolicyEngine};

#[derive(Parser)]
#[command(name = "policy-calc")]
#[command(about = "Calculate, validate and number insurance policies from product definitions")]
struct Args {
    /// Tenant the product definitions belong to
    #[arg(long, env = "ENGINE_TENANT")]
    tenant: Option<TenantId>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate premiums for a policy document
    Calculate {
        /// Product definition file or directory
        #[arg(long)]
        products: Option<PathBuf>,

        /// Coefficient tables file
        #[arg(long)]
        coefficients: Option<PathBuf>,

        /// Product code
        #[arg(long)]
        product: String,

        /// Product version; latest when omitted
        #[arg(long)]
        version: Option<u32>,

        /// Policy document
        #[arg(long)]
        document: PathBuf,

        /// Exit with failure when any computed variable stays unset
        #[arg(long)]
        strict: bool,
    },

    /// Validate a policy document against a rule set
    Validate {
        /// Variable definitions file
        #[arg(long)]
        variables: PathBuf,

        /// Validation rules file
        #[arg(long)]
        rules: PathBuf,

        /// Policy document
        #[arg(long)]
        document: PathBuf,
    },

    /// Issue the next number of a generator
    NextNumber {
        /// Generator state file
        #[arg(long)]
        generator: PathBuf,

        /// Mask values as KEY=VALUE
        #[arg(long = "value", value_parser = parse_key_value)]
        values: Vec<(String, String)>,

        /// Save the advanced counter back to the generator file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = EngineConfig::from_env().context("loading engine configuration")?;
    init_tracing(&config);

    let tenant = args.tenant.unwrap_or_default();
    match args.command {
        Command::Calculate {
            products,
            coefficients,
            product,
            version,
            document,
            strict,
        } => {
            let store: Arc<dyn NumberGeneratorPort> = Arc::new(InMemoryNumberGeneratorStore::new());
            let mut engine = PolicyEngine::from_config(&config, store)?;

            let Some(products) = products.or_else(|| config.products_dir.clone()) else {
                bail!("no product definitions: pass --products or set ENGINE_PRODUCTS_DIR");
            };
            engine
                .load_products(tenant, &products)
                .with_context(|| format!("loading products from {}", products.display()))?;
            if let Some(coefficients) = coefficients {
                engine
                    .load_coefficients(&coefficients)
                    .with_context(|| format!("loading coefficients from {}", coefficients.display()))?;
            }

            let report = engine.calculate(tenant, &product, version, read_json(&document)?)?;
            print_json(&report, args.pretty)?;
            if strict && !report.is_complete() {
                eprintln!("Unresolved: {}", report.unresolved_variable_codes().join(", "));
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Validate {
            variables,
            rules,
            document,
        } => {
            let definitions: Vec<VariableDefinition> = serde_json::from_value(read_json(&variables)?)
                .with_context(|| format!("parsing variables in {}", variables.display()))?;
            let rule_text = std::fs::read_to_string(&rules)
                .with_context(|| format!("reading {}", rules.display()))?;
            let rules = parse_rules(&rule_text)?;

            let store: Arc<dyn NumberGeneratorPort> = Arc::new(InMemoryNumberGeneratorStore::new());
            let engine = PolicyEngine::from_config(&config, store)?;
            let ctx = engine.resolve_variables(&read_json(&document)?, &definitions);
            let results = engine.validate(&ctx, &rules);

            print_json(&results, args.pretty)?;
            Ok(if all_satisfied(&results) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::NextNumber {
            generator,
            values,
            write,
        } => {
            let state: NumberGeneratorState = serde_json::from_value(read_json(&generator)?)
                .with_context(|| format!("parsing generator in {}", generator.display()))?;
            let (owner, product_code) = (state.tenant, state.product_code.clone());

            let store = Arc::new(InMemoryNumberGeneratorStore::with_states([state]));
            let engine = PolicyEngine::from_config(&config, store.clone())?;
            let values: HashMap<String, String> = values.into_iter().collect();
            let number = engine.next_number(owner, &product_code, &values).await?;
            println!("{}", number);

            if write {
                let advanced = store.load(owner, &product_code).await?;
                let text = serde_json::to_string_pretty(&advanced)?;
                std::fs::write(&generator, text)
                    .with_context(|| format!("writing {}", generator.display()))?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}
