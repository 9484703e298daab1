//! Number Generator - contract and document numbers
//!
//! Each product owns a counter and a mask such as `{YYYY}-{XXXX}`. Issuing a
//! number applies the counter's reset policy, increments it atomically
//! through the [`NumberGeneratorPort`], and expands the mask.
//!
//! ```rust,ignore
//! let generator = NumberGenerator::new(port, Timezone::default(), DEFAULT_MAX_RETRIES);
//! let number = generator.next(tenant, "OSAGO", &HashMap::new()).await?;
//! ```

pub mod adapters;
pub mod error;
pub mod generator;
pub mod mask;
pub mod ports;
pub mod state;

pub use adapters::InMemoryNumberGeneratorStore;
pub use error::NumberingError;
pub use generator::{NumberGenerator, DEFAULT_MAX_RETRIES};
pub use mask::Mask;
pub use ports::NumberGeneratorPort;
pub use state::{NumberGeneratorState, ResetPolicy};
