//! Number issuing
//!
//! [`NumberGenerator::next`] advances a product's counter through the port
//! with an optimistic compare-and-swap and formats the result with the mask.
//! Two concurrent callers never receive the same counter value: the loser of
//! a race reloads and tries again, up to `max_retries` attempts.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{PortError, TenantId, Timezone};

use crate::error::NumberingError;
use crate::ports::NumberGeneratorPort;

/// Attempts per issuance when no limit is configured
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Issues formatted numbers from durable counters
#[derive(Clone)]
pub struct NumberGenerator {
    port: Arc<dyn NumberGeneratorPort>,
    timezone: Timezone,
    max_retries: u32,
}

impl NumberGenerator {
    pub fn new(port: Arc<dyn NumberGeneratorPort>, timezone: Timezone, max_retries: u32) -> Self {
        Self {
            port,
            timezone,
            max_retries: max_retries.max(1),
        }
    }

    pub fn port(&self) -> &Arc<dyn NumberGeneratorPort> {
        &self.port
    }

    /// Issues the next number, dated today in the configured timezone
    pub async fn next(
        &self,
        tenant: TenantId,
        product_code: &str,
        values: &HashMap<String, String>,
    ) -> Result<String, NumberingError> {
        self.next_on(tenant, product_code, values, self.timezone.today()).await
    }

    /// Issues the next number as of `today`
    #[instrument(skip(self, tenant, values), fields(tenant = %tenant))]
    pub async fn next_on(
        &self,
        tenant: TenantId,
        product_code: &str,
        values: &HashMap<String, String>,
        today: NaiveDate,
    ) -> Result<String, NumberingError> {
        for attempt in 1..=self.max_retries {
            let current = self
                .port
                .load(tenant, product_code)
                .await
                .map_err(|e| not_found(e, product_code))?;
            let next = current.advance(today);

            match self.port.compare_and_swap(&next, current.version).await {
                Ok(()) => {
                    let number = next.format(today, values);
                    info!(counter = next.current_value, %number, attempt, "Number issued");
                    return Ok(number);
                }
                Err(e) if e.is_conflict() => {
                    debug!(attempt, "Counter advanced concurrently, retrying");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(not_found(e, product_code)),
            }
        }

        warn!(attempts = self.max_retries, "Number issuance gave up after repeated conflicts");
        Err(NumberingError::Conflict {
            product_code: product_code.to_string(),
            attempts: self.max_retries,
        })
    }
}

fn not_found(error: PortError, product_code: &str) -> NumberingError {
    if error.is_not_found() {
        NumberingError::NotFound {
            product_code: product_code.to_string(),
        }
    } else {
        NumberingError::Port(error)
    }
}
