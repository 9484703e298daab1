//! In-memory number generator store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{DomainPort, PortError, TenantId};

use crate::ports::NumberGeneratorPort;
use crate::state::NumberGeneratorState;

type GeneratorKey = (TenantId, String);

/// Number generator state held in process memory
///
/// The write lock makes each compare-and-swap atomic.
#[derive(Debug, Default)]
pub struct InMemoryNumberGeneratorStore {
    states: RwLock<HashMap<GeneratorKey, NumberGeneratorState>>,
}

impl InMemoryNumberGeneratorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given generators
    pub fn with_states(states: impl IntoIterator<Item = NumberGeneratorState>) -> Self {
        let states = states
            .into_iter()
            .map(|s| ((s.tenant, s.product_code.clone()), s))
            .collect();
        Self {
            states: RwLock::new(states),
        }
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

impl DomainPort for InMemoryNumberGeneratorStore {}

#[async_trait]
impl NumberGeneratorPort for InMemoryNumberGeneratorStore {
    async fn load(&self, tenant: TenantId, product_code: &str) -> Result<NumberGeneratorState, PortError> {
        self.states
            .read()
            .await
            .get(&(tenant, product_code.to_string()))
            .cloned()
            .ok_or_else(|| PortError::not_found("NumberGenerator", product_code))
    }

    async fn compare_and_swap(
        &self,
        state: &NumberGeneratorState,
        expected_version: u64,
    ) -> Result<(), PortError> {
        let mut states = self.states.write().await;
        let key = (state.tenant, state.product_code.clone());
        let stored = states
            .get_mut(&key)
            .ok_or_else(|| PortError::not_found("NumberGenerator", &state.product_code))?;

        if stored.version != expected_version {
            debug!(
                product = %state.product_code,
                expected = expected_version,
                stored = stored.version,
                "Compare-and-swap lost"
            );
            return Err(PortError::conflict(format!(
                "generator {} is at version {}, expected {}",
                state.product_code, stored.version, expected_version
            )));
        }
        *stored = state.clone();
        Ok(())
    }

    async fn save(&self, state: NumberGeneratorState) -> Result<(), PortError> {
        let key = (state.tenant, state.product_code.clone());
        self.states.write().await.insert(key, state);
        Ok(())
    }
}
