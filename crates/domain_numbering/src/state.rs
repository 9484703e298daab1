//! Number generator state
//!
//! The durable counter behind one product's numbers. A state value is never
//! mutated in place by the generator: [`NumberGeneratorState::advance`]
//! returns the successor, which is then written with a compare-and-swap on
//! `version`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{NumberGeneratorId, TenantId};

use crate::error::NumberingError;
use crate::mask::Mask;

/// When the counter restarts at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResetPolicy {
    #[default]
    Never,
    Monthly,
    Yearly,
}

impl ResetPolicy {
    /// Whether `today` lies in a later period than `last_reset`
    pub fn is_due(&self, last_reset: NaiveDate, today: NaiveDate) -> bool {
        match self {
            ResetPolicy::Never => false,
            ResetPolicy::Monthly => {
                last_reset.year() != today.year() || last_reset.month() != today.month()
            }
            ResetPolicy::Yearly => last_reset.year() != today.year(),
        }
    }
}

/// Counter and formatting settings of one product's number generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberGeneratorState {
    pub id: NumberGeneratorId,
    pub tenant: TenantId,
    pub product_code: String,
    pub mask: String,
    /// Last issued counter value; 0 before the first issue of a period
    pub current_value: u64,
    /// Counter wraps to 1 past this value
    #[serde(default)]
    pub max_value: Option<u64>,
    #[serde(default)]
    pub reset_policy: ResetPolicy,
    pub last_reset: NaiveDate,
    /// XORed into the counter before it is shown
    #[serde(default)]
    pub xor_mask: Option<u64>,
    /// Bumped on every successful write
    #[serde(default)]
    pub version: u64,
}

impl NumberGeneratorState {
    /// Creates a generator, validating the mask
    pub fn new(
        tenant: TenantId,
        product_code: impl Into<String>,
        mask: impl Into<String>,
        today: NaiveDate,
    ) -> Result<Self, NumberingError> {
        let mask = mask.into();
        Mask::parse(&mask)?;
        Ok(Self {
            id: NumberGeneratorId::new(),
            tenant,
            product_code: product_code.into(),
            mask,
            current_value: 0,
            max_value: None,
            reset_policy: ResetPolicy::Never,
            last_reset: today,
            xor_mask: None,
            version: 0,
        })
    }

    pub fn with_current_value(mut self, value: u64) -> Self {
        self.current_value = value;
        self
    }

    pub fn with_max_value(mut self, max: u64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    pub fn with_xor_mask(mut self, xor: u64) -> Self {
        self.xor_mask = Some(xor);
        self
    }

    /// The state after issuing one number on `today`
    ///
    /// Applies a due reset, increments the counter and wraps it to 1 past
    /// `max_value`. The successor carries the next version.
    pub fn advance(&self, today: NaiveDate) -> Self {
        let mut next = self.clone();
        if self.reset_policy.is_due(self.last_reset, today) {
            next.current_value = 0;
            next.last_reset = today;
        }

        next.current_value = match next.current_value.checked_add(1) {
            Some(value) if self.max_value.map_or(true, |max| value <= max) => value,
            _ => 1,
        };
        next.version = self.version.wrapping_add(1);
        next
    }

    /// The counter as shown in numbers
    pub fn display_value(&self) -> u64 {
        match self.xor_mask {
            Some(xor) => self.current_value ^ xor,
            None => self.current_value,
        }
    }

    /// Formats the current counter with the mask
    pub fn format(&self, today: NaiveDate, values: &HashMap<String, String>) -> String {
        Mask::lenient(&self.mask).expand(self.display_value(), today, values)
    }
}
