//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::booking::Service;
use crate::error::{EngineError, Result};

/// Spacing between offered start times when a service does not set its own.
pub const DEFAULT_STEP_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub default_step_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}

impl EngineConfig {
    /// Parse a config file. Missing fields take their defaults.
    ///
    /// # Errors
    /// `Json` for malformed input, `InvalidParameter` for a zero step.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        if config.default_step_minutes == 0 {
            return Err(EngineError::InvalidParameter(
                "defaultStepMinutes must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// The service's own step if it has one, otherwise the engine default.
    pub fn step_for(&self, service: &Service) -> u32 {
        service.step_minutes.unwrap_or(self.default_step_minutes)
    }
}
