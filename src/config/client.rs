use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::ConfigurationError;
use crate::Result;

/// Connection parameters for the administrative client the orchestrator
/// opens against individual nodes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Read preference attached to `replSetInitiate`
    #[serde(default = "default_initiate_read_preference")]
    pub initiate_read_preference: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            initiate_read_preference: default_initiate_read_preference(),
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(ConfigurationError::InvalidSettings("connect_timeout_ms must be greater than 0".into()).into());
        }
        Ok(())
    }
}

fn default_connect_timeout_ms() -> u64 {
    2000
}
fn default_initiate_read_preference() -> String {
    "secondary".to_string()
}
