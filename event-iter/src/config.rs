//! Configuration types for the event-iter crate
//!
//! Every adapted source has exactly one designated error channel. It defaults
//! to [`DEFAULT_ERROR_CHANNEL`] and can be renamed per adapter.

use crate::error::{AdapterError, Result};

/// Name of the error channel used when none is configured
pub const DEFAULT_ERROR_CHANNEL: &str = "error";

/// Configuration for an [`EventIterator`](crate::EventIterator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Channel whose firings are fatal to the adapter
    /// Default: "error"
    pub error_channel: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            error_channel: DEFAULT_ERROR_CHANNEL.to_string(),
        }
    }
}

impl AdapterConfig {
    /// Create a new AdapterConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error channel name
    pub fn with_error_channel(mut self, channel: impl Into<String>) -> Self {
        self.error_channel = channel.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.error_channel.is_empty() {
            return Err(AdapterError::InvalidConfig(
                "error_channel must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
