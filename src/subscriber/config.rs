//! Subscriber configuration.

use crate::error::{OverlayError, Result};
use crate::filter::DEFAULT_FILTER_CAPACITY;
use crate::transport::{QueueOptions, DEFAULT_QUEUE_SIZE};
use crate::types::OverflowPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for a [`FilteredSubscriber`](super::FilteredSubscriber).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Transport-side inbound queue length.
    /// Default: 10
    pub queue_size: usize,

    /// Payloads held back waiting for their frame to resolve.
    /// Default: 10
    pub filter_capacity: usize,

    /// Overflow handling for both queues.
    /// Default: drop oldest
    pub overflow: OverflowPolicy,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            filter_capacity: DEFAULT_FILTER_CAPACITY,
            overflow: OverflowPolicy::DropOldest,
        }
    }
}

impl SubscriberConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_size == 0 {
            return Err(OverlayError::InvalidConfig(
                "queue_size must be at least 1".to_string(),
            ));
        }
        if self.filter_capacity == 0 {
            return Err(OverlayError::InvalidConfig(
                "filter_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions {
            queue_size: self.queue_size,
            overflow: self.overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubscriberConfig::default();
        assert_eq!(config.queue_size, 10);
        assert_eq!(config.filter_capacity, 10);
        assert_eq!(config.overflow, OverflowPolicy::DropOldest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            SubscriberConfig::from_json(r#"{"filter_capacity": 25, "overflow": "drop_newest"}"#)
                .unwrap();
        assert_eq!(config.queue_size, 10);
        assert_eq!(config.filter_capacity, 25);
        assert_eq!(config.overflow, OverflowPolicy::DropNewest);
    }

    #[test]
    fn test_from_json_rejects_zero_queue() {
        let result = SubscriberConfig::from_json(r#"{"queue_size": 0}"#);
        assert!(matches!(result, Err(OverlayError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = SubscriberConfig::from_json("{not json");
        assert!(matches!(result, Err(OverlayError::InvalidConfig(_))));
    }
}
