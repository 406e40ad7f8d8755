//! Code delivery configuration

use serde::{Deserialize, Serialize};

/// Where issued codes are handed off for out-of-band delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryProvider {
    /// Push mail tasks onto a Redis list consumed by the mail worker
    RedisQueue,
    /// Log the task instead of sending it (development only)
    Log,
}

/// Delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Delivery provider
    pub provider: DeliveryProvider,

    /// Redis list the mail worker consumes
    pub queue_name: String,

    /// Display name used by mail templates
    pub company_name: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            provider: DeliveryProvider::RedisQueue,
            queue_name: String::from("verigate:mail:queue"),
            company_name: None,
        }
    }
}

impl DeliveryConfig {
    /// Development preset: codes are written to the log
    pub fn development() -> Self {
        Self {
            provider: DeliveryProvider::Log,
            ..Default::default()
        }
    }
}
