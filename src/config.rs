//! Core configuration with environment overrides.

use crate::error::{domains, DispatchResult, ErrorInfo};

/// Tunable defaults for the core's queue labels and simulated latency.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Label the completion dispatcher submits under.
    pub dispatch_queue_label: String,
    /// Label bulk loads run on.
    pub loader_queue_label: String,
    /// Simulated per-item latency for bulk loads, in milliseconds.
    pub item_latency_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            dispatch_queue_label: "dispatch".to_string(),
            loader_queue_label: "loader".to_string(),
            item_latency_ms: 10,
        }
    }
}

impl CoreConfig {
    /// Build a config from defaults, applying `DISPATCH_CORE_*` environment
    /// overrides where present.
    pub fn from_env() -> DispatchResult<Self> {
        let mut config = Self::default();

        if let Ok(label) = std::env::var("DISPATCH_CORE_DISPATCH_QUEUE_LABEL") {
            config.dispatch_queue_label = label;
        }

        if let Ok(label) = std::env::var("DISPATCH_CORE_LOADER_QUEUE_LABEL") {
            config.loader_queue_label = label;
        }

        if let Ok(latency) = std::env::var("DISPATCH_CORE_ITEM_LATENCY_MS") {
            config.item_latency_ms = latency.parse().map_err(|e| {
                ErrorInfo::new(
                    domains::CONFIGURATION,
                    -3,
                    format!("Invalid item_latency_ms: {e}"),
                )
            })?;
        }

        Ok(config)
    }
}
