use std::collections::BTreeMap;
use std::sync::OnceLock;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

/// Properties attached to a telemetry event.
pub type Properties = BTreeMap<String, String>;

/// Fire-and-forget usage reporting.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Prepares the transport. Callers treat failure as advisory.
    async fn init(&self, app_name: &str, app_version: &str) -> Result<()>;
    fn send_event(&self, name: &str, properties: Properties);
}

/// Emits telemetry as structured `tracing` records.
#[derive(Debug, Default)]
pub struct TracingTelemetry {
    app: OnceLock<String>,
}

impl TracingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TelemetrySink for TracingTelemetry {
    async fn init(&self, app_name: &str, app_version: &str) -> Result<()> {
        let app = format!("{app_name}@{app_version}");
        if self.app.set(app).is_err() {
            debug!("telemetry already initialized");
        }
        Ok(())
    }

    fn send_event(&self, name: &str, properties: Properties) {
        let app = self.app.get().map(String::as_str).unwrap_or("uninitialized");
        info!(target: "telemetry", app, event = name, ?properties, "telemetry event");
    }
}

/// Builds a [`Properties`] map from string pairs.
pub fn properties<const N: usize>(pairs: [(&str, &str); N]) -> Properties {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
