//! Outbound telemetry for the observability dashboard
//!
//! Simulators publish custom events and metrics at the end of every tick.
//! The sink is a black box: it must not block the tick, and whatever goes
//! wrong inside it is logged here and never reaches the simulator.

mod export;
mod sinks;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use export::{spawn_exporter, ExportStats};
pub use sinks::{ChannelSink, LogSink, MemorySink, NullSink, TelemetryRecord};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("telemetry channel is full, record dropped")]
    Saturated,

    #[error("telemetry channel closed")]
    Closed,

    #[error("attributes could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("sink rejected record: {0}")]
    Rejected(String),
}

/// Destination for custom events and metrics
pub trait TelemetrySink: Send + Sync {
    fn record_event(&self, event_type: &str, attributes: Value) -> Result<(), TelemetryError>;

    fn record_metric(&self, name: &str, value: f64) -> Result<(), TelemetryError>;
}

/// Fire-and-forget front for a [`TelemetrySink`]
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn TelemetrySink>,
}

impl Telemetry {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    /// Telemetry that goes nowhere
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullSink))
    }

    /// Record a custom event built from any serializable payload
    pub fn event<T: Serialize>(&self, event_type: &str, attributes: &T) {
        let result = serde_json::to_value(attributes)
            .map_err(TelemetryError::from)
            .and_then(|value| self.sink.record_event(event_type, value));

        if let Err(e) = result {
            tracing::warn!(event_type, error = %e, "failed to record telemetry event");
        }
    }

    pub fn metric(&self, name: &str, value: f64) {
        if let Err(e) = self.sink.record_metric(name, value) {
            tracing::warn!(metric = name, error = %e, "failed to record telemetry metric");
        }
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}
