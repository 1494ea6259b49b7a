//! Concrete telemetry sinks

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::{TelemetryError, TelemetrySink};

/// One captured record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TelemetryRecord {
    Event { event_type: String, attributes: Value },
    Metric { name: String, value: f64 },
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record_event(&self, _event_type: &str, _attributes: Value) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn record_metric(&self, _name: &str, _value: f64) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Writes records to the `tracing` log at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn record_event(&self, event_type: &str, attributes: Value) -> Result<(), TelemetryError> {
        tracing::trace!(target: "santa_tracker::telemetry", event_type, %attributes, "custom event");
        Ok(())
    }

    fn record_metric(&self, name: &str, value: f64) -> Result<(), TelemetryError> {
        tracing::trace!(target: "santa_tracker::telemetry", metric = name, value, "custom metric");
        Ok(())
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Attributes of every event with the given type, oldest first
    pub fn events_named(&self, event_type: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                TelemetryRecord::Event {
                    event_type: t,
                    attributes,
                } if t == event_type => Some(attributes),
                _ => None,
            })
            .collect()
    }

    pub fn metric_values(&self, name: &str) -> Vec<f64> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                TelemetryRecord::Metric { name: n, value } if n == name => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, record: TelemetryRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl TelemetrySink for MemorySink {
    fn record_event(&self, event_type: &str, attributes: Value) -> Result<(), TelemetryError> {
        self.push(TelemetryRecord::Event {
            event_type: event_type.to_string(),
            attributes,
        });
        Ok(())
    }

    fn record_metric(&self, name: &str, value: f64) -> Result<(), TelemetryError> {
        self.push(TelemetryRecord::Metric {
            name: name.to_string(),
            value,
        });
        Ok(())
    }
}

/// Hands records to a consumer task over a bounded channel
///
/// Uses `try_send` so a slow consumer costs dropped records, never a
/// blocked tick.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<TelemetryRecord>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TelemetryRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    fn send(&self, record: TelemetryRecord) -> Result<(), TelemetryError> {
        self.tx.try_send(record).map_err(|e| match e {
            TrySendError::Full(_) => TelemetryError::Saturated,
            TrySendError::Closed(_) => TelemetryError::Closed,
        })
    }
}

impl TelemetrySink for ChannelSink {
    fn record_event(&self, event_type: &str, attributes: Value) -> Result<(), TelemetryError> {
        self.send(TelemetryRecord::Event {
            event_type: event_type.to_string(),
            attributes,
        })
    }

    fn record_metric(&self, name: &str, value: f64) -> Result<(), TelemetryError> {
        self.send(TelemetryRecord::Metric {
            name: name.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_sink_reports_saturation() {
        let (sink, mut rx) = ChannelSink::new(1);

        assert!(sink.record_metric("a", 1.0).is_ok());
        assert!(matches!(
            sink.record_metric("b", 2.0),
            Err(TelemetryError::Saturated)
        ));

        let first = rx.try_recv().expect("one record queued");
        assert_eq!(
            first,
            TelemetryRecord::Metric {
                name: "a".into(),
                value: 1.0
            }
        );
    }

    #[test]
    fn test_channel_sink_reports_closed() {
        let (sink, rx) = ChannelSink::new(4);
        drop(rx);
        assert!(matches!(
            sink.record_event("WeatherAlert", json!({})),
            Err(TelemetryError::Closed)
        ));
    }

    #[test]
    fn test_memory_sink_filters_by_name() {
        let sink = MemorySink::new();
        sink.record_event("A", json!({ "n": 1 })).unwrap();
        sink.record_event("B", json!({ "n": 2 })).unwrap();
        sink.record_event("A", json!({ "n": 3 })).unwrap();

        let a = sink.events_named("A");
        assert_eq!(a.len(), 2);
        assert_eq!(a[1]["n"], 3);

        sink.clear();
        assert!(sink.records().is_empty());
    }
}
