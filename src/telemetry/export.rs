//! Background drain for `ChannelSink`
//!
//! Records are buffered and flushed every second or once the buffer reaches
//! `MAX_BATCH`, whichever comes first. A flush hands the batch to the log;
//! a vendor exporter would post it instead.

use std::time::Duration;

use ahash::AHashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use super::TelemetryRecord;

const FLUSH_INTERVAL: Duration = Duration::from_secs(1);
const MAX_BATCH: usize = 200;

/// Totals seen by the exporter over its lifetime
#[derive(Debug, Clone, Default)]
pub struct ExportStats {
    pub events: u64,
    pub metrics: u64,
    pub batches: u64,
    /// Event counts keyed by event type
    pub by_type: AHashMap<String, u64>,
}

/// Spawn the drain task; it finishes once every sender is dropped
pub fn spawn_exporter(mut rx: mpsc::Receiver<TelemetryRecord>) -> JoinHandle<ExportStats> {
    tokio::spawn(async move {
        let mut stats = ExportStats::default();
        let mut buffer: Vec<TelemetryRecord> = Vec::with_capacity(MAX_BATCH);
        let mut interval = time::interval(FLUSH_INTERVAL);

        loop {
            tokio::select! {
                record = rx.recv() => match record {
                    Some(record) => {
                        buffer.push(record);
                        if buffer.len() >= MAX_BATCH {
                            flush(&mut buffer, &mut stats);
                        }
                    }
                    None => {
                        flush(&mut buffer, &mut stats);
                        break;
                    }
                },
                _ = interval.tick() => flush(&mut buffer, &mut stats),
            }
        }

        tracing::info!(
            events = stats.events,
            metrics = stats.metrics,
            batches = stats.batches,
            "telemetry exporter finished"
        );
        stats
    })
}

fn flush(buffer: &mut Vec<TelemetryRecord>, stats: &mut ExportStats) {
    if buffer.is_empty() {
        return;
    }

    let mut events = 0;
    let mut metrics = 0;
    for record in buffer.drain(..) {
        match record {
            TelemetryRecord::Event { event_type, .. } => {
                events += 1;
                *stats.by_type.entry(event_type).or_insert(0) += 1;
            }
            TelemetryRecord::Metric { .. } => metrics += 1,
        }
    }

    stats.events += events;
    stats.metrics += metrics;
    stats.batches += 1;
    tracing::debug!(events, metrics, "telemetry batch flushed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{ChannelSink, Telemetry};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_exporter_drains_until_senders_drop() {
        let (sink, rx) = ChannelSink::new(16);
        let exporter = spawn_exporter(rx);

        let telemetry = Telemetry::new(Arc::new(sink));
        telemetry.event("GiftDelivery", &json!({"totalGiftsDelivered": 1}));
        telemetry.event("GiftDelivery", &json!({"totalGiftsDelivered": 2}));
        telemetry.metric("Custom/Delivery/Rate", 5.0);
        drop(telemetry);

        let stats = exporter.await.unwrap();
        assert_eq!(stats.events, 2);
        assert_eq!(stats.metrics, 1);
        assert_eq!(stats.by_type.get("GiftDelivery"), Some(&2));
        assert!(stats.batches >= 1);
    }

    #[test]
    fn test_flush_of_empty_buffer_is_not_a_batch() {
        let mut stats = ExportStats::default();
        flush(&mut Vec::new(), &mut stats);
        assert_eq!(stats.batches, 0);
    }
}
