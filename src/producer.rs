//! # Sample Producer
//! Cancellable sampling loop: run the simulated workload, time it, hand the
//! sample to the aggregator, sleep ~50ms, repeat.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::snapshot::Sample;
use crate::workload::{self, LoadLevel};

/// Spawn one producer session.
///
/// The load atomic is re-read every iteration, so a concurrent `set_load`
/// takes effect no later than the next sample (stale-by-one is in contract).
/// Cancellation is cooperative: the inter-iteration sleep races the shutdown
/// signal, and once shutdown is observed the loop exits without emitting
/// further samples. Sends never block; a lagging consumer costs it the
/// oldest buffered samples, not producer cadence.
pub fn spawn_producer(
    cfg: &PipelineConfig,
    load: Arc<AtomicU8>,
    tx: broadcast::Sender<Sample>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let tick = cfg.tick;
    tokio::spawn(async move {
        tracing::info!(target: "producer", "sampling loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let level = LoadLevel::new(load.load(Ordering::Relaxed) as i64);
            let elapsed = workload::simulate(level);
            let sample = Sample {
                at: Instant::now(),
                duration_ms: elapsed.as_secs_f64() * 1_000.0,
            };

            // Err only means no live receiver; the sample is simply lost.
            let _ = tx.send(sample);
            counter!("telemetry_samples_total").increment(1);
            tracing::debug!(
                target: "producer",
                load = level.get(),
                duration_ms = sample.duration_ms,
                "sample emitted"
            );

            tokio::select! {
                _ = tokio::time::sleep(tick) => {}
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(target: "producer", "sampling loop stopped");
    })
}
