//! # Telemetry Pipeline
//! Facade owning the whole assembly: one aggregator and one power poller for
//! its lifetime, plus at most one producer session at a time.
//!
//! Session semantics: the aggregator (and with it the cumulative average)
//! survives producer restarts — it is consumer state, not producer state.
//! `start` while running cancels the previous session and launches a fresh
//! one; `stop` is idempotent. Samples still buffered at stop time are
//! drained by the aggregator, which is bounded by the hand-off buffer and
//! keeps the average exact over everything actually measured.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::aggregator::{spawn_aggregator, Aggregator};
use crate::config::PipelineConfig;
use crate::power::{spawn_power_poller, PowerSaveProbe};
use crate::producer::spawn_producer;
use crate::publisher::StatePublisher;
use crate::snapshot::{Sample, TelemetrySnapshot};
use crate::workload::LoadLevel;

struct ProducerSession {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct TelemetryPipeline {
    cfg: PipelineConfig,
    publisher: Arc<StatePublisher>,
    load: Arc<AtomicU8>,
    samples: broadcast::Sender<Sample>,
    session: Option<ProducerSession>,
    aggregator: JoinHandle<()>,
    poller: JoinHandle<()>,
}

impl TelemetryPipeline {
    pub fn new(cfg: PipelineConfig, probe: Arc<dyn PowerSaveProbe>) -> Self {
        let publisher = Arc::new(StatePublisher::new(TelemetrySnapshot::default()));
        let load = Arc::new(AtomicU8::new(LoadLevel::default().get()));
        let (samples, rx) = broadcast::channel(cfg.sample_buffer);

        let aggregator = spawn_aggregator(rx, Aggregator::new(&cfg, publisher.clone()));
        let poller = spawn_power_poller(&cfg, probe, publisher.clone());

        Self {
            cfg,
            publisher,
            load,
            samples,
            session: None,
            aggregator,
            poller,
        }
    }

    /// Begin a producer session with the given load (clamped to `[1, 5]`).
    /// Starting while already running restarts: the previous session is
    /// cancelled first, then a fresh loop is spawned.
    pub async fn start(&mut self, load: i64) {
        self.stop().await;

        let level = LoadLevel::new(load);
        self.load.store(level.get(), Ordering::Relaxed);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_producer(
            &self.cfg,
            self.load.clone(),
            self.samples.clone(),
            shutdown_rx,
        );
        self.session = Some(ProducerSession {
            shutdown: shutdown_tx,
            handle,
        });

        self.publisher.update(|s| {
            s.running = true;
            s.load_level = level.get();
        });
        tracing::info!(target: "pipeline", load = level.get(), "producer session started");
    }

    /// Halt production. Idempotent: stopping an already-stopped pipeline is
    /// a no-op. Waits for the producer task to observe cancellation, so no
    /// sample is emitted after this returns.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        let _ = session.shutdown.send(true);
        if let Err(e) = session.handle.await {
            tracing::warn!(target: "pipeline", error = %e, "producer task ended abnormally");
        }

        self.publisher.update(|s| s.running = false);
        tracing::info!(target: "pipeline", "producer session stopped");
    }

    /// Update the load without restarting; clamped to `[1, 5]`. The running
    /// loop picks the new value up no later than its next iteration.
    pub fn set_load(&self, load: i64) {
        let level = LoadLevel::new(load);
        self.load.store(level.get(), Ordering::Relaxed);
        self.publisher.update(|s| s.load_level = level.get());
        tracing::debug!(target: "pipeline", load = level.get(), "load updated");
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Non-blocking snapshot read for rendering.
    pub fn current_snapshot(&self) -> TelemetrySnapshot {
        self.publisher.current()
    }

    /// Change-driven snapshot stream for UIs and tests.
    pub fn subscribe(&self) -> watch::Receiver<TelemetrySnapshot> {
        self.publisher.subscribe()
    }
}

impl Drop for TelemetryPipeline {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = session.shutdown.send(true);
            session.handle.abort();
        }
        self.poller.abort();
        self.aggregator.abort();
    }
}
