//! # Environment Poller
//! Periodically samples an external power-save signal and merges it into the
//! published snapshot. Runs for the pipeline's lifetime, independent of
//! producer start/stop.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::publisher::StatePublisher;

/// External power-save indicator. Injected so tests and platforms can supply
/// their own source.
#[async_trait::async_trait]
pub trait PowerSaveProbe: Send + Sync + 'static {
    async fn is_power_save_active(&self) -> Result<bool>;
}

/// Probe for platforms without a power-save signal; always reports `false`.
#[derive(Debug, Default)]
pub struct NoPowerSaveSignal;

#[async_trait::async_trait]
impl PowerSaveProbe for NoPowerSaveSignal {
    async fn is_power_save_active(&self) -> Result<bool> {
        Ok(false)
    }
}

/// Spawn the poller loop. A failed query keeps the previous value (`false`
/// before the first success) and is logged, never propagated; only the
/// `power_save_active` field of the snapshot is touched.
pub fn spawn_power_poller(
    cfg: &PipelineConfig,
    probe: Arc<dyn PowerSaveProbe>,
    publisher: Arc<StatePublisher>,
) -> JoinHandle<()> {
    let period = cfg.power_poll;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        let mut last = false;
        loop {
            ticker.tick().await;
            match probe.is_power_save_active().await {
                Ok(active) => last = active,
                Err(e) => {
                    tracing::warn!(
                        target: "power",
                        error = %e,
                        "power-save probe failed; keeping previous value"
                    );
                }
            }
            publisher.update(|s| s.power_save_active = last);
        }
    })
}
