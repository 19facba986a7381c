//! Frame Telemetry — Binary Entrypoint
//! Boots the sampling pipeline and logs a snapshot once per second until
//! ctrl-c.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use frame_telemetry::{NoPowerSaveSignal, PipelineConfig, TelemetryPipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables the
    // TELEMETRY_* knobs from .env so config.rs can pick them up.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::from_env();
    let mut pipeline = TelemetryPipeline::new(cfg, Arc::new(NoPowerSaveSignal));
    pipeline.start(2).await;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snap = pipeline.current_snapshot();
                tracing::info!(target: "pipeline", snapshot = %serde_json::to_string(&snap)?, "telemetry");
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    pipeline.stop().await;
    Ok(())
}
