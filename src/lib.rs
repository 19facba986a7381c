// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod config;
pub mod pipeline;
pub mod power;
pub mod producer;
pub mod publisher;
pub mod snapshot;
pub mod workload;

// ---- Re-exports for stable public API ----
pub use crate::config::PipelineConfig;
pub use crate::pipeline::TelemetryPipeline;
pub use crate::power::{NoPowerSaveSignal, PowerSaveProbe};
pub use crate::snapshot::{Sample, TelemetrySnapshot};
pub use crate::workload::LoadLevel;
