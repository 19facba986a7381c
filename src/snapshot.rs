// src/snapshot.rs
use std::time::Instant;

use serde::Serialize;

use crate::workload::LoadLevel;

/// One timing measurement, produced once per sampling iteration and consumed
/// by the aggregator.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    /// Monotonic instant at which the measurement finished.
    pub at: Instant,
    /// Measured workload duration in milliseconds.
    pub duration_ms: f64,
}

/// Aggregate pipeline state, published as a whole on every update. Readers
/// always see a consistent composite, never a mix of old and new fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub running: bool,
    pub load_level: u8,
    pub latest_latency_ms: f64,
    pub avg_latency_ms: f64,
    /// Share of janky samples in the rolling window, 0..=100.
    pub jank_percent: f64,
    pub power_save_active: bool,
    /// Samples seen by the aggregator since it was constructed.
    pub sample_count: u64,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            running: false,
            load_level: LoadLevel::default().get(),
            latest_latency_ms: 0.0,
            avg_latency_ms: 0.0,
            jank_percent: 0.0,
            power_save_active: false,
            sample_count: 0,
        }
    }
}
