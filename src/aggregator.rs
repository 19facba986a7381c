//! # Rolling Aggregator
//! Single consumer of the sample stream.
//!
//! Owns the jank window and the running average. The aggregator outlives
//! producer sessions, so the cumulative average carries across stop/start —
//! only the jank percentage is windowed. That asymmetry is deliberate.

use std::collections::VecDeque;
use std::sync::Arc;

use metrics::{counter, gauge};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::publisher::StatePublisher;
use crate::snapshot::Sample;

/// Fixed-capacity FIFO of jank flags. When full, the oldest entry is evicted
/// before the newest is appended; `len() <= capacity` always holds.
#[derive(Debug)]
pub struct JankWindow {
    buf: VecDeque<bool>,
    capacity: usize,
}

impl JankWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, is_jank: bool) {
        while self.buf.len() >= self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(is_jank);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Percentage of janky entries in the window; `0.0` when empty.
    pub fn jank_percent(&self) -> f64 {
        if self.buf.is_empty() {
            return 0.0;
        }
        let janky = self.buf.iter().filter(|j| **j).count();
        janky as f64 * 100.0 / self.buf.len() as f64
    }

    /// Flags in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.buf.iter().copied()
    }
}

/// Cumulative latency average. Never windowed, unlike the jank percentage.
#[derive(Debug, Default)]
pub struct RunningAverage {
    sum: f64,
    count: u64,
}

impl RunningAverage {
    pub fn record(&mut self, value_ms: f64) {
        self.sum += value_ms;
        self.count += 1;
    }

    /// `sum / count`, defined as `0.0` before the first sample.
    pub fn average(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug)]
pub struct Aggregator {
    window: JankWindow,
    average: RunningAverage,
    jank_threshold_ms: f64,
    publisher: Arc<StatePublisher>,
}

impl Aggregator {
    pub fn new(cfg: &PipelineConfig, publisher: Arc<StatePublisher>) -> Self {
        Self {
            window: JankWindow::with_capacity(cfg.window_capacity),
            average: RunningAverage::default(),
            jank_threshold_ms: cfg.jank_threshold_ms,
            publisher,
        }
    }

    /// Ingest one sample: flag it against the jank threshold, fold it into
    /// the running average, and publish the refreshed stats as a single
    /// snapshot replacement. Lifecycle fields (`running`, `load_level`,
    /// `power_save_active`) are left untouched.
    pub fn observe(&mut self, sample: Sample) {
        let is_jank = sample.duration_ms > self.jank_threshold_ms;
        self.window.push(is_jank);
        self.average.record(sample.duration_ms);

        let jank_percent = self.window.jank_percent();
        let avg = self.average.average();
        let count = self.average.count();

        self.publisher.update(|s| {
            s.latest_latency_ms = sample.duration_ms;
            s.avg_latency_ms = avg;
            s.jank_percent = jank_percent;
            s.sample_count = count;
        });

        gauge!("telemetry_jank_percent").set(jank_percent);
    }
}

/// Spawn the consumer loop. Samples arrive in emission order; when the
/// producer outruns the bounded buffer, the channel drops the oldest
/// unconsumed samples and reports the gap as `Lagged`, which we count and
/// log before resuming in order. The task ends once every sender is gone.
pub fn spawn_aggregator(
    mut rx: broadcast::Receiver<Sample>,
    mut agg: Aggregator,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(sample) => agg.observe(sample),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    counter!("telemetry_samples_dropped_total").increment(n);
                    tracing::warn!(
                        target: "aggregator",
                        dropped = n,
                        "consumer lagged; oldest buffered samples dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!(target: "aggregator", "sample stream closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TelemetrySnapshot;
    use std::time::Instant;

    fn sample(duration_ms: f64) -> Sample {
        Sample {
            at: Instant::now(),
            duration_ms,
        }
    }

    fn test_aggregator(window_capacity: usize) -> (Aggregator, Arc<StatePublisher>) {
        let cfg = PipelineConfig {
            window_capacity,
            ..PipelineConfig::default()
        };
        let publisher = Arc::new(StatePublisher::new(TelemetrySnapshot::default()));
        (Aggregator::new(&cfg, publisher.clone()), publisher)
    }

    #[test]
    fn empty_window_is_zero_percent() {
        let w = JankWindow::with_capacity(8);
        assert!(w.is_empty());
        assert_eq!(w.jank_percent(), 0.0);
    }

    #[test]
    fn window_evicts_oldest_and_never_exceeds_capacity() {
        let mut w = JankWindow::with_capacity(3);
        // true, false, true, true -> oldest (true) evicted
        for flag in [true, false, true, true] {
            w.push(flag);
            assert!(w.len() <= 3);
        }
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![false, true, true]);
    }

    #[test]
    fn window_keeps_most_recent_after_many_inserts() {
        let mut w = JankWindow::with_capacity(4);
        // 100 inserts; only flags for 96..100 survive
        for i in 0..100 {
            w.push(i % 3 == 0);
        }
        let expected: Vec<bool> = (96..100).map(|i| i % 3 == 0).collect();
        assert_eq!(w.len(), 4);
        assert_eq!(w.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn running_average_is_arithmetic_mean() {
        let mut avg = RunningAverage::default();
        assert_eq!(avg.average(), 0.0);

        let values = [3.5, 0.0, 12.25, 7.75, 100.0, 2.0];
        for v in values {
            avg.record(v);
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((avg.average() - mean).abs() < 1e-9);
        assert_eq!(avg.count(), values.len() as u64);
    }

    #[test]
    fn concrete_scenario_matches_frame_budget() {
        // Durations [10, 20, 5, 30] against the 16.66ms threshold.
        let (mut agg, publisher) = test_aggregator(8);
        for d in [10.0, 20.0, 5.0, 30.0] {
            agg.observe(sample(d));
        }

        assert_eq!(
            agg.window.iter().collect::<Vec<_>>(),
            vec![false, true, false, true]
        );

        let snap = publisher.current();
        assert!((snap.jank_percent - 50.0).abs() < 1e-9);
        assert!((snap.avg_latency_ms - 16.25).abs() < 1e-9);
        assert!((snap.latest_latency_ms - 30.0).abs() < 1e-9);
        assert_eq!(snap.sample_count, 4);
    }

    #[test]
    fn average_outlives_the_window() {
        // Window of 2 forgets old jank flags; the average never does.
        let (mut agg, publisher) = test_aggregator(2);
        for d in [100.0, 100.0, 1.0, 1.0] {
            agg.observe(sample(d));
        }

        let snap = publisher.current();
        // Window holds the last two quiet samples.
        assert_eq!(snap.jank_percent, 0.0);
        // Average still remembers the two slow ones.
        assert!((snap.avg_latency_ms - 50.5).abs() < 1e-9);
    }

    #[test]
    fn observe_leaves_lifecycle_fields_alone() {
        let (mut agg, publisher) = test_aggregator(8);
        publisher.update(|s| {
            s.running = true;
            s.load_level = 4;
            s.power_save_active = true;
        });

        agg.observe(sample(9.0));

        let snap = publisher.current();
        assert!(snap.running);
        assert_eq!(snap.load_level, 4);
        assert!(snap.power_save_active);
        assert!((snap.latest_latency_ms - 9.0).abs() < f64::EPSILON);
    }
}
