//! # State Publisher
//! Owns the live `TelemetrySnapshot` and replaces it atomically.
//!
//! Both stat writers (aggregator, power poller) go through `update`, which
//! mutates the value under the channel's write lock and notifies receivers
//! once done. Readers never observe a half-written composite, and writers
//! touching disjoint fields cannot clobber each other.

use tokio::sync::watch;

use crate::snapshot::TelemetrySnapshot;

#[derive(Debug)]
pub struct StatePublisher {
    tx: watch::Sender<TelemetrySnapshot>,
}

impl StatePublisher {
    pub fn new(initial: TelemetrySnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Latest snapshot, cloned out without blocking a concurrent publish.
    pub fn current(&self) -> TelemetrySnapshot {
        self.tx.borrow().clone()
    }

    /// Change-driven receiver for UIs and tests.
    pub fn subscribe(&self) -> watch::Receiver<TelemetrySnapshot> {
        self.tx.subscribe()
    }

    /// Read-modify-publish in one atomic step.
    pub fn update(&self, f: impl FnOnce(&mut TelemetrySnapshot)) {
        self.tx.send_modify(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_writers_do_not_clobber() {
        let p = StatePublisher::new(TelemetrySnapshot::default());

        p.update(|s| s.latest_latency_ms = 12.5);
        p.update(|s| s.power_save_active = true);

        let snap = p.current();
        assert!((snap.latest_latency_ms - 12.5).abs() < f64::EPSILON);
        assert!(snap.power_save_active);
    }

    #[tokio::test]
    async fn subscriber_sees_replacements() {
        let p = StatePublisher::new(TelemetrySnapshot::default());
        let mut rx = p.subscribe();

        p.update(|s| s.sample_count = 7);
        rx.changed().await.expect("publisher alive");
        assert_eq!(rx.borrow().sample_count, 7);
    }
}
