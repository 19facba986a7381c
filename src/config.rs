// src/config.rs
use std::time::Duration;

const ENV_TICK_MS: &str = "TELEMETRY_TICK_MS";
const ENV_JANK_THRESHOLD_MS: &str = "TELEMETRY_JANK_THRESHOLD_MS";
const ENV_WINDOW: &str = "TELEMETRY_WINDOW";
const ENV_SAMPLE_BUFFER: &str = "TELEMETRY_SAMPLE_BUFFER";
const ENV_POWER_POLL_MS: &str = "TELEMETRY_POWER_POLL_MS";

/// Pipeline tuning knobs. Defaults mirror a 60Hz frame budget: a 16.66ms
/// jank threshold, an 1800-slot window (~30s at 60Hz) and a 50ms (~20Hz)
/// sampling cadence.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Inter-iteration delay of the producer loop.
    pub tick: Duration,
    /// Duration above which a sample counts as jank, in milliseconds.
    pub jank_threshold_ms: f64,
    /// Capacity of the rolling jank window.
    pub window_capacity: usize,
    /// Bounded hand-off buffer between producer and aggregator.
    pub sample_buffer: usize,
    /// Power-save polling period.
    pub power_poll: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(50),
            jank_threshold_ms: 16.66,
            window_capacity: 1800,
            sample_buffer: 64,
            power_poll: Duration::from_secs(2),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `TELEMETRY_*` env vars. Unparsable values fall
    /// back to the default for that knob.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            tick: Duration::from_millis(env_parse(ENV_TICK_MS, d.tick.as_millis() as u64)),
            jank_threshold_ms: env_parse(ENV_JANK_THRESHOLD_MS, d.jank_threshold_ms),
            window_capacity: env_parse(ENV_WINDOW, d.window_capacity).max(1),
            sample_buffer: env_parse(ENV_SAMPLE_BUFFER, d.sample_buffer).max(1),
            power_poll: Duration::from_millis(env_parse(
                ENV_POWER_POLL_MS,
                d.power_poll.as_millis() as u64,
            )),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_frame_budget() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.tick, Duration::from_millis(50));
        assert_eq!(cfg.window_capacity, 1800);
        assert_eq!(cfg.sample_buffer, 64);
        assert_eq!(cfg.power_poll, Duration::from_secs(2));
        assert!((cfg.jank_threshold_ms - 16.66).abs() < f64::EPSILON);
    }

    #[test]
    fn env_override_and_garbage_fallback() {
        std::env::set_var(ENV_WINDOW, "120");
        std::env::set_var(ENV_TICK_MS, "not-a-number");
        let cfg = PipelineConfig::from_env();
        std::env::remove_var(ENV_WINDOW);
        std::env::remove_var(ENV_TICK_MS);

        assert_eq!(cfg.window_capacity, 120);
        assert_eq!(cfg.tick, Duration::from_millis(50));
    }
}
