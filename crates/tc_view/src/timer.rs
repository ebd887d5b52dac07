//! See [`LiveTimer`].

use std::time::{Duration, Instant};

/// Client-side elapsed clock for a running tool.
///
/// The live label is a coarse in-flight reading only; once the tool
/// completes, the server-reported duration is the one that sticks and the
/// live value must never overwrite it.
#[derive(Debug, Clone, Copy)]
pub struct LiveTimer {
    started_at: Instant,
}

impl LiveTimer {
    #[must_use]
    pub const fn new(started_at: Instant) -> Self {
        Self { started_at }
    }

    /// Elapsed time since the tool started, rendered as `1.2s`.
    #[must_use]
    pub fn live_label(&self) -> String {
        format!("{:.1}s", self.started_at.elapsed().as_secs_f64())
    }

    /// The persisted label for a completed tool, rendered as `1.2345s`.
    #[must_use]
    pub fn final_label(duration_seconds: f64) -> String {
        format!("{duration_seconds:.4}s")
    }
}

/// The redraw cadence for live timers, roughly 10 Hz.
#[must_use]
pub fn tick_interval() -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_millis(100));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_live_label_rounds_to_tenths() {
        let timer = LiveTimer::new(Instant::now());
        assert_eq!(timer.live_label(), "0.0s");
    }

    #[test]
    fn test_final_label_keeps_four_decimals() {
        assert_eq!(LiveTimer::final_label(1.2345), "1.2345s");
        assert_eq!(LiveTimer::final_label(0.5), "0.5000s");
        assert_eq!(LiveTimer::final_label(0.0), "0.0000s");
    }
}
