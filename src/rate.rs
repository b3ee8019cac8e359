//! Per-second rates from cumulative byte counters.

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Baseline {
    sent: u64,
    recv: u64,
    at: Instant,
}

/// Turns monotonically increasing network counters into bytes/second.
///
/// Only one previous sample is retained. The first update returns `(0, 0)`.
/// A counter that goes backwards (interface reset, provider restart) reports
/// a rate of 0 for that update and becomes the new baseline.
#[derive(Debug, Default)]
pub struct RateTracker {
    baseline: Option<Baseline>,
    last: (f64, f64),
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, current_sent: u64, current_recv: u64, now: Instant) -> (f64, f64) {
        let Some(prev) = self.baseline else {
            self.baseline = Some(Baseline {
                sent: current_sent,
                recv: current_recv,
                at: now,
            });
            self.last = (0.0, 0.0);
            return self.last;
        };

        let elapsed = now.saturating_duration_since(prev.at).as_secs_f64();
        if elapsed <= 0.0 {
            return self.last;
        }

        let sent_rate = counter_rate(prev.sent, current_sent, elapsed);
        let recv_rate = counter_rate(prev.recv, current_recv, elapsed);

        self.baseline = Some(Baseline {
            sent: current_sent,
            recv: current_recv,
            at: now,
        });
        self.last = (sent_rate, recv_rate);
        self.last
    }

    /// Rates produced by the most recent update.
    pub fn last_rates(&self) -> (f64, f64) {
        self.last
    }
}

fn counter_rate(previous: u64, current: u64, elapsed_secs: f64) -> f64 {
    match current.checked_sub(previous) {
        Some(delta) => delta as f64 / elapsed_secs,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_sample_is_zero() {
        let mut t = RateTracker::new();
        assert_eq!(t.update(5_000, 9_000, Instant::now()), (0.0, 0.0));
    }

    #[test]
    fn rate_is_delta_over_elapsed() {
        let start = Instant::now();
        let mut t = RateTracker::new();
        t.update(1_000, 2_000, start);
        let (sent, recv) = t.update(3_000, 6_000, start + Duration::from_secs(2));
        assert_eq!(sent, 1_000.0);
        assert_eq!(recv, 2_000.0);
    }

    #[test]
    fn counter_reset_clamps_and_rebaselines() {
        let start = Instant::now();
        let mut t = RateTracker::new();
        t.update(10_000, 10_000, start);
        let (sent, recv) = t.update(500, 12_000, start + Duration::from_secs(1));
        assert_eq!(sent, 0.0);
        assert_eq!(recv, 2_000.0);

        // 500 is now the baseline for the sent counter.
        let (sent, _) = t.update(1_500, 12_000, start + Duration::from_secs(2));
        assert_eq!(sent, 1_000.0);
    }

    #[test]
    fn never_negative_for_arbitrary_sequences() {
        let start = Instant::now();
        let mut t = RateTracker::new();
        let samples = [90u64, 40, 40, 0, 7, 3, 1_000, 999, 2_000, 0];
        for (i, v) in samples.iter().enumerate() {
            let recv_counter = samples[samples.len() - 1 - i];
            let at = start + Duration::from_millis(i as u64 * 250);
            let (sent, recv) = t.update(*v, recv_counter, at);
            assert!(sent >= 0.0 && recv >= 0.0);
        }
    }

    #[test]
    fn zero_elapsed_keeps_previous_rates() {
        let start = Instant::now();
        let later = start + Duration::from_secs(1);
        let mut t = RateTracker::new();
        t.update(0, 0, start);
        assert_eq!(t.update(100, 100, later), (100.0, 100.0));
        assert_eq!(t.update(900, 900, later), (100.0, 100.0));
        assert_eq!(t.last_rates(), (100.0, 100.0));
    }
}
