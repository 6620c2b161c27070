// The beat clock. Nothing here sleeps or spawns: the host loop calls `poll`
// every frame and gets back each tick that has come due since the last call.

use std::time::{Duration, Instant};

use crate::error::{LoopError, Result};

/// `60000 / bpm` milliseconds.
pub fn beat_interval(bpm: u32) -> Duration {
    Duration::from_nanos(60_000_000_000 / u64::from(bpm.max(1)))
}

#[derive(Clone, Debug)]
struct Running {
    interval: Duration,
    total_beats: usize,
    next_beat: usize,
    next_due: Instant,
    cycle_start: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct Clock {
    running: Option<Running>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Beat 0 is due at `now`, beat `k` at `now + k * interval`.
    pub fn start(&mut self, bpm: u32, total_beats: usize, now: Instant) -> Result<()> {
        if self.running.is_some() {
            return Err(LoopError::ClockRunning);
        }
        self.running = Some(Running {
            interval: beat_interval(bpm),
            total_beats: total_beats.max(1),
            next_beat: 0,
            next_due: now,
            cycle_start: now,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running = None;
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.running.as_ref().map(|r| r.interval)
    }

    /// When the current pass through the loop began.
    pub fn cycle_start(&self) -> Option<Instant> {
        self.running.as_ref().map(|r| r.cycle_start)
    }

    /// Yields the next due tick, if any. Call until it returns `None`; a
    /// late caller catches up one tick at a time so the grid never drifts.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let r = self.running.as_mut()?;
        if now < r.next_due {
            return None;
        }
        let beat = r.next_beat;
        if beat == 0 {
            r.cycle_start = r.next_due;
        }
        r.next_due += r.interval;
        r.next_beat = (beat + 1) % r.total_beats;
        Some(beat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test_case(60 ; "slowest")]
    #[test_case(90 ; "ninety")]
    #[test_case(120 ; "default")]
    #[test_case(133 ; "odd")]
    #[test_case(200 ; "fastest")]
    fn interval_is_sixty_thousand_over_bpm(bpm: u32) {
        let expected_ms = 60_000.0 / bpm as f64;
        let got_ms = beat_interval(bpm).as_secs_f64() * 1000.0;
        approx::assert_abs_diff_eq!(got_ms, expected_ms, epsilon = 1e-6);
    }

    #[test]
    fn first_tick_fires_at_start() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        clock.start(120, 64, t0).unwrap();
        assert_eq!(clock.poll(t0), Some(0));
        assert_eq!(clock.poll(t0), None);
        assert_eq!(clock.poll(t0 + ms(499)), None);
        assert_eq!(clock.poll(t0 + ms(500)), Some(1));
    }

    #[test]
    fn late_poll_catches_up_in_order() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        clock.start(120, 64, t0).unwrap();
        let mut beats = Vec::new();
        while let Some(beat) = clock.poll(t0 + ms(1600)) {
            beats.push(beat);
        }
        assert_eq!(beats, vec![0, 1, 2, 3]);
    }

    #[test]
    fn wraps_modulo_total_beats() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        clock.start(200, 4, t0).unwrap();
        let mut beats = Vec::new();
        while let Some(beat) = clock.poll(t0 + ms(300 * 5)) {
            beats.push(beat);
        }
        assert_eq!(beats, vec![0, 1, 2, 3, 0, 1]);
        assert_eq!(clock.cycle_start(), Some(t0 + ms(1200)));
    }

    #[test]
    fn double_start_is_an_error() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        clock.start(120, 64, t0).unwrap();
        assert_eq!(clock.start(120, 64, t0), Err(LoopError::ClockRunning));
        assert_eq!(clock.interval(), Some(ms(500)));
    }

    #[test]
    fn stop_is_idempotent_and_silences() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        clock.start(120, 64, t0).unwrap();
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.poll(t0 + ms(10_000)), None);
        clock.start(120, 64, t0).unwrap();
        assert_eq!(clock.poll(t0), Some(0));
    }
}
