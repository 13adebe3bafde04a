// crates/playback-media/src/clock.rs
//
// C4: wall-clock anchored timeline. Re-anchored on play-from-paused, on
// loop wrap, on the first decoded frame after open/seek, and at seek
// completion. Lives under the player's state lock, never the queue lock.

use std::time::Instant;

pub struct PlaybackClock {
    anchor_time: Instant,
    start_pts: f64,
    /// Frozen position while not running; `time()` returns this directly
    /// when the clock isn't ticking.
    frozen_pts: f64,
    running: bool,
    speed: f32,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            anchor_time: Instant::now(),
            start_pts: 0.0,
            frozen_pts: 0.0,
            running: false,
            speed: 1.0,
        }
    }

    /// Re-anchors the clock so that `time()` will return `pts` from now on,
    /// and resumes ticking.
    pub fn anchor(&mut self, pts: f64) {
        self.anchor_time = Instant::now();
        self.start_pts = pts;
        self.frozen_pts = pts;
        self.running = true;
    }

    /// Stops ticking and freezes `time()` at its current value.
    pub fn freeze(&mut self) {
        self.frozen_pts = self.time();
        self.running = false;
    }

    pub fn time(&self) -> f64 {
        if !self.running {
            return self.frozen_pts;
        }
        let elapsed = self.anchor_time.elapsed().as_secs_f64();
        self.start_pts + elapsed * self.speed as f64
    }

    pub fn set_speed(&mut self, speed: f32) {
        // Re-anchor at the current value so changing speed mid-flight
        // doesn't jump the timeline.
        let now = self.time();
        self.speed = speed;
        if self.running {
            self.anchor(now);
        } else {
            self.frozen_pts = now;
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn anchor_sets_time_immediately() {
        let mut clock = PlaybackClock::new();
        clock.anchor(5.0);
        assert!((clock.time() - 5.0).abs() < 0.01);
    }

    #[test]
    fn time_advances_while_running() {
        let mut clock = PlaybackClock::new();
        clock.anchor(0.0);
        sleep(Duration::from_millis(30));
        assert!(clock.time() >= 0.02);
    }

    #[test]
    fn freeze_stops_advancing() {
        let mut clock = PlaybackClock::new();
        clock.anchor(0.0);
        sleep(Duration::from_millis(20));
        clock.freeze();
        let frozen = clock.time();
        sleep(Duration::from_millis(20));
        assert_eq!(clock.time(), frozen);
    }

    #[test]
    fn speed_scales_elapsed_time() {
        let mut clock = PlaybackClock::new();
        clock.anchor(0.0);
        clock.set_speed(2.0);
        sleep(Duration::from_millis(50));
        // at 2x speed, ~50ms wall time should read as ~100ms media time
        assert!(clock.time() >= 0.08);
    }

    #[test]
    fn default_speed_is_one() {
        let clock = PlaybackClock::new();
        assert_eq!(clock.speed(), 1.0);
    }
}
