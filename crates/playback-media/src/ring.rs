// crates/playback-media/src/ring.rs
//
// C3: fixed-capacity circular buffer of interleaved stereo f32 samples.
// Samples arrive already resampled to the output format; volume is never
// applied here (see the player state's `volume`, which is host-side only).

use playback_core::limits::AUDIO_RING_CAPACITY;

pub struct AudioRing {
    buffer: Vec<f32>,
    write: usize,
    read: usize,
    available: usize,
}

impl AudioRing {
    pub fn new() -> Self {
        Self::with_capacity(AUDIO_RING_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            write: 0,
            read: 0,
            available: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn available(&self) -> usize {
        self.available
    }

    pub fn fill_fraction(&self) -> f64 {
        self.available as f64 / self.capacity() as f64
    }

    /// VOD-style write: only writes samples while there is room, dropping
    /// the rest. Returns the number of samples actually written.
    pub fn write(&mut self, samples: &[f32]) -> usize {
        let room = self.capacity() - self.available;
        let n = samples.len().min(room);
        self.write_raw(&samples[..n]);
        n
    }

    /// Live-style write: if there isn't enough room, drops the oldest
    /// samples first so the newest data is never rejected.
    pub fn write_overwriting(&mut self, samples: &[f32]) {
        let cap = self.capacity();
        let n = samples.len().min(cap);
        let incoming = &samples[samples.len() - n..];
        let room = cap - self.available;
        if n > room {
            let to_drop = n - room;
            self.read = (self.read + to_drop) % cap;
            self.available -= to_drop;
        }
        self.write_raw(incoming);
    }

    fn write_raw(&mut self, samples: &[f32]) {
        let cap = self.capacity();
        for &s in samples {
            self.buffer[self.write] = s;
            self.write = (self.write + 1) % cap;
        }
        self.available += samples.len();
    }

    /// Copies up to `dst.len()` samples into `dst`, returning the number
    /// actually copied. The caller must zero-fill any remainder itself.
    pub fn read_into(&mut self, dst: &mut [f32]) -> usize {
        let cap = self.capacity();
        let n = dst.len().min(self.available);
        for slot in dst.iter_mut().take(n) {
            *slot = self.buffer[self.read];
            self.read = (self.read + 1) % cap;
        }
        self.available -= n;
        n
    }

    pub fn clear(&mut self) {
        self.write = 0;
        self.read = 0;
        self.available = 0;
    }
}

impl Default for AudioRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_into_round_trips() {
        let mut ring = AudioRing::with_capacity(8);
        assert_eq!(ring.write(&[1.0, 2.0, 3.0, 4.0]), 4);
        let mut dst = [0.0; 4];
        assert_eq!(ring.read_into(&mut dst), 4);
        assert_eq!(dst, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn vod_write_drops_excess_once_full() {
        let mut ring = AudioRing::with_capacity(4);
        assert_eq!(ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 4);
        assert_eq!(ring.available(), 4);
    }

    #[test]
    fn live_write_overwrites_oldest_samples() {
        let mut ring = AudioRing::with_capacity(4);
        ring.write(&[1.0, 2.0, 3.0, 4.0]);
        ring.write_overwriting(&[5.0, 6.0]);
        let mut dst = [0.0; 4];
        ring.read_into(&mut dst);
        // oldest two (1.0, 2.0) were dropped to make room
        assert_eq!(dst, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn read_into_short_read_when_underfilled() {
        let mut ring = AudioRing::with_capacity(8);
        ring.write(&[1.0, 2.0]);
        let mut dst = [9.0; 4];
        assert_eq!(ring.read_into(&mut dst), 2);
        assert_eq!(dst, [1.0, 2.0, 9.0, 9.0]); // remainder untouched, host must zero-fill
    }

    #[test]
    fn available_never_exceeds_capacity() {
        let mut ring = AudioRing::with_capacity(4);
        ring.write(&[1.0; 10]);
        assert!(ring.available() <= ring.capacity());
    }

    #[test]
    fn default_capacity_matches_two_seconds_stereo_48k() {
        let ring = AudioRing::new();
        assert_eq!(ring.capacity(), 192_000);
    }

    #[test]
    fn clear_resets_available_to_zero() {
        let mut ring = AudioRing::with_capacity(8);
        ring.write(&[1.0, 2.0]);
        ring.clear();
        assert_eq!(ring.available(), 0);
    }
}
