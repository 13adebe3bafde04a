// crates/playback-media/src/queue.rs
//
// C2: bounded producer/consumer buffer of decoded RGBA frames. Fixed
// capacity of 8 slots, pre-allocated and reused forever by index — `push`
// never allocates a new Vec, only grows an existing one in place.

use playback_core::limits::VIDEO_QUEUE_CAPACITY;

use crate::display::VideoFrameEntry;

pub struct VideoFrameQueue {
    slots: Vec<VideoFrameEntry>,
    write: usize,
    read: usize,
    count: usize,
}

impl VideoFrameQueue {
    pub fn new() -> Self {
        Self {
            slots: (0..VIDEO_QUEUE_CAPACITY).map(|_| VideoFrameEntry::default()).collect(),
            write: 0,
            read: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// VOD-style push: fails if the queue is full. The caller is
    /// responsible for backpressure (see scheduler/driver).
    pub fn push(&mut self, data: &[u8], width: u32, height: u32, stride: usize, pts: f64) -> bool {
        if self.is_full() {
            return false;
        }
        let cap = self.capacity();
        self.slots[self.write].fill(data, width, height, stride, pts);
        self.write = (self.write + 1) % cap;
        self.count += 1;
        true
    }

    /// Live-style push: overwrites the oldest slot first if full, so the
    /// queue never stalls the producer.
    pub fn push_overwriting(&mut self, data: &[u8], width: u32, height: u32, stride: usize, pts: f64) {
        if self.is_full() {
            self.pop_oldest();
        }
        let pushed = self.push(data, width, height, stride, pts);
        debug_assert!(pushed);
    }

    pub fn peek_oldest(&self) -> Option<&VideoFrameEntry> {
        if self.count == 0 {
            return None;
        }
        let entry = &self.slots[self.read];
        entry.valid.then_some(entry)
    }

    /// Removes and invalidates the oldest entry, returning its pts if it
    /// was still valid.
    pub fn pop_oldest(&mut self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let cap = self.capacity();
        let pts = self.slots[self.read].valid.then_some(self.slots[self.read].pts);
        self.slots[self.read].invalidate();
        self.read = (self.read + 1) % cap;
        self.count -= 1;
        pts
    }

    /// Invalidates every slot except the newest and returns it, advancing
    /// the read index to match. Used by the live presentation policy.
    pub fn drain_to_newest(&mut self) -> Option<VideoFrameEntry> {
        if self.count == 0 {
            return None;
        }
        let cap = self.capacity();
        let newest_idx = (self.write + cap - 1) % cap;
        let newest = self.slots[newest_idx].clone();
        for i in 0..self.count {
            let idx = (self.read + i) % cap;
            if idx != newest_idx {
                self.slots[idx].invalidate();
            }
        }
        self.read = newest_idx;
        self.count = if newest.valid { 1 } else { 0 };
        newest.valid.then_some(newest)
    }

    /// Marks all slots invalid and resets indices. Does not deallocate any
    /// slot's buffer.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.invalidate();
        }
        self.write = 0;
        self.read = 0;
        self.count = 0;
    }
}

impl Default for VideoFrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pts: f64) -> ([u8; 4], u32, u32, usize, f64) {
        ([1, 2, 3, 4], 1, 1, 4, pts)
    }

    #[test]
    fn push_increments_count_until_full() {
        let mut q = VideoFrameQueue::new();
        for i in 0..q.capacity() {
            let (data, w, h, s, pts) = frame(i as f64);
            assert!(q.push(&data, w, h, s, pts));
        }
        assert!(q.is_full());
        let (data, w, h, s, pts) = frame(99.0);
        assert!(!q.push(&data, w, h, s, pts));
    }

    #[test]
    fn pop_oldest_returns_pts_in_fifo_order() {
        let mut q = VideoFrameQueue::new();
        let (d, w, h, s, _) = frame(0.0);
        q.push(&d, w, h, s, 1.0);
        q.push(&d, w, h, s, 2.0);
        assert_eq!(q.pop_oldest(), Some(1.0));
        assert_eq!(q.pop_oldest(), Some(2.0));
        assert_eq!(q.pop_oldest(), None);
    }

    #[test]
    fn push_overwriting_drops_oldest_when_full() {
        let mut q = VideoFrameQueue::new();
        let (d, w, h, s, _) = frame(0.0);
        for i in 0..q.capacity() {
            q.push_overwriting(&d, w, h, s, i as f64);
        }
        assert!(q.is_full());
        q.push_overwriting(&d, w, h, s, 999.0);
        assert!(q.is_full());
        // oldest (pts=0.0) should have been evicted
        assert_eq!(q.peek_oldest().map(|e| e.pts), Some(1.0));
    }

    #[test]
    fn drain_to_newest_keeps_only_the_latest_entry() {
        let mut q = VideoFrameQueue::new();
        let (d, w, h, s, _) = frame(0.0);
        for i in 0..4 {
            q.push(&d, w, h, s, i as f64);
        }
        let newest = q.drain_to_newest().expect("should have a newest frame");
        assert_eq!(newest.pts, 3.0);
        assert_eq!(q.len(), 1);
        assert_eq!(q.peek_oldest().map(|e| e.pts), Some(3.0));
    }

    #[test]
    fn clear_invalidates_without_losing_capacity() {
        let mut q = VideoFrameQueue::new();
        let (d, w, h, s, _) = frame(0.0);
        q.push(&d, w, h, s, 1.0);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.capacity(), VIDEO_QUEUE_CAPACITY);
    }

    #[test]
    fn count_formula_matches_write_minus_read_modulo_capacity() {
        let mut q = VideoFrameQueue::new();
        let (d, w, h, s, _) = frame(0.0);
        q.push(&d, w, h, s, 1.0);
        q.push(&d, w, h, s, 2.0);
        q.pop_oldest();
        let cap = q.capacity() as isize;
        let expected = ((q.write as isize - q.read as isize) % cap + cap) % cap;
        assert_eq!(q.count as isize, expected);
    }
}
