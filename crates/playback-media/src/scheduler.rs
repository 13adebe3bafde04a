// crates/playback-media/src/scheduler.rs
//
// C5: invoked on the host's tick. Non-blocking. Consults the clock (C4) and
// drains the video queue (C2) under distinct VOD/live policies to decide
// what, if anything, becomes the new display frame.

use playback_core::limits::PRESENTATION_WINDOW_SECS;

use crate::display::DisplayFrame;
use crate::queue::VideoFrameQueue;

/// Result of a single `tick()` call, mirroring `update(dt) -> frames_ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickResult {
    pub frames_promoted: u32,
}

/// Promotes at most one frame per tick under the VOD "oldest entry within
/// the presentation window" rule.
///
/// Returns `true` if a frame was promoted.
pub fn tick_vod(queue: &mut VideoFrameQueue, display: &mut DisplayFrame, clock_time: f64) -> bool {
    let Some(oldest) = queue.peek_oldest() else {
        return false;
    };
    if oldest.pts - clock_time <= PRESENTATION_WINDOW_SECS {
        let entry = queue.peek_oldest().expect("checked above").clone();
        display.promote_from(&entry);
        queue.pop_oldest();
        true
    } else {
        false
    }
}

/// Drains the entire queue in one pass, promoting only the newest valid
/// entry. Guarantees the live presentation latency tracks the producer and
/// never grows.
pub fn tick_live(queue: &mut VideoFrameQueue, display: &mut DisplayFrame) -> bool {
    match queue.drain_to_newest() {
        Some(entry) => {
            display.promote_from(&entry);
            true
        }
        None => false,
    }
}

/// Runs one scheduler tick under the given liveness mode.
pub fn tick(queue: &mut VideoFrameQueue, display: &mut DisplayFrame, clock_time: f64, is_live: bool) -> TickResult {
    let promoted = if is_live {
        tick_live(queue, display)
    } else {
        tick_vod(queue, display, clock_time)
    };
    TickResult {
        frames_promoted: promoted as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(queue: &mut VideoFrameQueue, pts: f64) {
        queue.push(&[1, 2, 3, 4], 1, 1, 4, pts);
    }

    #[test]
    fn vod_promotes_oldest_within_window() {
        let mut queue = VideoFrameQueue::new();
        let mut display = DisplayFrame::default();
        push(&mut queue, 1.000);
        push(&mut queue, 1.050);
        assert!(tick_vod(&mut queue, &mut display, 1.005));
        assert_eq!(display.pts, 1.000);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn vod_does_not_promote_future_frame() {
        let mut queue = VideoFrameQueue::new();
        let mut display = DisplayFrame::default();
        push(&mut queue, 5.0);
        assert!(!tick_vod(&mut queue, &mut display, 0.0));
        assert!(!display.ready);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn vod_promotes_at_most_one_frame_per_tick() {
        let mut queue = VideoFrameQueue::new();
        let mut display = DisplayFrame::default();
        push(&mut queue, 0.0);
        push(&mut queue, 0.001);
        push(&mut queue, 0.002);
        assert!(tick_vod(&mut queue, &mut display, 10.0));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn live_promotes_newest_and_drops_the_rest() {
        let mut queue = VideoFrameQueue::new();
        let mut display = DisplayFrame::default();
        for i in 0..5 {
            push(&mut queue, i as f64);
        }
        assert!(tick_live(&mut queue, &mut display));
        assert_eq!(display.pts, 4.0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn live_tick_on_empty_queue_promotes_nothing() {
        let mut queue = VideoFrameQueue::new();
        let mut display = DisplayFrame::default();
        assert!(!tick_live(&mut queue, &mut display));
    }
}
