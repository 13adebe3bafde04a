// crates/playback-media/src/display.rs
//
// The frame shapes shared between the decoder worker (C1, writer), the
// video queue (C2) and the presentation scheduler (C5, reader).

use playback_core::PixelFormat;

/// A fixed-capacity slot in the video queue. The buffer is allocated lazily
/// on first write and reused forever for that slot index; `clear()` never
/// deallocates it.
#[derive(Debug, Clone, Default)]
pub struct VideoFrameEntry {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub pts: f64,
    pub valid: bool,
}

impl VideoFrameEntry {
    /// Writes `data` into this slot, growing the backing buffer only if it
    /// is smaller than required. `stride` must be `>= width * 4`.
    pub fn fill(&mut self, data: &[u8], width: u32, height: u32, stride: usize, pts: f64) {
        debug_assert!(stride >= width as usize * 4);
        if self.data.len() < data.len() {
            self.data.resize(data.len(), 0);
        }
        self.data[..data.len()].copy_from_slice(data);
        self.data.truncate(data.len());
        self.width = width;
        self.height = height;
        self.stride = stride;
        self.pts = pts;
        self.valid = true;
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// The single RGBA buffer handed to the host via `get_video_frame`.
#[derive(Debug, Clone, Default)]
pub struct DisplayFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub pts: f64,
    pub ready: bool,
    pub pixel_format: PixelFormat,
}

impl DisplayFrame {
    /// Copies `entry` into this display frame and marks it ready. Does not
    /// touch `entry` itself — the caller is responsible for invalidating it
    /// in the queue.
    pub fn promote_from(&mut self, entry: &VideoFrameEntry) {
        if self.data.len() != entry.data.len() {
            self.data.resize(entry.data.len(), 0);
        }
        self.data.copy_from_slice(&entry.data);
        self.width = entry.width;
        self.height = entry.height;
        self.stride = entry.stride;
        self.pts = entry.pts;
        self.ready = true;
        self.pixel_format = PixelFormat::Rgba;
    }

    /// Applies the host's requested output layout to a just-promoted frame.
    /// `promote_from` always leaves the buffer in RGBA (the queue only ever
    /// holds RGBA entries); this swaps R and B in place when BGRA was
    /// requested. Calling it more than once per promotion would re-swap an
    /// already-swapped buffer, so the caller must invoke it at most once,
    /// immediately after `promote_from`.
    pub fn apply_pixel_format(&mut self, format: PixelFormat) {
        if format == PixelFormat::Bgra {
            for px in self.data.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
        }
        self.pixel_format = format;
    }

    /// Clears `ready` so the same frame can't be consumed twice. Leaves the
    /// buffer contents alone — the host may have just finished reading it.
    pub fn take(&mut self) -> Option<DisplayFrameView<'_>> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(DisplayFrameView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
            pts: self.pts,
            pixel_format: self.pixel_format,
        })
    }
}

/// A read-only view into the current display buffer. Ties its lifetime to
/// whatever lock guard produced it, so it cannot outlive the next `update`.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFrameView<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub pts: f64,
    pub pixel_format: PixelFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_then_promote_then_take_clears_ready() {
        let mut entry = VideoFrameEntry::default();
        entry.fill(&[1, 2, 3, 4], 1, 1, 4, 1.5);
        assert!(entry.valid);

        let mut display = DisplayFrame::default();
        display.promote_from(&entry);
        assert!(display.ready);

        let view = display.take().expect("frame should be ready");
        assert_eq!(view.data, &[1, 2, 3, 4]);
        assert_eq!(view.pts, 1.5);
        assert!(!display.ready);

        assert!(display.take().is_none());
    }

    #[test]
    fn fill_reuses_buffer_capacity_across_same_size_frames() {
        let mut entry = VideoFrameEntry::default();
        entry.fill(&[0u8; 16], 2, 2, 8, 0.0);
        let ptr_before = entry.data.as_ptr();
        entry.fill(&[1u8; 16], 2, 2, 8, 1.0 / 30.0);
        assert_eq!(entry.data.as_ptr(), ptr_before);
    }

    #[test]
    fn apply_pixel_format_swaps_red_and_blue_for_bgra() {
        let mut entry = VideoFrameEntry::default();
        entry.fill(&[10, 20, 30, 255], 1, 1, 4, 0.0); // R=10 G=20 B=30 A=255

        let mut display = DisplayFrame::default();
        display.promote_from(&entry);
        display.apply_pixel_format(PixelFormat::Bgra);

        assert_eq!(display.data, vec![30, 20, 10, 255]);
        assert_eq!(display.pixel_format, PixelFormat::Bgra);
    }

    #[test]
    fn apply_pixel_format_rgba_is_a_no_op_on_bytes() {
        let mut entry = VideoFrameEntry::default();
        entry.fill(&[10, 20, 30, 255], 1, 1, 4, 0.0);

        let mut display = DisplayFrame::default();
        display.promote_from(&entry);
        display.apply_pixel_format(PixelFormat::Rgba);

        assert_eq!(display.data, vec![10, 20, 30, 255]);
    }
}
