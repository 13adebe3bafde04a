// crates/playback-core/src/limits.rs
//
// Every compiled-in tunable the engine uses, in one place. Nothing here is
// re-derived inline at the use site.

/// Fixed capacity of the video frame queue (C2).
pub const VIDEO_QUEUE_CAPACITY: usize = 8;

/// Output audio sample rate. The resampler always targets this regardless
/// of the source rate.
pub const OUTPUT_SAMPLE_RATE: u32 = 48_000;

/// Output channel count (interleaved stereo).
pub const OUTPUT_CHANNELS: u16 = 2;

/// Audio ring capacity in samples (not frames): 2s * 2ch * 48000Hz.
pub const AUDIO_RING_CAPACITY: usize =
    2 * OUTPUT_CHANNELS as usize * OUTPUT_SAMPLE_RATE as usize;

/// VOD backpressure kicks in once the ring holds at least this fraction of
/// its capacity.
pub const BACKPRESSURE_RING_FRACTION: f64 = 0.75;

/// Window within which a queued video frame is considered "on time" for
/// promotion to the display frame.
pub const PRESENTATION_WINDOW_SECS: f64 = 0.016;

/// A decoded video frame trailing the clock by more than this is dropped at
/// the source rather than enqueued (bounded catch-up after a stall).
pub const CATCH_UP_DROP_THRESHOLD_SECS: f64 = 0.5;

/// Decoder worker sleep while state is not Playing.
pub const IDLE_POLL_INTERVAL_MS: u64 = 10;

/// Decoder worker sleep on VOD backpressure.
pub const BACKPRESSURE_POLL_INTERVAL_MS: u64 = 5;

/// Safety timeout for joining the decoder worker on close().
pub const WORKER_JOIN_TIMEOUT_MS: u64 = 2_000;

/// Valid range for playback speed.
pub const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;

/// Valid range for volume.
pub const VOLUME_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;

/// Default max reconnect backoff passed to the demuxer, in seconds.
pub const DEFAULT_RECONNECT_DELAY_MAX_SECS: u32 = 5;

/// Protocols allowed when the URL names an HLS playlist.
pub const M3U8_PROTOCOL_WHITELIST: &str = "file,http,https,tcp,tls,crypto";
