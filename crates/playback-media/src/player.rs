// crates/playback-media/src/player.rs
//
// C6: the public player facade. Exactly two mutexes guard the state the
// spec calls out: `state` (state, last error, clock, first_frame_decoded,
// speed, volume, loop) and `queue` (video queue, audio ring, display
// frame). Lock ordering: state before queue. A third, unrelated mutex
// holds the optional host callbacks — they are invoked with neither of
// the two core locks held, so they are outside the ordering rule entirely.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use playback_core::limits::WORKER_JOIN_TIMEOUT_MS;
use playback_core::{AudioInfo, ErrorCode, OpenOptions, PixelFormat, PlayerError, PlayerState, VideoInfo};

use crate::clock::PlaybackClock;
use crate::display::{DisplayFrame, DisplayFrameView};
use crate::queue::VideoFrameQueue;
use crate::ring::AudioRing;
use crate::session::{DecodedAudio, DecodedVideo, MediaSession};
use crate::worker;

type VideoCallback = Box<dyn Fn(&[u8], u32, u32, usize, f64) + Send + Sync>;
type AudioCallback = Box<dyn Fn(&[f32], usize, u16, f64) + Send + Sync>;

pub(crate) struct StateGuarded {
    pub state: PlayerState,
    pub last_error: Option<(ErrorCode, String)>,
    pub clock: PlaybackClock,
    pub first_frame_decoded: bool,
    pub speed: f32,
    pub volume: f32,
    pub loop_enabled: bool,
    pub hw_accel_hint: bool,
    pub pixel_format: PixelFormat,
    pub seek_request: Option<f64>,
    /// Set to the seek target immediately after a seek completes; cleared
    /// once the first frame at or past that target is decoded. Every frame
    /// decoded while this is set is pre-roll from the keyframe the demuxer
    /// actually landed on and must be discarded rather than displayed.
    pub seek_discard_before: Option<f64>,
    pub is_live: bool,
    pub duration_secs: f64,
    /// PTS of the most recently promoted display frame. Informational only
    /// — the clock's own anchor is never touched by a presentation tick.
    pub video_pts: f64,
    pub video_info: Option<VideoInfo>,
    pub audio_info: Option<AudioInfo>,
}

impl Default for StateGuarded {
    fn default() -> Self {
        Self {
            state: PlayerState::Idle,
            last_error: None,
            clock: PlaybackClock::new(),
            first_frame_decoded: false,
            speed: 1.0,
            volume: 1.0,
            loop_enabled: false,
            hw_accel_hint: false,
            pixel_format: PixelFormat::Rgba,
            seek_request: None,
            seek_discard_before: None,
            is_live: false,
            duration_secs: 0.0,
            video_pts: 0.0,
            video_info: None,
            audio_info: None,
        }
    }
}

pub(crate) struct QueueGuarded {
    pub video_queue: VideoFrameQueue,
    pub audio_ring: AudioRing,
    pub display: DisplayFrame,
}

impl Default for QueueGuarded {
    fn default() -> Self {
        Self {
            video_queue: VideoFrameQueue::new(),
            audio_ring: AudioRing::new(),
            display: DisplayFrame::default(),
        }
    }
}

#[derive(Default)]
struct CallbackSlots {
    video: Option<VideoCallback>,
    audio: Option<AudioCallback>,
}

pub(crate) struct PlayerShared {
    pub state: Mutex<StateGuarded>,
    pub queue: Mutex<QueueGuarded>,
    callbacks: Mutex<CallbackSlots>,
}

impl PlayerShared {
    pub(crate) fn invoke_video_callback(&self, frame: &DecodedVideo) {
        if let Some(cb) = &self.callbacks.lock().unwrap().video {
            cb(&frame.data, frame.width, frame.height, frame.stride, frame.pts);
        }
    }

    pub(crate) fn invoke_audio_callback(&self, chunk: &DecodedAudio) {
        if let Some(cb) = &self.callbacks.lock().unwrap().audio {
            let channels = playback_core::limits::OUTPUT_CHANNELS;
            cb(&chunk.samples, chunk.samples.len(), channels, chunk.pts);
        }
    }
}

/// The host-facing media player. Cheap to clone (it's a handle around an
/// `Arc`); all sessions spawn their own decoder worker thread.
#[derive(Clone)]
pub struct Player {
    shared: Arc<PlayerShared>,
    stop_flag: Arc<AtomicBool>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(PlayerShared {
                state: Mutex::new(StateGuarded::default()),
                queue: Mutex::new(QueueGuarded::default()),
                callbacks: Mutex::new(CallbackSlots::default()),
            }),
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: Arc::new(Mutex::new(None)),
        }
    }

    /// Opens `url`. Blocks until the session is built (streams discovered,
    /// decoders/converters instantiated) or fails; decoding then proceeds
    /// on a dedicated worker thread gated by `play()`.
    pub fn open(&self, url: &str, options: Option<OpenOptions>) -> Result<(), PlayerError> {
        self.close();

        let options = options.unwrap_or_else(|| OpenOptions::resolve(url, None));
        {
            let mut state = self.shared.state.lock().unwrap();
            state.state = PlayerState::Opening;
        }

        log::info!("opening {url}");
        let session = match MediaSession::open(url, &options) {
            Ok(s) => s,
            Err(e) => {
                let mut state = self.shared.state.lock().unwrap();
                log::error!("open failed: {e}");
                state.state = PlayerState::Error;
                state.last_error = Some((e.code(), e.message()));
                return Err(e);
            }
        };

        {
            let mut state = self.shared.state.lock().unwrap();
            state.state = PlayerState::Ready;
            state.is_live = session.is_live;
            state.duration_secs = session.duration_secs;
            state.video_info = session.video_info.clone();
            state.audio_info = session.audio_info.clone();
            state.first_frame_decoded = false;
            state.clock = PlaybackClock::new();
        }
        {
            let mut queue = self.shared.queue.lock().unwrap();
            queue.video_queue.clear();
            queue.audio_ring.clear();
            queue.display = DisplayFrame::default();
        }

        self.stop_flag.store(false, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);
        let stop = Arc::clone(&self.stop_flag);
        let handle = std::thread::spawn(move || worker::run(session, shared, stop));
        *self.worker.lock().unwrap() = Some(handle);

        Ok(())
    }

    /// Idempotent: stops the worker (with a safety join timeout), tears
    /// down resources, clears queues, and returns to Idle.
    pub fn close(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        self.join_worker_with_timeout();

        let mut state = self.shared.state.lock().unwrap();
        *state = StateGuarded::default();
        drop(state);

        let mut queue = self.shared.queue.lock().unwrap();
        *queue = QueueGuarded::default();
    }

    fn join_worker_with_timeout(&self) {
        let handle = self.worker.lock().unwrap().take();
        let Some(handle) = handle else { return };

        let deadline = Instant::now() + Duration::from_millis(WORKER_JOIN_TIMEOUT_MS);
        while !handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        if handle.is_finished() {
            let _ = handle.join();
        } else {
            log::warn!("decoder worker did not exit within the safety timeout; detaching");
        }
    }

    pub fn play(&self) -> Result<(), PlayerError> {
        let mut state = self.shared.state.lock().unwrap();
        if !state.state.can_play() {
            return Err(PlayerError::NotReady);
        }
        if state.state != PlayerState::Playing {
            let resume_pts = state.clock.time();
            state.clock.anchor(resume_pts);
        }
        state.state = PlayerState::Playing;
        Ok(())
    }

    pub fn pause(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if state.state.can_pause() {
            state.clock.freeze();
            state.state = PlayerState::Paused;
        }
    }

    pub fn stop(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if state.state.can_stop() {
            state.clock.freeze();
            state.state = PlayerState::Stopped;
        }
    }

    pub fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        let mut state = self.shared.state.lock().unwrap();
        if state.is_live {
            return Err(PlayerError::SeekFailed("source is live".into()));
        }
        if !state.state.can_seek() {
            return Err(PlayerError::NotReady);
        }
        state.seek_request = Some(seconds);
        Ok(())
    }

    pub fn state(&self) -> PlayerState {
        self.shared.state.lock().unwrap().state
    }

    pub fn last_error(&self) -> (ErrorCode, String) {
        self.shared
            .state
            .lock()
            .unwrap()
            .last_error
            .clone()
            .unwrap_or((ErrorCode::Ok, String::new()))
    }

    pub fn video_info(&self) -> Option<VideoInfo> {
        self.shared.state.lock().unwrap().video_info.clone()
    }

    pub fn audio_info(&self) -> Option<AudioInfo> {
        self.shared.state.lock().unwrap().audio_info.clone()
    }

    pub fn position(&self) -> f64 {
        self.shared.state.lock().unwrap().clock.time()
    }

    pub fn duration(&self) -> f64 {
        self.shared.state.lock().unwrap().duration_secs
    }

    pub fn is_live(&self) -> bool {
        self.shared.state.lock().unwrap().is_live
    }

    /// Runs one scheduler tick (C5). `dt` is accepted for interface
    /// symmetry with hosts that pass frame delta time; the clock is
    /// wall-clock driven and does not need it.
    ///
    /// VOD drift scenario: with a 30fps source ticked at 60Hz for 10s of
    /// wall time, the number of calls that return a nonzero promotion
    /// count should total 300 ± 2 with zero duplicate promotions — each
    /// source frame promoted exactly once, never twice, never dropped
    /// purely because of tick-rate mismatch.
    pub fn update(&self, _dt: f64) -> u32 {
        let (clock_time, is_live, pixel_format) = {
            let state = self.shared.state.lock().unwrap();
            (state.clock.time(), state.is_live, state.pixel_format)
        };
        let mut queue = self.shared.queue.lock().unwrap();
        let QueueGuarded {
            video_queue,
            display,
            ..
        } = &mut *queue;
        let result = crate::scheduler::tick(video_queue, display, clock_time, is_live);

        if result.frames_promoted > 0 {
            display.apply_pixel_format(pixel_format);
            let pts = display.pts;
            drop(queue);
            self.shared.state.lock().unwrap().video_pts = pts;
        }

        result.frames_promoted
    }

    /// Returns the current display frame if one became ready since the
    /// last call, clearing `ready` so it is not handed out twice. The
    /// returned view borrows the queue lock and cannot outlive this call's
    /// scope, modeling "valid until next update/close".
    pub fn get_video_frame(&self) -> Option<DisplayFrameViewOwned> {
        let mut queue = self.shared.queue.lock().unwrap();
        queue.display.take().map(|v: DisplayFrameView<'_>| DisplayFrameViewOwned {
            data: v.data.to_vec(),
            width: v.width,
            height: v.height,
            stride: v.stride,
            pts: v.pts,
            pixel_format: v.pixel_format,
        })
    }

    /// Audio backpressure scenario (VOD): if the host stops calling this
    /// for a stretch, the ring fills toward capacity and
    /// `backpressure_engaged` throttles the decode loop, so `position`
    /// still advances at real time (±1%) instead of the decoder racing
    /// ahead and discarding audio.
    ///
    /// Live audio overwrite scenario: on a live source the ring is written
    /// with `write_overwriting` instead, so a host that stops reading for a
    /// few seconds and then resumes gets the most recent samples, not the
    /// oldest — continuity across the gap is not preserved, only recency.
    pub fn read_audio(&self, dst: &mut [f32]) -> usize {
        let mut queue = self.shared.queue.lock().unwrap();
        queue.audio_ring.read_into(dst)
    }

    pub fn set_loop(&self, enabled: bool) {
        self.shared.state.lock().unwrap().loop_enabled = enabled;
    }

    pub fn set_speed(&self, speed: f32) -> Result<(), PlayerError> {
        if !playback_core::limits::SPEED_RANGE.contains(&speed) {
            return Err(PlayerError::InvalidParameter(format!(
                "speed {speed} out of range"
            )));
        }
        let mut state = self.shared.state.lock().unwrap();
        state.speed = speed;
        state.clock.set_speed(speed);
        Ok(())
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), PlayerError> {
        if !playback_core::limits::VOLUME_RANGE.contains(&volume) {
            return Err(PlayerError::InvalidParameter(format!(
                "volume {volume} out of range"
            )));
        }
        self.shared.state.lock().unwrap().volume = volume;
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.shared.state.lock().unwrap().volume
    }

    pub fn set_pixel_format(&self, format: PixelFormat) {
        self.shared.state.lock().unwrap().pixel_format = format;
    }

    /// Accepted but never consulted by the decode loop (see open question
    /// resolution: hardware acceleration is out of scope).
    pub fn set_hw_accel_hint(&self, enabled: bool) {
        self.shared.state.lock().unwrap().hw_accel_hint = enabled;
    }

    pub fn on_video_frame<F>(&self, callback: F)
    where
        F: Fn(&[u8], u32, u32, usize, f64) + Send + Sync + 'static,
    {
        self.shared.callbacks.lock().unwrap().video = Some(Box::new(callback));
    }

    pub fn on_audio<F>(&self, callback: F)
    where
        F: Fn(&[f32], usize, u16, f64) + Send + Sync + 'static,
    {
        self.shared.callbacks.lock().unwrap().audio = Some(Box::new(callback));
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned copy of [`DisplayFrameView`] for the public API: keeping a real
/// borrow alive across the call boundary would pin the queue lock for as
/// long as the host holds the frame, which the presentation thread cannot
/// afford. The lock is only held for the duration of the copy.
#[derive(Debug, Clone)]
pub struct DisplayFrameViewOwned {
    pub data: Vec<u8>,
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
    fn new_player_starts_idle() {
        let player = Player::new();
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.position(), 0.0);
        assert!(player.get_video_frame().is_none());
    }

    #[test]
    fn play_is_rejected_before_open() {
        let player = Player::new();
        assert!(matches!(player.play(), Err(PlayerError::NotReady)));
    }

    #[test]
    fn seek_on_idle_player_is_rejected() {
        let player = Player::new();
        assert!(matches!(player.seek(1.0), Err(PlayerError::NotReady)));
    }

    #[test]
    fn close_on_idle_player_is_a_harmless_no_op() {
        let player = Player::new();
        player.close();
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn set_speed_rejects_out_of_range_values() {
        let player = Player::new();
        assert!(player.set_speed(0.1).is_err());
        assert!(player.set_speed(10.0).is_err());
        assert!(player.set_speed(1.5).is_ok());
    }

    #[test]
    fn set_volume_rejects_out_of_range_values() {
        let player = Player::new();
        assert!(player.set_volume(-0.1).is_err());
        assert!(player.set_volume(1.1).is_err());
        assert!(player.set_volume(0.5).is_ok());
        assert_eq!(player.volume(), 0.5);
    }

    #[test]
    fn hw_accel_hint_is_stored_but_inert() {
        let player = Player::new();
        player.set_hw_accel_hint(true);
        assert!(player.shared.state.lock().unwrap().hw_accel_hint);
    }
}
