// crates/playback-media/src/worker.rs
//
// The decoder worker thread: the sole writer to the video queue and audio
// ring. Owns the `MediaSession` for the lifetime of one open(); observes
// the stop flag and the shared player state at the top of every loop
// iteration and never holds a lock across the blocking demuxer read.
//
// End-to-end scenarios this loop is responsible for (exercised with real
// media, not unit-testable without a sample file):
//
// - Direct MP4, H.264+AAC, 10s @ 30fps: `open`+`play` yields a first
//   1280x720 RGBA frame within 500ms; the loop reaches `Ok(None)` at
//   roughly t=10.0s and transitions to EndOfFile (the `Ok(None)` arm
//   below, with `loop_enabled` false).
// - Live HLS: `is_live` routes every video frame through
//   `push_overwriting` and skips the VOD catch-up drop in `enqueue_video`,
//   so a producer that outpaces the consumer keeps the promoted frame
//   within one queue-fill interval of wall time instead of drifting
//   arbitrarily far behind; `seek_to` rejects live sources outright.
// - Loop: with `loop_enabled` and a non-live source, `Ok(None)` routes to
//   `handle_loop_wrap` instead of EndOfFile, repeatedly reseeking to 0 and
//   resetting `first_frame_decoded` so `position` wraps back into
//   `[0, duration)` every time the clip ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use playback_core::limits::{
    BACKPRESSURE_POLL_INTERVAL_MS, BACKPRESSURE_RING_FRACTION, CATCH_UP_DROP_THRESHOLD_SECS,
    IDLE_POLL_INTERVAL_MS,
};
use playback_core::PlayerState;

use crate::player::PlayerShared;
use crate::session::MediaSession;

/// Runs the decode loop until `stop` is set or a terminal state is reached.
/// Consumes `session`; it is dropped (and its ffmpeg resources freed) when
/// this function returns.
pub(crate) fn run(mut session: MediaSession, shared: Arc<PlayerShared>, stop: Arc<AtomicBool>) {
    log::debug!("decoder worker started");
    loop {
        if stop.load(Ordering::Relaxed) {
            log::debug!("decoder worker observed stop flag, exiting");
            break;
        }

        let (is_playing, is_live, loop_enabled, pending_seek) = {
            let mut state = shared.state.lock().unwrap();
            let seek = state.seek_request.take();
            (
                state.state == PlayerState::Playing,
                state.is_live,
                state.loop_enabled,
                seek,
            )
        };

        if let Some(target) = pending_seek {
            handle_seek(&mut session, &shared, target);
            continue;
        }

        if !is_playing {
            thread::sleep(Duration::from_millis(IDLE_POLL_INTERVAL_MS));
            continue;
        }

        if !is_live && backpressure_engaged(&shared) {
            thread::sleep(Duration::from_millis(BACKPRESSURE_POLL_INTERVAL_MS));
            continue;
        }

        match session.decode_next_packet() {
            Ok(Some((videos, audios))) => {
                for v in videos {
                    enqueue_video(&shared, is_live, v);
                }
                for a in audios {
                    enqueue_audio(&shared, is_live, a);
                }
            }
            Ok(None) => {
                if loop_enabled && !is_live {
                    if !handle_loop_wrap(&mut session, &shared) {
                        break;
                    }
                } else {
                    let mut state = shared.state.lock().unwrap();
                    state.state = PlayerState::EndOfFile;
                    state.clock.freeze();
                    log::info!("decoder worker reached end of stream");
                    break;
                }
            }
            Err(e) => {
                let mut state = shared.state.lock().unwrap();
                log::error!("demuxer read failed: {e}");
                state.state = PlayerState::Error;
                state.last_error = Some((e.code(), e.message()));
                break;
            }
        }
    }
    log::debug!("decoder worker exiting");
}

fn backpressure_engaged(shared: &PlayerShared) -> bool {
    let queue = shared.queue.lock().unwrap();
    let queue_nearly_full = queue.video_queue.len() >= queue.video_queue.capacity() - 1;
    let ring_mostly_full = queue.audio_ring.fill_fraction() >= BACKPRESSURE_RING_FRACTION;
    queue_nearly_full && ring_mostly_full
}

fn enqueue_video(shared: &PlayerShared, is_live: bool, frame: crate::session::DecodedVideo) {
    {
        let mut state = shared.state.lock().unwrap();
        if let Some(target) = state.seek_discard_before {
            if frame.pts < target {
                log::debug!(
                    "discarding seek pre-roll frame: pts={:.3} target={:.3}",
                    frame.pts,
                    target
                );
                return;
            }
            state.seek_discard_before = None;
        }
    }

    if !is_live {
        let clock_time = shared.state.lock().unwrap().clock.time();
        if clock_time - frame.pts > CATCH_UP_DROP_THRESHOLD_SECS {
            log::debug!(
                "dropping stale video frame: pts={:.3} clock={:.3}",
                frame.pts,
                clock_time
            );
            return;
        }
    }

    let is_first_frame = {
        let mut state = shared.state.lock().unwrap();
        let first = !state.first_frame_decoded;
        if first {
            state.first_frame_decoded = true;
            state.clock.anchor(frame.pts);
        }
        first
    };
    if is_first_frame {
        log::debug!("first video frame decoded, clock anchored at pts={:.3}", frame.pts);
    }

    let mut queue = shared.queue.lock().unwrap();
    if is_live {
        queue
            .video_queue
            .push_overwriting(&frame.data, frame.width, frame.height, frame.stride, frame.pts);
    } else {
        queue
            .video_queue
            .push(&frame.data, frame.width, frame.height, frame.stride, frame.pts);
    }
    drop(queue);

    shared.invoke_video_callback(&frame);
}

fn enqueue_audio(shared: &PlayerShared, is_live: bool, chunk: crate::session::DecodedAudio) {
    let mut queue = shared.queue.lock().unwrap();
    if is_live {
        queue.audio_ring.write_overwriting(&chunk.samples);
    } else {
        queue.audio_ring.write(&chunk.samples);
    }
    drop(queue);

    shared.invoke_audio_callback(&chunk);
}

fn handle_seek(session: &mut MediaSession, shared: &PlayerShared, target: f64) {
    match session.seek_to(target) {
        Ok(()) => {
            {
                let mut queue = shared.queue.lock().unwrap();
                queue.video_queue.clear();
                queue.audio_ring.clear();
                queue.display.ready = false;
            }
            let mut state = shared.state.lock().unwrap();
            state.clock.anchor(target);
            state.first_frame_decoded = false;
            state.seek_discard_before = Some(target);
            log::debug!("seek completed, re-anchored clock at {:.3}", target);
        }
        Err(e) => {
            let mut state = shared.state.lock().unwrap();
            log::warn!("seek failed: {e}");
            state.last_error = Some((e.code(), e.message()));
        }
    }
}

/// Returns `false` if the loop-wrap seek itself failed and the worker
/// should terminate in the Error state.
fn handle_loop_wrap(session: &mut MediaSession, shared: &PlayerShared) -> bool {
    match session.seek_to(0.0) {
        Ok(()) => {
            {
                let mut queue = shared.queue.lock().unwrap();
                queue.video_queue.clear();
                queue.audio_ring.clear();
                queue.display.ready = false;
            }
            let mut state = shared.state.lock().unwrap();
            state.first_frame_decoded = false;
            log::debug!("loop wrap: seeked to start");
            true
        }
        Err(e) => {
            let mut state = shared.state.lock().unwrap();
            log::error!("loop wrap seek failed: {e}");
            state.state = PlayerState::Error;
            state.last_error = Some((e.code(), e.message()));
            false
        }
    }
}
