// crates/playback-cli/src/main.rs
//
// A minimal host harness for `playback-media`: opens a URL, drives the
// player on a tick loop the way a real host's render/audio threads would,
// and prints state transitions, frame deliveries and audio throughput to
// stdout. This is a demo/example binary, not a GUI inspector.

use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use playback_core::{OpenOptions, PlayerState};
use playback_media::Player;

/// Open a media source and drive it through the decode pipeline, printing
/// state transitions, display-frame deliveries and audio throughput.
#[derive(Parser, Debug)]
#[command(name = "playback-demo", version, about)]
struct Args {
    /// Local file path, direct HTTP(S) URL, or a live HLS/RTMP URL.
    url: String,

    /// Loop playback when the end of a VOD source is reached.
    #[arg(long)]
    loop_playback: bool,

    /// Playback speed, in [0.25, 4.0].
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Host-side volume, in [0.0, 1.0]. Never reaches the decode pipeline;
    /// stored purely so the host can query it back.
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Seconds to run the demo before closing and exiting, regardless of
    /// whether the source reached EndOfFile.
    #[arg(long, default_value_t = 30.0)]
    run_for: f64,

    /// Host tick rate in Hz, matching a render loop's cadence.
    #[arg(long, default_value_t = 60.0)]
    tick_hz: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let player = Player::new();
    let options = OpenOptions::resolve(&args.url, None);
    if let Err(e) = player.open(&args.url, Some(options)) {
        eprintln!("open failed: {} ({})", e, e.code());
        std::process::exit(1);
    }

    if let Some(info) = player.video_info() {
        println!(
            "video: {}x{} @ {:.2} fps, codec={}, duration={:.2}s, live={}",
            info.width, info.height, info.fps, info.codec_name, info.duration_secs, info.is_live
        );
    }
    if let Some(info) = player.audio_info() {
        println!(
            "audio: {} Hz / {} ch -> {} Hz / {} ch, codec={}",
            info.source_rate, info.source_channels, info.output_rate, info.output_channels, info.codec_name
        );
    }

    player.set_loop(args.loop_playback);
    if let Err(e) = player.set_speed(args.speed) {
        eprintln!("invalid --speed: {e}");
        std::process::exit(1);
    }
    if let Err(e) = player.set_volume(args.volume) {
        eprintln!("invalid --volume: {e}");
        std::process::exit(1);
    }

    if let Err(e) = player.play() {
        eprintln!("play failed: {e}");
        std::process::exit(1);
    }

    let tick_interval = Duration::from_secs_f64(1.0 / args.tick_hz);
    let mut audio_scratch = vec![0.0f32; 4096];
    let mut last_state = player.state();
    let mut frames_delivered: u64 = 0;
    let mut samples_delivered: u64 = 0;

    let run_until = Instant::now() + Duration::from_secs_f64(args.run_for);
    loop {
        let tick_start = Instant::now();
        if tick_start >= run_until {
            println!("demo time budget elapsed, closing");
            break;
        }

        let promoted = player.update(tick_interval.as_secs_f64());
        if promoted > 0 {
            if let Some(frame) = player.get_video_frame() {
                frames_delivered += 1;
                if frames_delivered == 1 || frames_delivered % 60 == 0 {
                    println!(
                        "frame #{frames_delivered}: {}x{} stride={} pts={:.3} position={:.3}",
                        frame.width,
                        frame.height,
                        frame.stride,
                        frame.pts,
                        player.position()
                    );
                }
            }
        }

        let copied = player.read_audio(&mut audio_scratch);
        samples_delivered += copied as u64;

        let state = player.state();
        if state != last_state {
            println!("state: {last_state} -> {state}");
            last_state = state;
            if matches!(state, PlayerState::EndOfFile | PlayerState::Error) {
                if state == PlayerState::Error {
                    let (code, msg) = player.last_error();
                    eprintln!("error: {code} {msg}");
                }
                break;
            }
        }

        let elapsed = tick_start.elapsed();
        if elapsed < tick_interval {
            thread::sleep(tick_interval - elapsed);
        }
    }

    println!(
        "summary: frames_delivered={frames_delivered} samples_delivered={samples_delivered} final_position={:.3}",
        player.position()
    );
    player.close();
}
