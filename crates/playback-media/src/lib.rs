// crates/playback-media/src/lib.rs
//
// The decode engine: demuxer/decoder driver, video queue, audio ring,
// playback clock, presentation scheduler and the player facade that ties
// them together under the two-lock concurrency model.

pub mod clock;
pub mod display;
pub mod player;
pub mod queue;
pub mod ring;
pub mod scheduler;
pub mod session;
mod worker; // internal — driven only through Player::open

pub use display::DisplayFrameView;
pub use player::{DisplayFrameViewOwned, Player};

pub use playback_core::{AudioInfo, ErrorCode, OpenOptions, PixelFormat, PlayerError, PlayerState, VideoInfo};
