// crates/playback-core/src/lib.rs
//
// Pure data types, error codes and the player state machine shared between
// the decode engine (playback-media) and any host. No ffmpeg, no threads —
// just the shapes the engine fills in and the host reads.

pub mod error;
pub mod limits;
pub mod options;
pub mod state;
pub mod types;

pub use error::{ErrorCode, PlayerError};
pub use options::OpenOptions;
pub use state::PlayerState;
pub use types::{AudioInfo, PixelFormat, VideoInfo};
