// crates/playback-core/src/error.rs
//
// Two tiers: `PlayerError` is what the engine's own code works with
// (thiserror, matchable, `?`-friendly). `ErrorCode` is the stable numeric
// surface exposed to a host — it must never change shape across a release
// and never carries a Rust type across the boundary.

use std::fmt;

/// Stable numeric error surface. Matches the host-facing table exactly;
/// do not renumber existing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    InvalidPlayer = -1,
    OpenFailed = -2,
    NoVideoStream = -3,
    NoAudioStream = -4,
    CodecNotFound = -5,
    CodecOpenFailed = -6,
    DecodeFailed = -7,
    SeekFailed = -8,
    OutOfMemory = -9,
    NotReady = -10,
    InvalidParameter = -11,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", *self as i32)
    }
}

/// Longest `last_error()` message the host boundary will hand back.
pub const MAX_ERROR_MESSAGE_LEN: usize = 255;

/// Truncates `msg` to [`MAX_ERROR_MESSAGE_LEN`] bytes on a char boundary.
pub fn truncate_error_message(msg: &str) -> String {
    if msg.len() <= MAX_ERROR_MESSAGE_LEN {
        return msg.to_string();
    }
    let mut end = MAX_ERROR_MESSAGE_LEN;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    msg[..end].to_string()
}

/// Engine-internal error type. Every variant maps to exactly one [`ErrorCode`].
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("invalid player handle")]
    InvalidPlayer,

    #[error("failed to open media: {0}")]
    OpenFailed(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("no audio stream found")]
    NoAudioStream,

    #[error("codec not found: {0}")]
    CodecNotFound(String),

    #[error("failed to open codec: {0}")]
    CodecOpenFailed(String),

    #[error("decode failed: {0}")]
    DecodeFailed(String),

    #[error("seek failed: {0}")]
    SeekFailed(String),

    #[error("out of memory")]
    OutOfMemory,

    #[error("player not ready for this operation")]
    NotReady,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl PlayerError {
    /// Projects this error onto the stable numeric code a host can match on.
    pub fn code(&self) -> ErrorCode {
        match self {
            PlayerError::InvalidPlayer => ErrorCode::InvalidPlayer,
            PlayerError::OpenFailed(_) => ErrorCode::OpenFailed,
            PlayerError::NoVideoStream => ErrorCode::NoVideoStream,
            PlayerError::NoAudioStream => ErrorCode::NoAudioStream,
            PlayerError::CodecNotFound(_) => ErrorCode::CodecNotFound,
            PlayerError::CodecOpenFailed(_) => ErrorCode::CodecOpenFailed,
            PlayerError::DecodeFailed(_) => ErrorCode::DecodeFailed,
            PlayerError::SeekFailed(_) => ErrorCode::SeekFailed,
            PlayerError::OutOfMemory => ErrorCode::OutOfMemory,
            PlayerError::NotReady => ErrorCode::NotReady,
            PlayerError::InvalidParameter(_) => ErrorCode::InvalidParameter,
        }
    }

    /// Message for `last_error()`, truncated to the host-boundary limit.
    pub fn message(&self) -> String {
        truncate_error_message(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_matches_spec_table() {
        assert_eq!(ErrorCode::Ok as i32, 0);
        assert_eq!(ErrorCode::InvalidPlayer as i32, -1);
        assert_eq!(ErrorCode::OpenFailed as i32, -2);
        assert_eq!(ErrorCode::NoVideoStream as i32, -3);
        assert_eq!(ErrorCode::NoAudioStream as i32, -4);
        assert_eq!(ErrorCode::CodecNotFound as i32, -5);
        assert_eq!(ErrorCode::CodecOpenFailed as i32, -6);
        assert_eq!(ErrorCode::DecodeFailed as i32, -7);
        assert_eq!(ErrorCode::SeekFailed as i32, -8);
        assert_eq!(ErrorCode::OutOfMemory as i32, -9);
        assert_eq!(ErrorCode::NotReady as i32, -10);
        assert_eq!(ErrorCode::InvalidParameter as i32, -11);
    }

    #[test]
    fn every_player_error_projects_to_its_code() {
        assert_eq!(PlayerError::NoVideoStream.code(), ErrorCode::NoVideoStream);
        assert_eq!(
            PlayerError::OpenFailed("x".into()).code(),
            ErrorCode::OpenFailed
        );
        assert_eq!(PlayerError::NotReady.code(), ErrorCode::NotReady);
    }

    #[test]
    fn long_messages_are_truncated_on_a_char_boundary() {
        let long = "é".repeat(200); // 2 bytes each, 400 bytes total
        let truncated = truncate_error_message(&long);
        assert!(truncated.len() <= MAX_ERROR_MESSAGE_LEN);
        assert!(long.starts_with(&truncated));
    }

    #[test]
    fn short_messages_are_untouched() {
        assert_eq!(truncate_error_message("short"), "short");
    }
}
