// crates/playback-core/src/state.rs
//
// Player lifecycle:
//
//   Idle --open()--> Opening --success--> Ready
//                            \--failure--> Error
//   Ready --play()--> Playing --pause()--> Paused --play()--> Playing
//   Playing --EOF, not loop--> EndOfFile
//   Playing|Paused --stop()--> Stopped
//   Stopped|Paused|Playing --seek(t)--> (same state, clock re-anchored)
//   any --close()--> Idle

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Opening,
    Ready,
    Playing,
    Paused,
    Stopped,
    EndOfFile,
    Error,
}

impl PlayerState {
    /// `play()` succeeds only from these states.
    pub fn can_play(self) -> bool {
        matches!(self, PlayerState::Ready | PlayerState::Paused | PlayerState::Stopped)
    }

    /// `pause()` succeeds only while Playing; pausing twice is a no-op, not
    /// a second transition, so callers should check `self == Playing`
    /// before invoking it if they want to distinguish the two.
    pub fn can_pause(self) -> bool {
        self == PlayerState::Playing
    }

    /// `stop()` succeeds from either running state.
    pub fn can_stop(self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }

    /// `seek()` is legal in any of these states for a VOD source; live
    /// sources reject seek regardless of state (checked separately).
    pub fn can_seek(self) -> bool {
        matches!(
            self,
            PlayerState::Playing | PlayerState::Paused | PlayerState::Stopped
        )
    }

    pub fn is_terminal_decode_state(self) -> bool {
        matches!(self, PlayerState::EndOfFile | PlayerState::Error | PlayerState::Stopped)
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_allowed_from_ready_paused_stopped_only() {
        assert!(PlayerState::Ready.can_play());
        assert!(PlayerState::Paused.can_play());
        assert!(PlayerState::Stopped.can_play());
        assert!(!PlayerState::Idle.can_play());
        assert!(!PlayerState::Opening.can_play());
        assert!(!PlayerState::Playing.can_play());
        assert!(!PlayerState::EndOfFile.can_play());
        assert!(!PlayerState::Error.can_play());
    }

    #[test]
    fn pause_allowed_only_from_playing() {
        assert!(PlayerState::Playing.can_pause());
        assert!(!PlayerState::Paused.can_pause());
        assert!(!PlayerState::Ready.can_pause());
    }

    #[test]
    fn stop_allowed_from_playing_or_paused() {
        assert!(PlayerState::Playing.can_stop());
        assert!(PlayerState::Paused.can_stop());
        assert!(!PlayerState::Ready.can_stop());
        assert!(!PlayerState::Stopped.can_stop());
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(PlayerState::default(), PlayerState::Idle);
    }
}
