use serde::{Deserialize, Serialize};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    #[default]
    Idle,
    Calibrating,
    Countdown,
    Playing,
    Paused,
    GameOver,
}

/// Requested lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Pattern (re)load: any state returns to idle
    Reset,
    BeginCountdown,
    Start,
    Pause,
    Stop,
    Resume,
    /// All notes finalized
    Complete,
    BeginCalibration,
    EndCalibration,
}

impl GameState {
    /// Target state for `transition`, or `None` if it is not valid from here.
    pub fn next(self, transition: Transition) -> Option<GameState> {
        use GameState::*;
        match (self, transition) {
            (_, Transition::Reset) => Some(Idle),
            (Idle, Transition::BeginCountdown) => Some(Countdown),
            (Idle | Countdown, Transition::Start) => Some(Playing),
            (Playing, Transition::Pause | Transition::Stop) => Some(Paused),
            (Paused, Transition::Resume) => Some(Playing),
            (Playing, Transition::Complete) => Some(GameOver),
            (Idle, Transition::BeginCalibration) => Some(Calibrating),
            (Calibrating, Transition::EndCalibration) => Some(Idle),
            _ => None,
        }
    }

    pub fn is_playing(self) -> bool {
        self == GameState::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [GameState; 6] = [
        GameState::Idle,
        GameState::Calibrating,
        GameState::Countdown,
        GameState::Playing,
        GameState::Paused,
        GameState::GameOver,
    ];

    #[test]
    fn reset_from_any_state() {
        for state in ALL_STATES {
            assert_eq!(state.next(Transition::Reset), Some(GameState::Idle));
        }
    }

    #[test]
    fn play_pause_resume_cycle() {
        let playing = GameState::Idle.next(Transition::Start).unwrap();
        assert_eq!(playing, GameState::Playing);
        let paused = playing.next(Transition::Pause).unwrap();
        assert_eq!(paused, GameState::Paused);
        assert_eq!(paused.next(Transition::Resume), Some(GameState::Playing));
        assert_eq!(playing.next(Transition::Stop), Some(GameState::Paused));
    }

    #[test]
    fn countdown_then_start() {
        let countdown = GameState::Idle.next(Transition::BeginCountdown).unwrap();
        assert_eq!(countdown.next(Transition::Start), Some(GameState::Playing));
        assert_eq!(countdown.next(Transition::Pause), None);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        assert_eq!(GameState::Idle.next(Transition::Pause), None);
        assert_eq!(GameState::Idle.next(Transition::Resume), None);
        assert_eq!(GameState::Paused.next(Transition::Pause), None);
        assert_eq!(GameState::Paused.next(Transition::Complete), None);
        assert_eq!(GameState::GameOver.next(Transition::Start), None);
        assert_eq!(GameState::Playing.next(Transition::Start), None);
        assert_eq!(GameState::Playing.next(Transition::BeginCalibration), None);
    }

    #[test]
    fn only_playing_completes() {
        for state in ALL_STATES {
            let expected = (state == GameState::Playing).then_some(GameState::GameOver);
            assert_eq!(state.next(Transition::Complete), expected);
        }
    }

    #[test]
    fn calibration_round_trip() {
        let calibrating = GameState::Idle.next(Transition::BeginCalibration).unwrap();
        assert_eq!(calibrating, GameState::Calibrating);
        assert_eq!(calibrating.next(Transition::Start), None);
        assert_eq!(
            calibrating.next(Transition::EndCalibration),
            Some(GameState::Idle)
        );
    }

    #[test]
    fn serializes_screaming_snake_case() {
        let json = serde_json::to_string(&GameState::GameOver).unwrap();
        assert_eq!(json, "\"GAME_OVER\"");
    }
}
