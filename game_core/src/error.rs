use thiserror::Error;

use crate::match_state::{MatchAction, MatchPhase};

/// Rejected settings. Raised when settings are parsed or applied.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("points to win must be between 1 and 4294967295, got {0}")]
    InvalidPointsToWin(i64),

    #[error("initial ball speed must be in (0, {max}], got {speed}")]
    InvalidBallSpeed { speed: f32, max: f32 },

    #[error("unknown AI difficulty '{0}' (expected easy, medium, hard or unbeatable)")]
    UnknownDifficulty(String),

    #[error("unknown game mode '{0}' (expected pvp, pve or four_player_team)")]
    UnknownMode(String),

    #[error("unknown paddle size '{0}' (expected small, normal or large)")]
    UnknownPaddleSize(String),

    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("cannot {action:?} while {from:?}")]
    InvalidTransition { from: MatchPhase, action: MatchAction },

    #[error("game mode can only change while idle (currently {0:?})")]
    ModeLocked(MatchPhase),

    #[error("settings can only be applied while idle (currently {0:?})")]
    SettingsLocked(MatchPhase),

    #[error("no paddle with id {0} in this mode")]
    UnknownPaddle(u8),

    #[error("paddle {0} is driven by the AI")]
    NotHumanControlled(u8),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure reported by a renderer or audio collaborator.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("{0} unavailable")]
    Unavailable(String),
}
