//! Settings provided by the host application.
//!
//! Settings are loaded from TOML (or built in code), validated, and then
//! turned into a [`Config`](crate::Config) of derived physics constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::Params;

/// Named AI tiers. Each one maps to a fixed parameter bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Unbeatable,
}

impl Difficulty {
    /// Display label used in the AI player's name
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Unbeatable => "Unbeatable",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "unbeatable" => Ok(Difficulty::Unbeatable),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Which match variant is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum GameMode {
    #[default]
    Pvp,
    Pve,
    FourPlayerTeam,
}

impl GameMode {
    pub fn paddle_count(self) -> usize {
        match self {
            GameMode::Pvp | GameMode::Pve => 2,
            GameMode::FourPlayerTeam => 4,
        }
    }

    /// Match type label reported with a finished match
    pub fn match_type(self) -> &'static str {
        match self {
            GameMode::Pvp => "1 vs 1",
            GameMode::Pve => "1 vs AI",
            GameMode::FourPlayerTeam => "multiplayer",
        }
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pvp" => Ok(GameMode::Pvp),
            "pve" | "ai" => Ok(GameMode::Pve),
            "four_player_team" | "fourplayerteam" | "multiplayer" => Ok(GameMode::FourPlayerTeam),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for GameMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.match_type())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PaddleSize {
    Small,
    #[default]
    Normal,
    Large,
}

impl PaddleSize {
    pub fn multiplier(self) -> f32 {
        match self {
            PaddleSize::Small => 0.7,
            PaddleSize::Normal => 1.0,
            PaddleSize::Large => 1.5,
        }
    }
}

impl FromStr for PaddleSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(PaddleSize::Small),
            "normal" => Ok(PaddleSize::Normal),
            "large" => Ok(PaddleSize::Large),
            _ => Err(ConfigError::UnknownPaddleSize(s.to_string())),
        }
    }
}

impl TryFrom<String> for PaddleSize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Optional display names. Missing names fall back to mode defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerNames {
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub team1: Option<String>,
    pub team2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub points_to_win: i64,
    pub initial_ball_speed: f32,
    pub paddle_size: PaddleSize,
    pub ai_difficulty: Difficulty,
    pub mode: GameMode,
    pub player_names: PlayerNames,
    /// Fixed RNG seed for reproducible matches
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            points_to_win: Params::WIN_SCORE as i64,
            initial_ball_speed: Params::BALL_SPEED_INITIAL,
            paddle_size: PaddleSize::Normal,
            ai_difficulty: Difficulty::Medium,
            mode: GameMode::Pvp,
            player_names: PlayerNames::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.win_score()?;
        let speed = self.initial_ball_speed;
        if !speed.is_finite() || speed <= 0.0 || speed > Params::BALL_SPEED_MAX {
            return Err(ConfigError::InvalidBallSpeed {
                speed,
                max: Params::BALL_SPEED_MAX,
            });
        }
        Ok(())
    }

    /// Target score as the match counts it, in `1..=u32::MAX`.
    pub fn win_score(&self) -> Result<u32, ConfigError> {
        u32::try_from(self.points_to_win)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or(ConfigError::InvalidPointsToWin(self.points_to_win))
    }

    /// Names for (left, right) as shown on the scoreboard.
    pub fn resolved_names(&self) -> (String, String) {
        let names = &self.player_names;
        match self.mode {
            GameMode::Pvp => (
                names.player1.clone().unwrap_or_else(|| "Player 1".to_string()),
                names.player2.clone().unwrap_or_else(|| "Player 2".to_string()),
            ),
            GameMode::Pve => (
                names.player1.clone().unwrap_or_else(|| "Player 1".to_string()),
                format!("AI ({})", self.ai_difficulty.label()),
            ),
            GameMode::FourPlayerTeam => (
                names.team1.clone().unwrap_or_else(|| "Left Team".to_string()),
                names.team2.clone().unwrap_or_else(|| "Right Team".to_string()),
            ),
        }
    }
}
