use crate::error::ConfigError;
use crate::components::Side;
use crate::params::Params;
use crate::settings::Settings;

/// Physics constants derived from [`Settings`]
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub arena_width: f32,
    pub arena_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_max_speed: f32,
    pub paddle_acceleration: f32,
    pub paddle_deceleration: f32,
    pub ball_size: f32,
    pub ball_speed_initial: f32,
    pub ball_speed_max: f32,
    pub ball_speed_increase: f32,
    pub win_score: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_width: Params::ARENA_WIDTH,
            arena_height: Params::ARENA_HEIGHT,
            paddle_width: Params::PADDLE_WIDTH,
            paddle_height: Params::ARENA_HEIGHT * Params::PADDLE_HEIGHT_RATIO,
            paddle_max_speed: Params::PADDLE_MAX_SPEED,
            paddle_acceleration: Params::PADDLE_ACCELERATION,
            paddle_deceleration: Params::PADDLE_DECELERATION,
            ball_size: Params::BALL_SIZE,
            ball_speed_initial: Params::BALL_SPEED_INITIAL,
            ball_speed_max: Params::BALL_SPEED_MAX,
            ball_speed_increase: Params::BALL_SPEED_INCREASE,
            win_score: Params::WIN_SCORE,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derive every dependent constant from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let base = Self::default();
        Ok(Self {
            paddle_height: base.arena_height
                * Params::PADDLE_HEIGHT_RATIO
                * settings.paddle_size.multiplier(),
            ball_speed_initial: settings.initial_ball_speed,
            win_score: settings.win_score()?,
            ..base
        })
    }

    /// Serve speeds as (horizontal, vertical) magnitudes
    pub fn serve_speed(&self) -> (f32, f32) {
        (
            self.ball_speed_initial,
            self.ball_speed_initial * Params::SERVE_VERTICAL_RATIO,
        )
    }

    /// Left edge X of a paddle on the given side
    pub fn paddle_x(&self, side: Side) -> f32 {
        match side {
            Side::Left => 0.0,
            Side::Right => self.arena_width - self.paddle_width,
        }
    }

    /// Largest valid paddle top
    pub fn paddle_max_y(&self) -> f32 {
        (self.arena_height - self.paddle_height).max(0.0)
    }

    /// Clamp paddle top to arena bounds
    pub fn clamp_paddle_y(&self, y: f32) -> f32 {
        y.clamp(0.0, self.paddle_max_y())
    }

    /// Largest valid ball top
    pub fn ball_max_y(&self) -> f32 {
        (self.arena_height - self.ball_size).max(0.0)
    }

    /// Top-left position that centres the ball in the arena
    pub fn ball_spawn(&self) -> glam::Vec2 {
        glam::Vec2::new(
            (self.arena_width - self.ball_size) / 2.0,
            (self.arena_height - self.ball_size) / 2.0,
        )
    }
}
