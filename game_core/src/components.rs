use glam::Vec2;
use serde::Serialize;

use crate::config::Config;

/// Arena side a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign of a ball's horizontal velocity when it travels toward this side
    pub fn incoming_sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Paddle identifier: 1 and 3 defend the left side, 2 and 4 the right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PaddleId(pub u8);

impl PaddleId {
    pub const P1: PaddleId = PaddleId(1);
    pub const P2: PaddleId = PaddleId(2);
    pub const P3: PaddleId = PaddleId(3);
    pub const P4: PaddleId = PaddleId(4);

    pub fn side(self) -> Side {
        if self.0 % 2 == 1 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// The other paddle on the same side in team mode
    pub fn teammate(self) -> PaddleId {
        match self.0 {
            1 => PaddleId(3),
            3 => PaddleId(1),
            2 => PaddleId(4),
            4 => PaddleId(2),
            other => PaddleId(other),
        }
    }
}

/// Pressed movement direction. Up moves toward y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Direction {
    Up,
    Down,
    #[default]
    None,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
            Direction::None => 0.0,
        }
    }

    pub fn from_sign(sign: i8) -> Self {
        match sign {
            s if s < 0 => Direction::Up,
            s if s > 0 => Direction::Down,
            _ => Direction::None,
        }
    }

    /// Direction that moves `from` toward `to`
    pub fn toward(from: f32, to: f32) -> Self {
        if to > from {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

/// Paddle component. `pos` is the top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct Paddle {
    pub id: PaddleId,
    pub side: Side,
    pub pos: Vec2,
    pub vel_y: f32,
    pub width: f32,
    pub height: f32,
    /// Tag-team state: a disabled paddle does not block the ball
    pub disabled: bool,
}

impl Paddle {
    /// Paddle whose centre sits at `center_y` on its side of the arena
    pub fn new(id: PaddleId, center_y: f32, config: &Config) -> Self {
        let side = id.side();
        Self {
            id,
            side,
            pos: Vec2::new(
                config.paddle_x(side),
                config.clamp_paddle_y(center_y - config.paddle_height / 2.0),
            ),
            vel_y: 0.0,
            width: config.paddle_width,
            height: config.paddle_height,
            disabled: false,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.pos.y + self.height / 2.0
    }

    /// X coordinate of the face the ball strikes
    pub fn face_x(&self) -> f32 {
        match self.side {
            Side::Left => self.pos.x + self.width,
            Side::Right => self.pos.x,
        }
    }
}

/// Movement intent for a paddle, written by a human or the AI
#[derive(Debug, Clone, Copy, Default)]
pub struct PaddleInput {
    pub dir: Direction,
}

impl PaddleInput {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Ball component. `pos` is the top-left corner of its bounding square.
#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Position at the start of the current tick, for swept collision
    pub last_pos: Vec2,
    pub size: f32,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, size: f32) -> Self {
        Self {
            pos,
            vel,
            last_pos: pos,
            size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Reset ball to center with a random diagonal serve
    pub fn reset(&mut self, config: &Config, rng: &mut crate::GameRng) {
        use rand::Rng;
        let (speed_x, speed_y) = config.serve_speed();
        let sign_x = if rng.0.gen_bool(0.5) { 1.0 } else { -1.0 };
        let sign_y = if rng.0.gen_bool(0.5) { 1.0 } else { -1.0 };

        self.size = config.ball_size;
        self.pos = config.ball_spawn();
        self.last_pos = self.pos;
        self.vel = Vec2::new(sign_x * speed_x, sign_y * speed_y);
    }
}
