use serde::Serialize;

use crate::components::{Direction, PaddleId, Side};

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt: f32,     // Delta time in reference frames (1.0 = 16.67 ms)
    pub now_ms: f64, // Clock reading used for AI perception deadlines
}

impl Time {
    pub fn new(dt: f32, now_ms: f64) -> Self {
        Self { dt, now_ms }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt: 1.0,
            now_ms: 0.0,
        }
    }
}

/// Game score tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn has_winner(&self, win_score: u32) -> Option<Side> {
        if self.left >= win_score {
            Some(Side::Left)
        } else if self.right >= win_score {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::from_entropy())
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    WallHit,
    PaddleHit(PaddleId),
    /// `scorer` gained a point; the opposite side lost it
    PointScored { scorer: Side },
    MatchOver { winner: Side },
}

/// Events that occurred since the last clear
#[derive(Debug, Clone, Default)]
pub struct Events {
    events: Vec<GameEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn paddle_hits(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::PaddleHit(_)))
            .count()
    }

    pub fn wall_hits(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::WallHit))
            .count()
    }

    pub fn contains(&self, event: GameEvent) -> bool {
        self.events.contains(&event)
    }
}

/// Latest direction requested for each human paddle.
/// Written between ticks, consumed at the start of the next one.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    directions: [Direction; 4],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: PaddleId, dir: Direction) {
        if let Some(slot) = Self::slot(id) {
            self.directions[slot] = dir;
        }
    }

    pub fn get(&self, id: PaddleId) -> Direction {
        Self::slot(id)
            .map(|slot| self.directions[slot])
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.directions = [Direction::None; 4];
    }

    fn slot(id: PaddleId) -> Option<usize> {
        match id.0 {
            1..=4 => Some(id.0 as usize - 1),
            _ => None,
        }
    }
}

/// Tag-team bookkeeping: which paddle last hit the ball on each side.
/// The other paddle on that side is the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagTeam {
    pub enabled: bool,
    pub left_last_hit: PaddleId,
    pub right_last_hit: PaddleId,
}

impl Default for TagTeam {
    fn default() -> Self {
        Self {
            enabled: false,
            left_last_hit: PaddleId::P1,
            right_last_hit: PaddleId::P2,
        }
    }
}

impl TagTeam {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn last_hit(&self, side: Side) -> PaddleId {
        match side {
            Side::Left => self.left_last_hit,
            Side::Right => self.right_last_hit,
        }
    }

    /// Paddle that may currently block the ball on `side`
    pub fn active(&self, side: Side) -> PaddleId {
        self.last_hit(side).teammate()
    }

    pub fn is_disabled(&self, id: PaddleId) -> bool {
        self.enabled && self.last_hit(id.side()) == id
    }

    pub fn record_hit(&mut self, id: PaddleId) {
        if !self.enabled {
            return;
        }
        match id.side() {
            Side::Left => self.left_last_hit = id,
            Side::Right => self.right_last_hit = id,
        }
    }
}
