use hecs::World;
use serde::Serialize;

use crate::match_state::MatchPhase;
use crate::systems::AiController;
use crate::{Ball, GameMode, Paddle, Score, Side};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaddleView {
    pub id: u8,
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vel_y: f32,
    /// Sitting out in tag-team play
    pub disabled: bool,
    pub ai: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
}

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: MatchPhase,
    pub mode: GameMode,
    pub score: Score,
    pub paddles: Vec<PaddleView>,
    pub ball: Option<BallView>,
    pub left_name: String,
    pub right_name: String,
    pub winner: Option<Side>,
}

impl Snapshot {
    pub(crate) fn capture(
        world: &World,
        phase: MatchPhase,
        mode: GameMode,
        score: Score,
        winner: Option<Side>,
        left_name: String,
        right_name: String,
    ) -> Self {
        let mut paddles: Vec<PaddleView> = world
            .query::<(&Paddle, Option<&AiController>)>()
            .iter()
            .map(|(_e, (p, ai))| PaddleView {
                id: p.id.0,
                side: p.side,
                x: p.pos.x,
                y: p.pos.y,
                width: p.width,
                height: p.height,
                vel_y: p.vel_y,
                disabled: p.disabled,
                ai: ai.is_some(),
            })
            .collect();
        paddles.sort_by_key(|p| p.id);

        let ball = world
            .query::<&Ball>()
            .iter()
            .next()
            .map(|(_e, b)| BallView {
                x: b.pos.x,
                y: b.pos.y,
                vx: b.vel.x,
                vy: b.vel.y,
                size: b.size,
            });

        Self {
            phase,
            mode,
            score,
            paddles,
            ball,
            left_name,
            right_name,
            winner,
        }
    }
}

/// Outcome handed back to a tournament or history collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub player1_name: String,
    pub player2_name: String,
    pub player1_score: u32,
    pub player2_score: u32,
    pub winner: String,
    /// "1 vs 1", "1 vs AI" or "multiplayer"
    pub match_type: String,
}
