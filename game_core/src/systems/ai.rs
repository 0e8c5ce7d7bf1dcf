//! AI opponent.
//!
//! The AI never moves its paddle directly. Each tick it picks a
//! [`Direction`] and writes it to the paddle's [`PaddleInput`], exactly as
//! a human's key press would, and the movement system does the rest.
//!
//! Its view of the ball is deliberately stale: the perceived position and
//! velocity are refreshed only once per `reaction_delay_ms`, and every
//! decision in between is made from that old sample.

use glam::Vec2;
use hecs::World;
use rand::Rng;

use crate::{Ball, Config, Difficulty, Direction, Paddle, PaddleId, PaddleInput, Params, Time};

/// Tuning knobs for one difficulty tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiProfile {
    /// Chance that a perception refresh misjudges the vertical velocity
    pub mistake_chance: f32,
    /// Targeting slack as a fraction of paddle height
    pub error_margin: f32,
    pub reaction_delay_ms: f64,
    /// Per-tick chance of pressing toward centre while returning
    pub return_to_middle_speed: f32,
    /// Chance, per refresh with the ball moving away, to start returning
    pub centering_probability: f32,
    pub prediction_accuracy: f32,
    /// Per-tick chance of shading toward the expected return point
    pub proactive_chance: f32,
}

impl AiProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                mistake_chance: 0.35,
                error_margin: 0.35,
                reaction_delay_ms: 1000.0,
                return_to_middle_speed: 0.05,
                centering_probability: 0.2,
                prediction_accuracy: 0.5,
                proactive_chance: 0.0,
            },
            Difficulty::Medium => Self {
                mistake_chance: 0.15,
                error_margin: 0.15,
                reaction_delay_ms: 1000.0,
                return_to_middle_speed: 0.3,
                centering_probability: 0.6,
                prediction_accuracy: 0.8,
                proactive_chance: 0.3,
            },
            Difficulty::Hard => Self {
                mistake_chance: 0.05,
                error_margin: 0.05,
                reaction_delay_ms: 1000.0,
                return_to_middle_speed: 0.7,
                centering_probability: 0.9,
                prediction_accuracy: 0.95,
                proactive_chance: 0.7,
            },
            Difficulty::Unbeatable => Self {
                mistake_chance: 0.0,
                error_margin: 0.02,
                reaction_delay_ms: 250.0,
                return_to_middle_speed: 0.9,
                centering_probability: 1.0,
                prediction_accuracy: 1.0,
                proactive_chance: 0.9,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Idle,
    Intercepting,
    ReturningToCenter,
    ProactiveAnticipation,
}

/// What the AI last saw of the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub last_sample_ms: f64,
}

/// AI component, attached to the paddle it drives
#[derive(Debug, Clone)]
pub struct AiController {
    difficulty: Difficulty,
    profile: AiProfile,
    perception: Option<Perception>,
    state: AiState,
    returning_to_center: bool,
}

impl AiController {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_profile(difficulty, AiProfile::for_difficulty(difficulty))
    }

    pub fn with_profile(difficulty: Difficulty, profile: AiProfile) -> Self {
        Self {
            difficulty,
            profile,
            perception: None,
            state: AiState::Idle,
            returning_to_center: false,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &AiProfile {
        &self.profile
    }

    pub fn perception(&self) -> Option<&Perception> {
        self.perception.as_ref()
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    /// Switch tier and forget everything seen so far
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        *self = Self::new(difficulty);
    }

    /// Forget the current perception, e.g. after a new serve
    pub fn reset(&mut self) {
        self.perception = None;
        self.state = AiState::Idle;
        self.returning_to_center = false;
    }

    /// Resample the ball if the reaction delay has elapsed
    fn refresh(&mut self, paddle: &Paddle, ball: &Ball, now_ms: f64, rng: &mut crate::GameRng) {
        let due = match &self.perception {
            None => true,
            Some(p) => now_ms - p.last_sample_ms > self.profile.reaction_delay_ms,
        };
        if !due {
            return;
        }

        let mut sample = Perception {
            ball_pos: ball.pos,
            ball_vel: ball.vel,
            last_sample_ms: now_ms,
        };
        let misjudged = rng.0.gen::<f32>() < self.profile.mistake_chance;
        if misjudged {
            sample.ball_vel.y *= rng.0.gen_range(-0.8f32..=-0.4);
        }

        let moving_away = sample.ball_vel.x * paddle.side.incoming_sign() < 0.0;
        if moving_away && rng.0.gen::<f32>() < self.profile.centering_probability {
            self.returning_to_center = true;
        }

        tracing::trace!(
            paddle = paddle.id.0,
            x = sample.ball_pos.x,
            y = sample.ball_pos.y,
            misjudged,
            "AI perception refreshed"
        );
        self.perception = Some(sample);
    }

    /// Choose this tick's simulated key press for `paddle`
    pub fn decide(
        &mut self,
        paddle: &Paddle,
        ball: &Ball,
        config: &Config,
        now_ms: f64,
        rng: &mut crate::GameRng,
    ) -> Direction {
        let toward = paddle.side.incoming_sign();

        // Ball heads away while we still think it is coming: we just hit it
        if let Some(p) = &self.perception {
            if ball.vel.x * toward < 0.0 && p.ball_vel.x * toward > 0.0 {
                self.returning_to_center = true;
            }
        }

        self.refresh(paddle, ball, now_ms, rng);
        let Some(seen) = self.perception else {
            return Direction::None;
        };

        let approach = seen.ball_vel.x * toward;
        if approach > 0.0 {
            self.intercept(paddle, &seen, ball.size, config, rng)
        } else if approach < 0.0 {
            self.recover(paddle, &seen, ball.size, config, rng)
        } else {
            self.state = AiState::Idle;
            Direction::None
        }
    }

    fn intercept(
        &mut self,
        paddle: &Paddle,
        seen: &Perception,
        ball_size: f32,
        config: &Config,
        rng: &mut crate::GameRng,
    ) -> Direction {
        self.state = AiState::Intercepting;
        self.returning_to_center = false;

        let distance = match paddle.side {
            crate::Side::Right => paddle.face_x() - ball_size - seen.ball_pos.x,
            crate::Side::Left => seen.ball_pos.x - paddle.face_x(),
        }
        .max(Params::EPSILON);
        let time_to_impact = distance / seen.ball_vel.x.abs().max(Params::EPSILON);

        let mut predicted = predict_ball_y(
            seen.ball_pos.y,
            seen.ball_vel.y,
            time_to_impact,
            config.ball_max_y(),
        );

        let accuracy = self.profile.prediction_accuracy;
        if rng.0.gen::<f32>() > accuracy {
            let error = (1.0 - accuracy) * config.arena_height * Params::AI_PREDICTION_ERROR_SCALE;
            predicted += rng.0.gen_range(-1.0f32..=1.0) * error;
        }

        // Slack shrinks as the ball closes in
        let distance_factor = (distance / config.arena_width).min(1.0);
        let margin = paddle.height
            * self.profile.error_margin
            * (Params::AI_MIN_MARGIN_FACTOR + (1.0 - Params::AI_MIN_MARGIN_FACTOR) * distance_factor);

        let difference = predicted + ball_size / 2.0 - paddle.center_y();
        if difference.abs() > margin {
            Direction::toward(0.0, difference)
        } else {
            Direction::None
        }
    }

    fn recover(
        &mut self,
        paddle: &Paddle,
        seen: &Perception,
        ball_size: f32,
        config: &Config,
        rng: &mut crate::GameRng,
    ) -> Direction {
        let mut key = Direction::None;
        let center = config.arena_height / 2.0;
        let paddle_center = paddle.center_y();

        if self.returning_to_center {
            if (paddle_center - center).abs() <= Params::AI_CENTER_TOLERANCE {
                self.returning_to_center = false;
                self.state = AiState::Idle;
            } else {
                self.state = AiState::ReturningToCenter;
                if rng.0.gen::<f32>() < self.profile.return_to_middle_speed {
                    key = Direction::toward(paddle_center, center);
                }
            }
        } else {
            self.state = AiState::Idle;
        }

        if key == Direction::None
            && self.profile.proactive_chance > 0.0
            && rng.0.gen::<f32>() < self.profile.proactive_chance
        {
            let frames = config.arena_width / seen.ball_vel.x.abs().max(1.0);
            let expected = (seen.ball_pos.y + seen.ball_vel.y * frames).clamp(0.0, config.ball_max_y());
            let diff = expected + ball_size / 2.0 - paddle_center;
            if diff.abs() > config.arena_height * Params::AI_PROACTIVE_MIN_SHIFT_RATIO {
                key = Direction::toward(0.0, diff);
                self.state = AiState::ProactiveAnticipation;
            }
        }
        key
    }
}

/// Vertical position of the ball top after `time` frames, folded back into
/// `[0, max_y]` by up to a few wall reflections.
pub fn predict_ball_y(y: f32, vel_y: f32, time: f32, max_y: f32) -> f32 {
    if max_y <= 0.0 {
        return 0.0;
    }
    let mut predicted = y + vel_y * time;
    if !predicted.is_finite() {
        return max_y / 2.0;
    }
    for _ in 0..Params::AI_MAX_PREDICTED_BOUNCES {
        if predicted < 0.0 {
            predicted = -predicted;
        } else if predicted > max_y {
            predicted = 2.0 * max_y - predicted;
        } else {
            break;
        }
    }
    predicted.clamp(0.0, max_y)
}

/// Let every AI-driven paddle choose its key press for this tick
pub fn update_ai(world: &mut World, config: &Config, time: &Time, rng: &mut crate::GameRng) {
    let ball = {
        let mut ball_query = world.query::<&Ball>();
        match ball_query.iter().next() {
            Some((_e, ball)) => *ball,
            None => return,
        }
    };

    for (_entity, (paddle, input, ai)) in
        world.query_mut::<(&Paddle, &mut PaddleInput, &mut AiController)>()
    {
        input.dir = ai.decide(paddle, &ball, config, time.now_ms, rng);
    }
}

/// Current perception of the AI driving `id`, if any
pub fn ai_perception(world: &World, id: PaddleId) -> Option<Perception> {
    world
        .query::<(&Paddle, &AiController)>()
        .iter()
        .find(|(_e, (p, _))| p.id == id)
        .and_then(|(_e, (_, ai))| ai.perception().copied())
}
