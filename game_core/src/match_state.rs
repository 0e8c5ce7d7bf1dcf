//! Match State Machine
//!
//! [`MatchFsm`] is the transition table for a single match. [`Match`] owns
//! the ECS world, score and randomness for that match and exposes every
//! mutation through methods, so the phase rules below always hold:
//!
//! - mode and settings change only while `Idle`
//! - the score changes only while `Running`
//! - `Over` is entered at most once per match and is left only by `reset`

use glam::Vec2;
use hecs::World;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::MatchError;
use crate::snapshot::{MatchResult, Snapshot};
use crate::systems::{ai_perception, serve_ball, sync_tag_team, AiController, Perception};
use crate::{
    create_ball, create_paddle, step, Ball, Config, Difficulty, Direction, Events, GameEvent,
    GameMode, GameRng, InputState, PaddleId, Score, Settings, Side, TagTeam, Time,
};

/// Match phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Idle,
    Running,
    Paused,
    /// Transient: a point was just scored, the ball is about to be served
    PointScored,
    Over,
}

/// Actions that trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    Start,
    Pause,
    Resume,
    Score,
    Serve,
    Finish,
    Reset,
}

/// Match Finite State Machine
#[derive(Debug, Clone)]
pub struct MatchFsm {
    phase: MatchPhase,
}

impl MatchFsm {
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::Idle,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Check if a transition is valid
    pub fn can_transition(&self, action: MatchAction) -> bool {
        self.next_phase(action).is_some()
    }

    /// Attempt a transition, returning the new phase
    pub fn transition(&mut self, action: MatchAction) -> Result<MatchPhase, MatchError> {
        let from = self.phase;
        match self.next_phase(action) {
            Some(next) => {
                self.phase = next;
                debug!(?from, to = ?next, ?action, "match transition");
                Ok(next)
            }
            None => Err(MatchError::InvalidTransition { from, action }),
        }
    }

    fn next_phase(&self, action: MatchAction) -> Option<MatchPhase> {
        match (self.phase, action) {
            (_, MatchAction::Reset) => Some(MatchPhase::Idle),

            (MatchPhase::Idle, MatchAction::Start) => Some(MatchPhase::Running),

            (MatchPhase::Running, MatchAction::Pause) => Some(MatchPhase::Paused),
            (MatchPhase::Running, MatchAction::Score) => Some(MatchPhase::PointScored),

            (MatchPhase::Paused, MatchAction::Resume) => Some(MatchPhase::Running),

            (MatchPhase::PointScored, MatchAction::Serve) => Some(MatchPhase::Running),
            (MatchPhase::PointScored, MatchAction::Finish) => Some(MatchPhase::Over),

            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::Over
    }
}

impl Default for MatchFsm {
    fn default() -> Self {
        Self::new()
    }
}

/// One match: paddles, ball, score and the phase machine driving them
pub struct Match {
    world: World,
    config: Config,
    settings: Settings,
    fsm: MatchFsm,
    score: Score,
    tag_team: TagTeam,
    input: InputState,
    events: Events,
    rng: GameRng,
    winner: Option<Side>,
}

impl Match {
    /// Build an idle match with a served (not yet moving) ball.
    pub fn new(settings: Settings) -> Result<Self, MatchError> {
        settings.validate()?;
        let config = Config::from_settings(&settings)?;
        let rng = match settings.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let mut game = Self {
            world: World::new(),
            config,
            tag_team: TagTeam::new(settings.mode == GameMode::FourPlayerTeam),
            settings,
            fsm: MatchFsm::new(),
            score: Score::new(),
            input: InputState::new(),
            events: Events::new(),
            rng,
            winner: None,
        };
        game.spawn_entities();
        Ok(game)
    }

    /// Re-create paddles and ball for the current mode and config
    fn spawn_entities(&mut self) {
        self.world.clear();
        let h = self.config.arena_height;
        let mode = self.settings.mode;

        let layout: &[(PaddleId, f32)] = match mode {
            GameMode::Pvp | GameMode::Pve => &[(PaddleId::P1, 0.5), (PaddleId::P2, 0.5)],
            GameMode::FourPlayerTeam => &[
                (PaddleId::P1, 0.75),
                (PaddleId::P2, 0.25),
                (PaddleId::P3, 0.25),
                (PaddleId::P4, 0.75),
            ],
        };
        for &(id, at) in layout {
            let entity = create_paddle(&mut self.world, id, h * at, &self.config);
            if mode == GameMode::Pve && id == PaddleId::P2 {
                let ai = AiController::new(self.settings.ai_difficulty);
                if let Err(err) = self.world.insert_one(entity, ai) {
                    warn!(%err, "failed to attach AI controller");
                }
            }
        }

        self.tag_team = TagTeam::new(mode == GameMode::FourPlayerTeam);
        sync_tag_team(&mut self.world, &self.tag_team);

        create_ball(&mut self.world, self.config.ball_spawn(), Vec2::ZERO, &self.config);
        serve_ball(&mut self.world, &self.config, &mut self.rng);
    }

    fn ball(&self) -> Option<Ball> {
        let mut query = self.world.query::<&Ball>();
        let ball = query.iter().next().map(|(_e, b)| *b);
        ball
    }

    fn advance(&mut self, action: MatchAction) {
        if let Err(err) = self.fsm.transition(action) {
            warn!(%err, "unexpected match transition");
        }
    }

    /// Switch between 1v1, vs-AI and four-player team play. Idle only.
    pub fn set_mode(&mut self, mode: GameMode) -> Result<(), MatchError> {
        let phase = self.fsm.phase();
        if phase != MatchPhase::Idle {
            return Err(MatchError::ModeLocked(phase));
        }
        self.settings.mode = mode;
        self.score = Score::new();
        self.winner = None;
        self.input.clear();
        self.spawn_entities();
        info!(%mode, "game mode changed");
        Ok(())
    }

    /// Apply new settings. Idle only.
    ///
    /// Every derived constant is recomputed; the served ball keeps the
    /// signs of its velocity and takes the new speed magnitudes.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), MatchError> {
        let phase = self.fsm.phase();
        if phase != MatchPhase::Idle {
            return Err(MatchError::SettingsLocked(phase));
        }
        settings.validate()?;
        let config = Config::from_settings(&settings)?;

        let signs = self.ball().map(|b| (b.vel.x.signum(), b.vel.y.signum()));
        if let Some(seed) = settings.seed {
            if self.settings.seed != Some(seed) {
                self.rng = GameRng::new(seed);
            }
        }
        self.config = config;
        self.settings = settings;
        self.score = Score::new();
        self.winner = None;
        self.spawn_entities();

        if let Some((sx, sy)) = signs {
            let (vx, vy) = self.config.serve_speed();
            for (_entity, ball) in self.world.query_mut::<&mut Ball>() {
                ball.vel = Vec2::new(sx * vx, sy * vy);
            }
        }
        info!(
            mode = %self.settings.mode,
            points_to_win = self.config.win_score,
            ball_speed = self.config.ball_speed_initial,
            "settings applied"
        );
        Ok(())
    }

    /// Change the AI tier. Any existing perception is discarded.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.ai_difficulty = difficulty;
        for (_entity, ai) in self.world.query_mut::<&mut AiController>() {
            ai.set_difficulty(difficulty);
        }
        info!(difficulty = difficulty.label(), "AI difficulty changed");
    }

    /// Names supplied by a tournament or lobby. In team mode they name the
    /// two teams.
    pub fn set_player_names(&mut self, left: impl Into<String>, right: impl Into<String>) {
        let names = &mut self.settings.player_names;
        match self.settings.mode {
            GameMode::FourPlayerTeam => {
                names.team1 = Some(left.into());
                names.team2 = Some(right.into());
            }
            _ => {
                names.player1 = Some(left.into());
                names.player2 = Some(right.into());
            }
        }
    }

    pub fn start(&mut self) -> Result<(), MatchError> {
        self.fsm.transition(MatchAction::Start)?;
        let (left, right) = self.settings.resolved_names();
        info!(mode = %self.settings.mode, %left, %right, "match started");
        Ok(())
    }

    /// Freeze the match. Ball and paddle state are kept as they are.
    pub fn pause(&mut self) -> Result<(), MatchError> {
        self.fsm.transition(MatchAction::Pause)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), MatchError> {
        self.fsm.transition(MatchAction::Resume)?;
        Ok(())
    }

    /// Back to `Idle` with zero score and freshly placed paddles and ball
    pub fn reset(&mut self) {
        self.advance(MatchAction::Reset);
        self.score = Score::new();
        self.winner = None;
        self.input.clear();
        self.events.clear();
        self.spawn_entities();
        debug!("match reset");
    }

    /// Record the pressed direction for a human paddle.
    /// Takes effect at the start of the next tick.
    pub fn set_direction(&mut self, id: PaddleId, dir: Direction) -> Result<(), MatchError> {
        if id.0 == 0 || id.0 as usize > self.settings.mode.paddle_count() {
            return Err(MatchError::UnknownPaddle(id.0));
        }
        if self.is_ai_controlled(id) {
            return Err(MatchError::NotHumanControlled(id.0));
        }
        self.input.set(id, dir);
        Ok(())
    }

    pub fn is_ai_controlled(&self, id: PaddleId) -> bool {
        self.settings.mode == GameMode::Pve && id == PaddleId::P2
    }

    /// Advance the simulation by `dt` reference frames.
    ///
    /// Does nothing unless the match is running. Returns the events of
    /// this tick.
    pub fn tick(&mut self, dt: f32, now_ms: f64) -> &Events {
        self.events.clear();
        if !self.fsm.is_running() {
            return &self.events;
        }

        let time = Time::new(dt, now_ms);
        let point = step(
            &mut self.world,
            &time,
            &self.config,
            &mut self.score,
            &mut self.tag_team,
            &self.input,
            &mut self.events,
            &mut self.rng,
        );

        if let Some(scorer) = point {
            self.advance(MatchAction::Score);
            debug!(
                ?scorer,
                left = self.score.left,
                right = self.score.right,
                "point scored"
            );
            if let Some(winner) = self.score.has_winner(self.config.win_score) {
                self.advance(MatchAction::Finish);
                self.winner = Some(winner);
                self.events.push(GameEvent::MatchOver { winner });
                info!(
                    ?winner,
                    name = %self.winner_name().unwrap_or_default(),
                    left = self.score.left,
                    right = self.score.right,
                    "match over"
                );
            } else {
                serve_ball(&mut self.world, &self.config, &mut self.rng);
                for (_entity, ai) in self.world.query_mut::<&mut AiController>() {
                    ai.reset();
                }
                self.advance(MatchAction::Serve);
            }
        }
        &self.events
    }

    /// Read-only view for a renderer
    pub fn snapshot(&self) -> Snapshot {
        let (left_name, right_name) = self.settings.resolved_names();
        Snapshot::capture(
            &self.world,
            self.fsm.phase(),
            self.settings.mode,
            self.score,
            self.winner,
            left_name,
            right_name,
        )
    }

    pub fn phase(&self) -> MatchPhase {
        self.fsm.phase()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn winner_name(&self) -> Option<String> {
        let (left, right) = self.settings.resolved_names();
        self.winner.map(|side| match side {
            Side::Left => left,
            Side::Right => right,
        })
    }

    /// Outcome record, available once the match is over
    pub fn result(&self) -> Option<MatchResult> {
        let winner = self.winner_name()?;
        let (player1_name, player2_name) = self.settings.resolved_names();
        Some(MatchResult {
            player1_name,
            player2_name,
            player1_score: self.score.left,
            player2_score: self.score.right,
            winner,
            match_type: self.settings.mode.match_type().to_string(),
        })
    }

    pub fn ai_perception(&self, id: PaddleId) -> Option<Perception> {
        ai_perception(&self.world, id)
    }

    pub fn mode(&self) -> GameMode {
        self.settings.mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tag_team(&self) -> &TagTeam {
        &self.tag_team
    }
}
