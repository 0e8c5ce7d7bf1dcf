//! Frame-driven game loop.
//!
//! The host calls [`GameLoop::frame`] from its per-frame callback with a
//! millisecond timestamp and keeps requesting frames while it returns
//! `true`. Elapsed time is normalised to reference frames before it reaches
//! the simulation, so play speed does not depend on the display rate.

use tracing::{debug, info};

use crate::error::{MatchError, SinkError};
use crate::match_state::{Match, MatchPhase};
use crate::snapshot::Snapshot;
use crate::{GameEvent, Params};

/// Discrete sound cue. Fire and forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    WallHit,
    PaddleHit,
    PointLost,
}

impl AudioCue {
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::WallHit => Some(AudioCue::WallHit),
            GameEvent::PaddleHit(_) => Some(AudioCue::PaddleHit),
            GameEvent::PointScored { .. } => Some(AudioCue::PointLost),
            GameEvent::MatchOver { .. } => None,
        }
    }
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), SinkError>;
}

pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), SinkError>;
}

/// Converts host timestamps into frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last timestamp so the next frame starts from zero
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Reference frames elapsed since the previous call
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / Params::REFERENCE_FRAME_MS).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt as f32
    }
}

pub struct GameLoop {
    game: Match,
    clock: FrameClock,
    running: bool,
    audio: Option<Box<dyn AudioSink>>,
    renderer: Option<Box<dyn Renderer>>,
}

impl GameLoop {
    pub fn new(game: Match) -> Self {
        Self {
            game,
            clock: FrameClock::new(),
            running: false,
            audio: None,
            renderer: None,
        }
    }

    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = Some(sink);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn start(&mut self) -> Result<(), MatchError> {
        self.game.start()?;
        self.clock.reset();
        self.running = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), MatchError> {
        self.game.pause()?;
        self.running = false;
        Ok(())
    }

    /// Continue after a pause. Time spent paused is not simulated.
    pub fn resume(&mut self) -> Result<(), MatchError> {
        self.game.resume()?;
        self.clock.reset();
        self.running = true;
        Ok(())
    }

    /// Stop requesting frames. The match itself is left as it is.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one frame. Returns whether another frame should be requested.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }

        let dt = self.clock.delta(now_ms);
        let cues: Vec<AudioCue> = self
            .game
            .tick(dt, now_ms)
            .iter()
            .filter_map(AudioCue::from_event)
            .collect();

        if let Some(audio) = self.audio.as_mut() {
            for cue in cues {
                if let Err(err) = audio.play(cue) {
                    debug!(%err, ?cue, "audio cue dropped");
                }
            }
        }

        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(err) = renderer.render(&self.game.snapshot()) {
                debug!(%err, "frame not rendered");
            }
        }

        if self.game.phase() == MatchPhase::Over {
            info!("game loop finished");
            self.running = false;
        }
        self.running
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Match {
        &mut self.game
    }

    pub fn into_match(self) -> Match {
        self.game
    }
}
