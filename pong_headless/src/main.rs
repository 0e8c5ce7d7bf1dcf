use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use game_core::{
    AudioCue, AudioSink, Direction, GameLoop, Match, PaddleId, Params, Settings, Side, SinkError,
    Snapshot,
};
use tracing_subscriber::EnvFilter;

/// Ten minutes of play at the reference frame rate
const MAX_FRAMES: u64 = 60 * 60 * 10;

/// Scripted "humans" chase the ball once it crosses into their half
const BOT_DEAD_ZONE: f32 = 20.0;

struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: AudioCue) -> Result<(), SinkError> {
        tracing::debug!(?cue, "audio cue");
        Ok(())
    }
}

fn load_settings(path: Option<&String>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let settings = Settings::from_toml_str(&text).with_context(|| format!("parsing {path}"))?;
    Ok(settings)
}

fn bot_direction(snapshot: &Snapshot, id: PaddleId) -> Direction {
    let (Some(ball), Some(paddle)) = (
        snapshot.ball.as_ref(),
        snapshot.paddles.iter().find(|p| p.id == id.0),
    ) else {
        return Direction::None;
    };

    let half = match paddle.side {
        Side::Left => ball.vx < 0.0,
        Side::Right => ball.vx > 0.0,
    };
    if !half || paddle.disabled {
        return Direction::None;
    }
    let diff = ball.y + ball.size / 2.0 - (paddle.y + paddle.height / 2.0);
    if diff.abs() <= BOT_DEAD_ZONE {
        Direction::None
    } else {
        Direction::toward(0.0, diff)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let settings = load_settings(args.get(1))?;
    let paddles = settings.mode.paddle_count() as u8;

    let game = Match::new(settings)?;
    let mut game_loop = GameLoop::new(game).with_audio(Box::new(LogAudio));
    game_loop.start()?;

    let mut now = 0.0;
    let mut frames = 0u64;
    loop {
        let snapshot = game_loop.game().snapshot();
        for n in 1..=paddles {
            let id = PaddleId(n);
            if game_loop.game().is_ai_controlled(id) {
                continue;
            }
            game_loop
                .game_mut()
                .set_direction(id, bot_direction(&snapshot, id))?;
        }

        if !game_loop.frame(now) {
            break;
        }
        now += Params::REFERENCE_FRAME_MS;
        frames += 1;
        if frames >= MAX_FRAMES {
            bail!("match still running after {frames} frames");
        }
    }

    let game = game_loop.into_match();
    let Some(result) = game.result() else {
        bail!("loop stopped before the match was over");
    };
    tracing::info!(frames, winner = %result.winner, "headless match finished");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
