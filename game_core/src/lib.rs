pub mod components;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod keyboard;
pub mod match_state;
pub mod params;
pub mod resources;
pub mod settings;
pub mod snapshot;
pub mod systems;

pub use components::*;
pub use config::*;
pub use error::*;
pub use game_loop::*;
pub use keyboard::*;
pub use match_state::*;
pub use params::*;
pub use resources::*;
pub use settings::*;
pub use snapshot::*;

use hecs::World;
use systems::*;

/// Run the deterministic Pong simulation for `time.dt` reference frames.
///
/// Returns the side that scored, if any. Stepping stops at the first point
/// so the caller can serve before the ball moves again.
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut World,
    time: &Time,
    config: &Config,
    score: &mut Score,
    tag_team: &mut TagTeam,
    input: &InputState,
    events: &mut Events,
    rng: &mut GameRng,
) -> Option<Side> {
    // Clamp dt to prevent large jumps
    let clamped_dt = time.dt.clamp(0.0, Params::MAX_DT);

    // Fixed micro-steps for stable physics
    let mut remaining_dt = clamped_dt;
    while remaining_dt > 0.0 {
        let step_dt = remaining_dt.min(Params::FIXED_DT);
        remaining_dt -= step_dt;

        let step_time = Time {
            dt: step_dt,
            now_ms: time.now_ms,
        };

        // 1. Human key state onto paddle inputs
        ingest_inputs(world, input);

        // 2. AI picks its simulated key press
        update_ai(world, config, &step_time, rng);

        // 3. Move paddles based on inputs
        move_paddles(world, &step_time, config);

        // 4. Move ball, bouncing off the walls
        move_ball(world, &step_time, config, rng, events);

        // 5. Ball vs paddles
        check_collisions(world, config, tag_team, rng, events);

        // 6. Ball left the arena
        if let Some(scorer) = check_scoring(world, config, score, events) {
            return Some(scorer);
        }
    }
    None
}

/// Helper to create a paddle entity
pub fn create_paddle(world: &mut World, id: PaddleId, center_y: f32, config: &Config) -> hecs::Entity {
    world.spawn((Paddle::new(id, center_y, config), PaddleInput::new()))
}

/// Helper to create the ball entity
pub fn create_ball(world: &mut World, pos: glam::Vec2, vel: glam::Vec2, config: &Config) -> hecs::Entity {
    world.spawn((Ball::new(pos, vel, config.ball_size),))
}
