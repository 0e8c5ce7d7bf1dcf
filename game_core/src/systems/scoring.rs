use crate::{Ball, Config, Events, GameEvent, GameRng, Score, Side};
use hecs::World;

/// Check if ball left the arena. Returns the side that scored.
pub fn check_scoring(world: &mut World, config: &Config, score: &mut Score, events: &mut Events) -> Option<Side> {
    let mut scorer = None;
    for (_entity, ball) in world.query::<&Ball>().iter() {
        if ball.pos.x <= 0.0 {
            scorer = Some(Side::Right);
        } else if ball.pos.x + ball.size >= config.arena_width {
            scorer = Some(Side::Left);
        }
    }

    if let Some(side) = scorer {
        score.increment(side);
        events.push(GameEvent::PointScored { scorer: side });
    }
    scorer
}

/// Put the ball back in the centre with a fresh random serve
pub fn serve_ball(world: &mut World, config: &Config, rng: &mut GameRng) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        ball.reset(config, rng);
    }
}
