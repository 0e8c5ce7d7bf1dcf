use crate::{Ball, Config, Events, GameEvent, GameRng, Paddle, PaddleId, Params, Side, TagTeam};
use hecs::World;
use rand::Rng;

/// Whether the ball struck `paddle` during the last tick.
///
/// The swept test follows the ball's leading edge from `last_pos` to `pos`
/// and, if it crossed the paddle face, interpolates the ball's height at the
/// crossing. Only when the face was not crossed does the end-of-tick overlap
/// test (with a small tolerance) run.
pub fn paddle_contact(ball: &Ball, paddle: &Paddle) -> bool {
    let face = paddle.face_x();
    let size = ball.size;
    let top = paddle.pos.y;
    let bottom = paddle.pos.y + paddle.height;

    let (prev_lead, cur_lead, crossed) = match paddle.side {
        Side::Left => {
            let (prev, cur) = (ball.last_pos.x, ball.pos.x);
            (prev, cur, prev > face && cur <= face)
        }
        Side::Right => {
            let (prev, cur) = (ball.last_pos.x + size, ball.pos.x + size);
            (prev, cur, prev < face && cur >= face)
        }
    };

    if crossed {
        // Strict crossing keeps the denominator non-zero
        let ratio = (face - prev_lead) / (cur_lead - prev_lead);
        let y = ball.last_pos.y + ratio * (ball.pos.y - ball.last_pos.y);
        return y + size >= top && y <= bottom;
    }

    let tol = Params::COLLISION_TOLERANCE;
    let overlaps_x = match paddle.side {
        Side::Left => ball.pos.x <= face + tol && ball.pos.x + size >= paddle.pos.x,
        Side::Right => ball.pos.x + size >= face - tol && ball.pos.x <= paddle.pos.x + paddle.width,
    };
    overlaps_x && ball.pos.y + size >= top - tol && ball.pos.y <= bottom + tol
}

/// Send the ball back from `paddle`, deflecting by where it was struck.
///
/// The deflection is at most 45 degrees from horizontal and the new speed
/// is the old speed times the increase factor, capped at the maximum.
pub fn resolve_bounce(ball: &mut Ball, paddle: &Paddle, config: &Config, rng: &mut GameRng) {
    let half_height = (paddle.height / 2.0).max(Params::EPSILON);
    let offset = ((ball.center().y - paddle.center_y()) / half_height).clamp(-1.0, 1.0);
    let angle = offset * Params::MAX_BOUNCE_ANGLE;

    let speed = (ball.speed() * config.ball_speed_increase).min(config.ball_speed_max);
    let away = -paddle.side.incoming_sign();

    let mut vel = glam::Vec2::new(away * speed * angle.cos(), speed * angle.sin());

    // A flat return is trivially tracked; give it some vertical motion
    if vel.y.abs() < Params::MIN_VERTICAL_SPEED {
        vel.y += rng.0.gen_range(-1.0f32..=1.0) * speed * Params::BOUNCE_JITTER_Y;
    }
    vel.x += rng.0.gen_range(-1.0f32..=1.0) * speed * Params::BOUNCE_JITTER_X;

    // Jitter must not push the deflection past the maximum angle
    let max_vy = vel.x.abs() * Params::MAX_BOUNCE_ANGLE.tan();
    vel.y = vel.y.clamp(-max_vy, max_vy);

    ball.vel = vel.clamp_length_max(config.ball_speed_max);
}

/// Set each paddle's `disabled` flag from the tag-team state
pub fn sync_tag_team(world: &mut World, tag_team: &TagTeam) {
    for (_entity, paddle) in world.query_mut::<&mut Paddle>() {
        paddle.disabled = tag_team.is_disabled(paddle.id);
    }
}

/// Check the ball against the paddles it is travelling toward.
///
/// At most one collision is resolved per call: only the side the ball is
/// heading to is tested, the live tag-team paddle before its disabled
/// teammate, and the first hit wins.
pub fn check_collisions(
    world: &mut World,
    config: &Config,
    tag_team: &mut TagTeam,
    rng: &mut GameRng,
    events: &mut Events,
) -> Option<PaddleId> {
    let mut ball = {
        let mut ball_query = world.query::<&Ball>();
        match ball_query.iter().next() {
            Some((_e, ball)) => *ball,
            None => return None, // No ball in world
        }
    };

    if ball.vel.x == 0.0 {
        return None;
    }
    let side = if ball.vel.x < 0.0 {
        Side::Left
    } else {
        Side::Right
    };

    let mut candidates: Vec<Paddle> = world
        .query::<&Paddle>()
        .iter()
        .filter(|(_e, p)| p.side == side)
        .map(|(_e, p)| *p)
        .collect();
    candidates.sort_by_key(|p| (tag_team.is_disabled(p.id), p.id));

    let mut hit = None;
    for paddle in &candidates {
        // A disabled paddle is tested last and never blocks the ball
        if paddle.disabled || tag_team.is_disabled(paddle.id) {
            continue;
        }
        if paddle_contact(&ball, paddle) {
            ball.pos.x = match side {
                Side::Left => paddle.face_x(),
                Side::Right => paddle.face_x() - ball.size,
            };
            resolve_bounce(&mut ball, paddle, config, rng);
            hit = Some(paddle.id);
            break;
        }
    }

    let id = hit?;
    for (_entity, b) in world.query_mut::<&mut Ball>() {
        *b = ball;
    }
    if tag_team.enabled {
        tag_team.record_hit(id);
        sync_tag_team(world, tag_team);
    }
    events.push(GameEvent::PaddleHit(id));
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_ball, create_paddle, Config, Events};
    use glam::Vec2;

    fn setup_world() -> (hecs::World, Config, Events, GameRng, TagTeam) {
        let world = hecs::World::new();
        let config = Config::new();
        let events = Events::new();
        let rng = GameRng::new(12345); // Fixed seed for deterministic tests
        (world, config, events, rng, TagTeam::default())
    }

    fn ball_moving(from: Vec2, to: Vec2, vel: Vec2, size: f32) -> Ball {
        let mut ball = Ball::new(to, vel, size);
        ball.last_pos = from;
        ball
    }

    fn ball_in(world: &hecs::World) -> Ball {
        *world.query::<&Ball>().iter().next().map(|(_e, b)| b).unwrap()
    }

    #[test]
    fn test_swept_hit_on_left_paddle() {
        let config = Config::new();
        let paddle = Paddle::new(PaddleId::P1, 300.0, &config);
        let face = paddle.face_x();
        // Crosses the face in a single tick, ending well behind the paddle
        let ball = ball_moving(
            Vec2::new(face + 10.0, 290.0),
            Vec2::new(face - 30.0, 290.0),
            Vec2::new(-40.0, 0.0),
            config.ball_size,
        );
        assert!(paddle_contact(&ball, &paddle));
    }

    #[test]
    fn test_swept_miss_when_crossing_outside_paddle() {
        let config = Config::new();
        let paddle = Paddle::new(PaddleId::P1, 300.0, &config);
        let face = paddle.face_x();
        let ball = ball_moving(
            Vec2::new(face + 10.0, 50.0),
            Vec2::new(face - 30.0, 50.0),
            Vec2::new(-40.0, 0.0),
            config.ball_size,
        );
        assert!(!paddle_contact(&ball, &paddle));
    }

    #[test]
    fn test_swept_interpolates_crossing_height() {
        let config = Config::new();
        let paddle = Paddle::new(PaddleId::P2, 300.0, &config);
        let face = paddle.face_x();
        let size = config.ball_size;
        // Ends far below the paddle but crosses the face at its centre
        let ball = ball_moving(
            Vec2::new(face - size - 10.0, 250.0),
            Vec2::new(face - size + 10.0, 350.0),
            Vec2::new(20.0, 100.0),
            size,
        );
        assert!(paddle_contact(&ball, &paddle));
    }

    #[test]
    fn test_fallback_catches_slow_ball_within_tolerance() {
        let config = Config::new();
        let paddle = Paddle::new(PaddleId::P1, 300.0, &config);
        let face = paddle.face_x();
        let ball = ball_moving(
            Vec2::new(face + 1.5, 300.0),
            Vec2::new(face + 1.0, 300.0),
            Vec2::new(-0.5, 0.0),
            config.ball_size,
        );
        assert!(paddle_contact(&ball, &paddle));
    }

    #[test]
    fn test_ball_collides_with_left_paddle() {
        let (mut world, config, mut events, mut rng, mut tag) = setup_world();
        create_paddle(&mut world, PaddleId::P1, 300.0, &config);
        let face = config.paddle_x(Side::Left) + config.paddle_width;
        let ball = create_ball(&mut world, Vec2::new(face - 2.0, 295.0), Vec2::new(-8.0, 0.0), &config);
        world.get::<&mut Ball>(ball).unwrap().last_pos = Vec2::new(face + 6.0, 295.0);

        let hit = check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events);

        assert_eq!(hit, Some(PaddleId::P1));
        let ball = ball_in(&world);
        assert!(ball.vel.x > 0.0, "Ball should bounce right after hitting left paddle");
        assert_eq!(ball.pos.x, face, "Ball should be snapped to the paddle face");
        assert_eq!(events.paddle_hits(), 1);
    }

    #[test]
    fn test_ball_collides_with_right_paddle() {
        let (mut world, config, mut events, mut rng, mut tag) = setup_world();
        create_paddle(&mut world, PaddleId::P2, 300.0, &config);
        let face = config.paddle_x(Side::Right);
        let start = Vec2::new(face - config.ball_size - 4.0, 295.0);
        let ball = create_ball(&mut world, start + Vec2::new(8.0, 0.0), Vec2::new(8.0, 0.0), &config);
        world.get::<&mut Ball>(ball).unwrap().last_pos = start;

        check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events);

        let ball = ball_in(&world);
        assert!(ball.vel.x < 0.0, "Ball should bounce left after hitting right paddle");
        assert_eq!(ball.pos.x, face - config.ball_size);
        assert_eq!(events.paddle_hits(), 1);
    }

    #[test]
    fn test_ball_speed_increases_on_paddle_hit() {
        let config = Config::new();
        let mut rng = GameRng::new(5);
        let paddle = Paddle::new(PaddleId::P1, 300.0, &config);
        let mut ball = Ball::new(Vec2::new(paddle.face_x(), 294.0), Vec2::new(-8.0, 0.0), config.ball_size);

        resolve_bounce(&mut ball, &paddle, &config, &mut rng);

        let expected = 8.0 * config.ball_speed_increase;
        // Jitter moves the speed by at most a few percent
        assert!(
            (ball.speed() - expected).abs() < expected * 0.1,
            "Ball speed should increase by {}x, got {}",
            config.ball_speed_increase,
            ball.speed()
        );
    }

    #[test]
    fn test_ball_speed_caps_at_max() {
        let config = Config::new();
        let mut rng = GameRng::new(5);
        let paddle = Paddle::new(PaddleId::P2, 300.0, &config);
        let mut ball = Ball::new(
            Vec2::new(paddle.face_x() - config.ball_size, 294.0),
            Vec2::new(config.ball_speed_max - 0.1, 0.0),
            config.ball_size,
        );

        resolve_bounce(&mut ball, &paddle, &config, &mut rng);

        assert!(ball.speed() <= config.ball_speed_max + 1e-4);
    }

    #[test]
    fn test_ball_trajectory_affected_by_hit_position() {
        let config = Config::new();
        let mut rng = GameRng::new(9);
        let paddle = Paddle::new(PaddleId::P1, 300.0, &config);

        let mut top_hit = Ball::new(Vec2::new(paddle.face_x(), paddle.pos.y), Vec2::new(-6.0, 0.0), config.ball_size);
        resolve_bounce(&mut top_hit, &paddle, &config, &mut rng);
        assert!(top_hit.vel.y < 0.0, "Ball should deflect upward when hitting top of paddle");

        let low = paddle.pos.y + paddle.height - config.ball_size;
        let mut bottom_hit = Ball::new(Vec2::new(paddle.face_x(), low), Vec2::new(-6.0, 0.0), config.ball_size);
        resolve_bounce(&mut bottom_hit, &paddle, &config, &mut rng);
        assert!(bottom_hit.vel.y > 0.0, "Ball should deflect downward when hitting bottom of paddle");
    }

    #[test]
    fn test_ball_does_not_bounce_when_moving_away_from_paddle() {
        let (mut world, config, mut events, mut rng, mut tag) = setup_world();
        create_paddle(&mut world, PaddleId::P1, 300.0, &config);
        let face = config.paddle_width;
        create_ball(&mut world, Vec2::new(face, 295.0), Vec2::new(8.0, 0.0), &config);

        let hit = check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events);

        assert_eq!(hit, None);
        assert_eq!(ball_in(&world).vel.x, 8.0, "Ball should not bounce when moving away");
        assert_eq!(events.paddle_hits(), 0);
    }

    #[test]
    fn test_no_collision_when_no_ball() {
        let (mut world, config, mut events, mut rng, mut tag) = setup_world();
        create_paddle(&mut world, PaddleId::P1, 300.0, &config);

        assert_eq!(check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events), None);
        assert!(events.is_empty());
    }

    #[test]
    fn test_tag_team_disabled_paddle_does_not_block() {
        let (mut world, config, mut events, mut rng, _) = setup_world();
        let mut tag = TagTeam::new(true);
        // Paddle 1 hit last, so it is disabled and paddle 3 is live
        create_paddle(&mut world, PaddleId::P1, 300.0, &config);
        create_paddle(&mut world, PaddleId::P3, 100.0, &config);
        sync_tag_team(&mut world, &tag);

        let face = config.paddle_width;
        let ball = create_ball(&mut world, Vec2::new(face - 2.0, 295.0), Vec2::new(-8.0, 0.0), &config);
        world.get::<&mut Ball>(ball).unwrap().last_pos = Vec2::new(face + 6.0, 295.0);

        let hit = check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events);
        assert_eq!(hit, None, "Disabled paddle must not block the ball");
    }

    #[test]
    fn test_tag_team_hit_swaps_live_paddle() {
        let (mut world, config, mut events, mut rng, _) = setup_world();
        let mut tag = TagTeam::new(true);
        create_paddle(&mut world, PaddleId::P1, 300.0, &config);
        create_paddle(&mut world, PaddleId::P3, 100.0, &config);
        sync_tag_team(&mut world, &tag);

        let face = config.paddle_width;
        let ball = create_ball(&mut world, Vec2::new(face - 2.0, 95.0), Vec2::new(-8.0, 0.0), &config);
        world.get::<&mut Ball>(ball).unwrap().last_pos = Vec2::new(face + 6.0, 95.0);

        let hit = check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events);

        assert_eq!(hit, Some(PaddleId::P3));
        assert_eq!(tag.left_last_hit, PaddleId::P3);
        for (_e, paddle) in world.query::<&Paddle>().iter() {
            match paddle.id {
                PaddleId::P1 => assert!(!paddle.disabled, "Paddle 1 becomes live"),
                PaddleId::P3 => assert!(paddle.disabled, "Paddle 3 sits out next"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_scenario_ball_reaches_left_paddle() {
        let (mut world, _, mut events, mut rng, mut tag) = setup_world();
        let config = Config {
            paddle_width: 20.0,
            paddle_height: 80.0,
            ..Config::new()
        };
        create_paddle(&mut world, PaddleId::P1, 300.0, &config);
        create_ball(&mut world, Vec2::new(400.0, 300.0), Vec2::new(-5.0, 0.0), &config);
        let time = crate::Time::new(1.0, 0.0);

        let mut hits = 0;
        for _ in 0..100 {
            crate::systems::move_ball(&mut world, &time, &config, &mut rng, &mut events);
            if ball_in(&world).pos.x <= 20.0 {
                hits += check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events)
                    .map_or(0, |_| 1);
                break;
            }
        }

        let ball = ball_in(&world);
        assert_eq!(hits, 1, "Expected a collision event");
        assert_eq!(ball.pos.x, 20.0, "Ball should be snapped to the paddle edge");
        assert!(ball.vel.x > 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bounce_keeps_speed_cap_and_angle(
                speed in 0.5f32..30.0,
                angle in -1.2f32..1.2,
                offset in -60.0f32..60.0,
                seed in 0u64..1000,
            ) {
                let config = Config::new();
                let mut rng = GameRng::new(seed);
                let paddle = Paddle::new(PaddleId::P2, 300.0, &config);
                let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
                let mut ball = Ball::new(
                    Vec2::new(paddle.face_x() - config.ball_size, 294.0 + offset),
                    vel.clamp_length_max(config.ball_speed_max),
                    config.ball_size,
                );

                resolve_bounce(&mut ball, &paddle, &config, &mut rng);

                prop_assert!(ball.speed() <= config.ball_speed_max + 1e-4);
                prop_assert!(ball.vel.x < 0.0);
                let deflection = ball.vel.y.abs().atan2(ball.vel.x.abs());
                prop_assert!(deflection <= Params::MAX_BOUNCE_ANGLE + 1e-4);
            }

            #[test]
            fn fast_ball_never_tunnels(
                step in 8.0f32..120.0,
                before in 0.01f32..1.0,
                y_offset in -8.0f32..80.0,
            ) {
                // Ball leading edge starts `before * step` in front of the face
                // and moves a full `step` in one tick, so it always crosses.
                let config = Config::new();
                let paddle = Paddle::new(PaddleId::P1, 300.0, &config);
                let face = paddle.face_x();
                let y = paddle.pos.y + y_offset;
                let start = Vec2::new(face + before * step, y);
                let ball = ball_moving(start, start - Vec2::new(step, 0.0), Vec2::new(-step, 0.0), config.ball_size);

                prop_assert!(paddle_contact(&ball, &paddle));
            }

            #[test]
            fn at_most_one_paddle_hit_per_tick(
                x in 0.0f32..40.0,
                vx in prop_oneof![-20.0f32..-0.5, 0.5f32..20.0],
                seed in 0u64..500,
            ) {
                // Arena so narrow both paddles overlap the ball at once
                let config = Config {
                    arena_width: 40.0,
                    ..Config::new()
                };
                let mut world = hecs::World::new();
                let mut rng = GameRng::new(seed);
                let mut events = Events::new();
                let mut tag = TagTeam::default();
                create_paddle(&mut world, PaddleId::P1, 300.0, &config);
                create_paddle(&mut world, PaddleId::P2, 300.0, &config);
                let ball = create_ball(&mut world, Vec2::new(x, 294.0), Vec2::new(vx, 0.0), &config);
                world.get::<&mut Ball>(ball).unwrap().last_pos = Vec2::new(x - vx, 294.0);

                check_collisions(&mut world, &config, &mut tag, &mut rng, &mut events);

                prop_assert!(events.paddle_hits() <= 1);
            }
        }
    }
}
