use crate::{Ball, Config, Direction, Events, GameEvent, GameRng, Paddle, PaddleInput, Params, Time};
use hecs::World;
use rand::Rng;

/// Advance one paddle by `dt` under the given input.
///
/// Pressing accelerates linearly toward the pressed side, releasing decays
/// linearly to zero. Hitting an arena edge clamps the position and zeroes
/// the velocity.
pub fn step_paddle(paddle: &mut Paddle, dir: Direction, dt: f32, config: &Config) {
    match dir {
        Direction::Up | Direction::Down => {
            paddle.vel_y += dir.sign() * config.paddle_acceleration * dt;
        }
        Direction::None => {
            let decay = config.paddle_deceleration * dt;
            if paddle.vel_y > 0.0 {
                paddle.vel_y = (paddle.vel_y - decay).max(0.0);
            } else if paddle.vel_y < 0.0 {
                paddle.vel_y = (paddle.vel_y + decay).min(0.0);
            }
        }
    }
    paddle.vel_y = paddle
        .vel_y
        .clamp(-config.paddle_max_speed, config.paddle_max_speed);

    paddle.pos.y += paddle.vel_y * dt;

    let max_y = (config.arena_height - paddle.height).max(0.0);
    if paddle.pos.y < 0.0 || paddle.pos.y > max_y {
        paddle.pos.y = paddle.pos.y.clamp(0.0, max_y);
        paddle.vel_y = 0.0;
    }
}

/// Advance the ball by `dt`, reflecting off the top and bottom walls.
pub fn step_ball(ball: &mut Ball, dt: f32, config: &Config, rng: &mut GameRng, events: &mut Events) {
    ball.last_pos = ball.pos;
    ball.pos += ball.vel * dt;

    let max_y = (config.arena_height - ball.size).max(0.0);
    let hit_wall = if ball.pos.y <= 0.0 {
        ball.pos.y = 0.0;
        ball.vel.y < 0.0
    } else if ball.pos.y >= max_y {
        ball.pos.y = max_y;
        ball.vel.y > 0.0
    } else {
        false
    };

    if hit_wall {
        ball.vel.y = -ball.vel.y;
        // Horizontal nudge breaks symmetric wall-to-wall loops
        if ball.vel.x != 0.0 {
            let jitter = rng.0.gen_range(-Params::WALL_JITTER..=Params::WALL_JITTER);
            ball.vel.x += jitter * ball.vel.x.signum();
        }
        ball.vel = ball.vel.clamp_length_max(config.ball_speed_max);
        events.push(GameEvent::WallHit);
    }
}

/// Apply paddle movement based on inputs
pub fn move_paddles(world: &mut World, time: &Time, config: &Config) {
    for (_entity, (paddle, input)) in world.query_mut::<(&mut Paddle, &PaddleInput)>() {
        step_paddle(paddle, input.dir, time.dt, config);
    }
}

/// Move ball based on velocity
pub fn move_ball(world: &mut World, time: &Time, config: &Config, rng: &mut GameRng, events: &mut Events) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        step_ball(ball, time.dt, config, rng, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaddleId;
    use glam::Vec2;

    fn paddle_at(y: f32, config: &Config) -> Paddle {
        let mut paddle = Paddle::new(PaddleId::P1, 0.0, config);
        paddle.pos.y = y;
        paddle
    }

    #[test]
    fn test_paddle_accelerates_to_max_speed() {
        let config = Config::new();
        let mut paddle = paddle_at(250.0, &config);

        step_paddle(&mut paddle, Direction::Down, 1.0, &config);
        assert_eq!(paddle.vel_y, config.paddle_acceleration);

        for _ in 0..50 {
            step_paddle(&mut paddle, Direction::Down, 1.0, &config);
            if paddle.pos.y >= config.paddle_max_y() {
                break;
            }
            assert!(paddle.vel_y <= config.paddle_max_speed);
        }
    }

    #[test]
    fn test_paddle_decelerates_linearly_to_rest() {
        let config = Config::new();
        let mut paddle = paddle_at(250.0, &config);
        paddle.vel_y = -3.5;

        step_paddle(&mut paddle, Direction::None, 1.0, &config);
        assert_eq!(paddle.vel_y, -2.5);

        for _ in 0..5 {
            step_paddle(&mut paddle, Direction::None, 1.0, &config);
        }
        assert_eq!(paddle.vel_y, 0.0, "Released paddle should come to rest");
    }

    #[test]
    fn test_paddle_clamp_zeroes_velocity() {
        let config = Config::new();
        let mut paddle = paddle_at(1.0, &config);
        paddle.vel_y = -config.paddle_max_speed;

        step_paddle(&mut paddle, Direction::Up, 1.0, &config);

        assert_eq!(paddle.pos.y, 0.0);
        assert_eq!(paddle.vel_y, 0.0, "Velocity should be zeroed on clamp");
    }

    #[test]
    fn test_paddle_clamped_at_bottom() {
        let config = Config::new();
        let mut paddle = paddle_at(config.paddle_max_y() - 1.0, &config);
        paddle.vel_y = config.paddle_max_speed;

        step_paddle(&mut paddle, Direction::Down, 1.0, &config);

        assert_eq!(paddle.pos.y, config.paddle_max_y());
        assert_eq!(paddle.vel_y, 0.0);
    }

    #[test]
    fn test_ball_moves_with_velocity() {
        let config = Config::new();
        let mut rng = GameRng::new(1);
        let mut events = Events::new();
        let mut ball = Ball::new(Vec2::new(100.0, 100.0), Vec2::new(3.0, -2.0), config.ball_size);

        step_ball(&mut ball, 2.0, &config, &mut rng, &mut events);

        assert_eq!(ball.pos, Vec2::new(106.0, 96.0));
        assert_eq!(ball.last_pos, Vec2::new(100.0, 100.0));
        assert!(events.is_empty());
    }

    #[test]
    fn test_ball_bounces_off_top_wall() {
        let config = Config::new();
        let mut rng = GameRng::new(1);
        let mut events = Events::new();
        let mut ball = Ball::new(Vec2::new(400.0, 2.0), Vec2::new(5.0, -4.0), config.ball_size);

        step_ball(&mut ball, 1.0, &config, &mut rng, &mut events);

        assert!(ball.vel.y > 0.0, "Ball should bounce down after hitting top wall");
        assert!(ball.vel.x > 0.0, "Jitter must not flip horizontal direction");
        assert!((ball.vel.x - 5.0).abs() <= Params::WALL_JITTER + 1e-5);
        assert_eq!(ball.pos.y, 0.0, "Ball should be snapped inside the arena");
        assert_eq!(events.wall_hits(), 1);
    }

    #[test]
    fn test_ball_bounces_off_bottom_wall() {
        let config = Config::new();
        let mut rng = GameRng::new(2);
        let mut events = Events::new();
        let start_y = config.ball_max_y() - 1.0;
        let mut ball = Ball::new(Vec2::new(400.0, start_y), Vec2::new(-5.0, 4.0), config.ball_size);

        step_ball(&mut ball, 1.0, &config, &mut rng, &mut events);

        assert!(ball.vel.y < 0.0, "Ball should bounce up after hitting bottom wall");
        assert!(ball.vel.x < 0.0);
        assert_eq!(ball.pos.y, config.ball_max_y());
        assert_eq!(events.wall_hits(), 1);
    }

    #[test]
    fn test_wall_jitter_respects_speed_cap() {
        let config = Config::new();
        let mut rng = GameRng::new(3);
        let mut events = Events::new();
        let vel = Vec2::new(config.ball_speed_max, -0.5).clamp_length_max(config.ball_speed_max);
        let mut ball = Ball::new(Vec2::new(400.0, 0.2), vel, config.ball_size);

        step_ball(&mut ball, 1.0, &config, &mut rng, &mut events);

        assert!(ball.speed() <= config.ball_speed_max + 1e-4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn paddle_never_leaves_arena(
                start in 0.0f32..510.0,
                moves in proptest::collection::vec(-1i8..=1, 1..200),
                dt in 0.1f32..=1.0,
            ) {
                let config = Config::new();
                let mut paddle = paddle_at(start, &config);
                for &m in &moves {
                    step_paddle(&mut paddle, Direction::from_sign(m), dt, &config);
                    prop_assert!(paddle.pos.y >= 0.0);
                    prop_assert!(paddle.pos.y <= config.paddle_max_y());
                    prop_assert!(paddle.vel_y.abs() <= config.paddle_max_speed);
                }
            }
        }
    }
}
