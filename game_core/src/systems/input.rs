use hecs::World;

use crate::components::*;
use crate::resources::*;
use crate::systems::ai::AiController;

/// Copy the latest human key state onto each human-driven paddle.
///
/// AI-driven paddles are skipped; their input is written by `update_ai`.
pub fn ingest_inputs(world: &mut World, input: &InputState) {
    for (_entity, (paddle, intent, ai)) in
        world.query_mut::<(&Paddle, &mut PaddleInput, Option<&AiController>)>()
    {
        if ai.is_none() {
            intent.dir = input.get(paddle.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_paddle, Config, Difficulty};

    #[test]
    fn test_ingest_applies_direction_to_matching_paddle() {
        let config = Config::new();
        let mut world = World::new();
        let p1 = create_paddle(&mut world, PaddleId::P1, 300.0, &config);
        let p2 = create_paddle(&mut world, PaddleId::P2, 300.0, &config);
        let mut input = InputState::new();
        input.set(PaddleId::P1, Direction::Up);

        ingest_inputs(&mut world, &input);

        assert_eq!(world.get::<&PaddleInput>(p1).unwrap().dir, Direction::Up);
        assert_eq!(world.get::<&PaddleInput>(p2).unwrap().dir, Direction::None);
    }

    #[test]
    fn test_ingest_leaves_ai_paddle_alone() {
        let config = Config::new();
        let mut world = World::new();
        let p2 = create_paddle(&mut world, PaddleId::P2, 300.0, &config);
        world.insert_one(p2, AiController::new(Difficulty::Medium)).unwrap();
        world.get::<&mut PaddleInput>(p2).unwrap().dir = Direction::Down;
        let mut input = InputState::new();
        input.set(PaddleId::P2, Direction::Up);

        ingest_inputs(&mut world, &input);

        assert_eq!(
            world.get::<&PaddleInput>(p2).unwrap().dir,
            Direction::Down,
            "Human input must not override the AI"
        );
    }
}
