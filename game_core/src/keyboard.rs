use tracing::debug;

use crate::error::MatchError;
use crate::match_state::Match;
use crate::{Direction, PaddleId};

/// Key name to (paddle, direction). Letter keys are matched case-insensitively.
pub fn binding(key: &str) -> Option<(PaddleId, Direction)> {
    let key = if key.chars().count() == 1 {
        key.to_ascii_lowercase()
    } else {
        key.to_string()
    };
    match key.as_str() {
        "w" => Some((PaddleId::P1, Direction::Up)),
        "s" => Some((PaddleId::P1, Direction::Down)),
        "ArrowUp" => Some((PaddleId::P2, Direction::Up)),
        "ArrowDown" => Some((PaddleId::P2, Direction::Down)),
        "e" => Some((PaddleId::P3, Direction::Up)),
        "d" => Some((PaddleId::P3, Direction::Down)),
        "i" => Some((PaddleId::P4, Direction::Up)),
        "k" => Some((PaddleId::P4, Direction::Down)),
        _ => None,
    }
}

/// Held movement keys, in the order they were pressed
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    held: Vec<(PaddleId, Direction)>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false for keys that are not movement keys
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(bound) = binding(key) else {
            return false;
        };
        self.held.retain(|held| *held != bound);
        self.held.push(bound);
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        let Some(bound) = binding(key) else {
            return false;
        };
        self.held.retain(|held| *held != bound);
        true
    }

    /// Resolved direction for `id`. When both keys of a pair are held the
    /// most recently pressed one wins.
    pub fn direction(&self, id: PaddleId) -> Direction {
        self.held
            .iter()
            .rev()
            .find(|(paddle, _)| *paddle == id)
            .map(|&(_, dir)| dir)
            .unwrap_or_default()
    }

    /// Drop every held key, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Push the resolved directions of every human paddle into `game`
    pub fn apply(&self, game: &mut Match) {
        for n in 1..=game.mode().paddle_count() as u8 {
            let id = PaddleId(n);
            match game.set_direction(id, self.direction(id)) {
                Ok(()) | Err(MatchError::NotHumanControlled(_)) => {}
                Err(err) => debug!(%err, "key state not applied"),
            }
        }
    }
}
