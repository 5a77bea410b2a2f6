use agent_interface::Agent;
use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};

use crate::{
    pacman::{Direction, GameState},
    turn_game::TurnState,
};

/// Pacman agent picking the move whose successor has the best score, ties
/// broken at random. It never stops unless stopping is the only option.
pub struct GreedyAgent {
    rng: StdRng,
}

impl GreedyAgent {
    /// `seed` set to `None` draws a fresh one.
    pub fn new(seed: Option<u64>) -> Self {
        GreedyAgent {
            rng: StdRng::seed_from_u64(seed.unwrap_or_else(rand::random)),
        }
    }
}

impl Agent<GameState, Direction> for GreedyAgent {
    fn get_action(&mut self, state: &GameState) -> Option<Direction> {
        let legal = state.legal_actions(0);
        let moves: Vec<Direction> = legal.iter().copied().filter(|d| *d != Direction::Stop).collect();
        let candidates = if moves.is_empty() { legal } else { moves };

        let scored: Vec<(Direction, f64)> = candidates
            .into_iter()
            .filter_map(|action| {
                let successor = state.generate_successor(0, &action).ok()?;
                Some((action, successor.score()))
            })
            .collect();
        let best_score = scored.iter().map(|(_, score)| *score).reduce(f64::max)?;
        let best: Vec<Direction> = scored
            .into_iter()
            .filter(|(_, score)| *score == best_score)
            .map(|(action, _)| action)
            .collect();
        best.choose(&mut self.rng).copied()
    }
}
