use agent_interface::Agent;
use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};

use super::ActionFn;

/// Plays a uniformly random legal action.
pub struct RandomAgent<S, A> {
    action_fn: ActionFn<S, A>,
    rng: StdRng,
}

impl<S, A> RandomAgent<S, A> {
    /// `seed` set to `None` draws a fresh one.
    pub fn new(action_fn: impl Fn(&S) -> Vec<A> + 'static, seed: Option<u64>) -> Self {
        RandomAgent {
            action_fn: Box::new(action_fn),
            rng: StdRng::seed_from_u64(seed.unwrap_or_else(rand::random)),
        }
    }
}

impl<S, A: Clone> Agent<S, A> for RandomAgent<S, A> {
    fn get_action(&mut self, state: &S) -> Option<A> {
        (self.action_fn)(state).choose(&mut self.rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_agent_stays_legal() {
        let mut agent = RandomAgent::new(|n: &u32| (0..*n).collect(), Some(4));
        for n in 1..20 {
            let action = agent.get_action(&n).unwrap();
            assert!(action < n);
        }
        assert_eq!(agent.get_action(&0), None);
        assert!(agent.learner().is_none());
    }
}
