//! Markov decision process seen by [`MdpEnv`](crate::mdp_env::MdpEnv).

use std::{fmt::Debug, hash::Hash};

/// What a Markov decision process should implement.
pub trait Mdp {
    /// Hashable state.
    type State: Clone + Eq + Hash + Debug;
    /// Action token.
    type Action: Clone + PartialEq + Debug;

    /// Every state of the process.
    fn states(&self) -> Vec<Self::State>;

    /// Where episodes begin.
    fn start_state(&self) -> Self::State;

    /// Legal actions in `state`, empty for terminal states.
    fn possible_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Successor states with their probability.
    ///
    /// Probabilities of a legal `(state, action)` pair sum to one. An illegal
    /// pair yields an empty list.
    fn transition_states_and_probs(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Vec<(Self::State, f64)>;

    /// Reward for the exact `(state, action, next_state)` transition.
    fn reward(&self, state: &Self::State, action: &Self::Action, next_state: &Self::State) -> f64;

    /// True when nothing can happen anymore in `state`.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Reward given for every non-exit transition.
    fn set_living_reward(&mut self, reward: f64);

    /// Probability that a move goes in an unintended direction.
    fn set_noise(&mut self, noise: f64);
}
