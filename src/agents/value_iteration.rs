use std::collections::HashMap;

use agent_interface::{Agent, QValueEstimates, ValueEstimates};
use tracing::{debug, instrument};

use crate::mdp::Mdp;

/// Offline planner: runs batch value iteration on a copy of the MDP when
/// built, then follows the greedy policy of the resulting values.
pub struct ValueIterationAgent<M: Mdp> {
    mdp: M,
    discount: f64,
    values: HashMap<M::State, f64>,
}

impl<M: Mdp> ValueIterationAgent<M> {
    /// Plan `iterations` sweeps with the given `discount`.
    #[instrument(level = "debug", skip(mdp))]
    pub fn new(mdp: M, discount: f64, iterations: usize) -> Self {
        let mut agent = ValueIterationAgent {
            mdp,
            discount,
            values: HashMap::new(),
        };
        for _ in 0..iterations {
            // Batch update: every state reads the values of the previous sweep.
            let values: HashMap<M::State, f64> = agent
                .mdp
                .states()
                .into_iter()
                .filter(|state| !agent.mdp.is_terminal(state))
                .map(|state| {
                    let best = agent
                        .mdp
                        .possible_actions(&state)
                        .iter()
                        .map(|action| agent.compute_q_value(&state, action))
                        .reduce(f64::max)
                        .unwrap_or(0.0);
                    (state, best)
                })
                .collect();
            agent.values = values;
        }
        debug!(states = agent.values.len(), "value iteration done");
        agent
    }

    /// Discount factor.
    pub fn discount(&self) -> f64 {
        self.discount
    }

    fn compute_q_value(&self, state: &M::State, action: &M::Action) -> f64 {
        self.mdp
            .transition_states_and_probs(state, action)
            .iter()
            .map(|(next, prob)| prob * (self.mdp.reward(state, action, next) + self.discount * self.value(next)))
            .sum()
    }

    fn value(&self, state: &M::State) -> f64 {
        self.values.get(state).copied().unwrap_or(0.0)
    }

    fn best_action(&self, state: &M::State) -> Option<M::Action> {
        let mut best: Option<(M::Action, f64)> = None;
        for action in self.mdp.possible_actions(state) {
            let q = self.compute_q_value(state, &action);
            if best.as_ref().map_or(true, |(_, value)| q > *value) {
                best = Some((action, q));
            }
        }
        best.map(|(action, _)| action)
    }
}

impl<M: Mdp> Agent<M::State, M::Action> for ValueIterationAgent<M> {
    fn get_action(&mut self, state: &M::State) -> Option<M::Action> {
        self.best_action(state)
    }

    fn value_estimates(&self) -> Option<&dyn ValueEstimates<M::State, M::Action>> {
        Some(self)
    }

    fn q_value_estimates(&self) -> Option<&dyn QValueEstimates<M::State, M::Action>> {
        Some(self)
    }
}

impl<M: Mdp> ValueEstimates<M::State, M::Action> for ValueIterationAgent<M> {
    fn get_value(&self, state: &M::State) -> f64 {
        self.value(state)
    }

    fn get_policy(&self, state: &M::State) -> Option<M::Action> {
        self.best_action(state)
    }
}

impl<M: Mdp> QValueEstimates<M::State, M::Action> for ValueIterationAgent<M> {
    fn get_q_value(&self, state: &M::State, action: &M::Action) -> f64 {
        self.compute_q_value(state, action)
    }
}
