use std::{collections::HashMap, hash::Hash};

use agent_interface::{Agent, EpisodeListener, Learner, QValueEstimates, TransitionObserver, ValueEstimates};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use tracing::{debug, info};

use super::ActionFn;

/// Hyper-parameters of a [`QLearningAgent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearningParameters {
    /// Exploration rate.
    pub epsilon: f64,
    /// Learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub discount: f64,
    /// Episodes after which the agent stops exploring and learning.
    pub num_training: usize,
}

impl Default for QLearningParameters {
    fn default() -> Self {
        QLearningParameters {
            epsilon: 0.5,
            alpha: 0.5,
            discount: 1.0,
            num_training: 100,
        }
    }
}

/// Epsilon-greedy tabular Q-learning.
///
/// Unseen `(state, action)` pairs are worth `0`.
pub struct QLearningAgent<S, A> {
    action_fn: ActionFn<S, A>,
    q_values: HashMap<(S, A), f64>,
    params: QLearningParameters,
    episodes_so_far: usize,
    episode_rewards: f64,
    training_rewards: f64,
    testing_rewards: f64,
    rng: StdRng,
}

impl<S, A> QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    /// `seed` set to `None` draws a fresh one.
    pub fn new(action_fn: impl Fn(&S) -> Vec<A> + 'static, params: QLearningParameters, seed: Option<u64>) -> Self {
        QLearningAgent {
            action_fn: Box::new(action_fn),
            q_values: HashMap::new(),
            params,
            episodes_so_far: 0,
            episode_rewards: 0.0,
            training_rewards: 0.0,
            testing_rewards: 0.0,
            rng: StdRng::seed_from_u64(seed.unwrap_or_else(rand::random)),
        }
    }

    /// Current hyper-parameters; epsilon and alpha drop to zero once
    /// training is over.
    pub fn parameters(&self) -> QLearningParameters {
        self.params
    }

    /// Episodes completed so far.
    pub fn episodes_so_far(&self) -> usize {
        self.episodes_so_far
    }

    /// Rewards accumulated over training and testing episodes.
    pub fn accumulated_rewards(&self) -> (f64, f64) {
        (self.training_rewards, self.testing_rewards)
    }

    /// True while the agent still explores and learns.
    pub fn is_in_training(&self) -> bool {
        self.episodes_so_far < self.params.num_training
    }

    fn q(&self, state: &S, action: &A) -> f64 {
        self.q_values
            .get(&(state.clone(), action.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    fn best_actions(&self, state: &S) -> (Vec<A>, f64) {
        let mut best = Vec::new();
        let mut best_value = f64::NEG_INFINITY;
        for action in (self.action_fn)(state) {
            let q = self.q(state, &action);
            if q > best_value {
                best_value = q;
                best.clear();
            }
            if q == best_value {
                best.push(action);
            }
        }
        if best.is_empty() {
            best_value = 0.0;
        }
        (best, best_value)
    }
}

impl<S, A> Agent<S, A> for QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn get_action(&mut self, state: &S) -> Option<A> {
        let legal = (self.action_fn)(state);
        if legal.is_empty() {
            return None;
        }
        if self.rng.random_bool(self.params.epsilon.clamp(0.0, 1.0)) {
            return legal.choose(&mut self.rng).cloned();
        }
        let (best, _) = self.best_actions(state);
        best.choose(&mut self.rng).cloned()
    }

    fn value_estimates(&self) -> Option<&dyn ValueEstimates<S, A>> {
        Some(self)
    }

    fn q_value_estimates(&self) -> Option<&dyn QValueEstimates<S, A>> {
        Some(self)
    }

    fn learner(&mut self) -> Option<&mut dyn Learner<S, A>> {
        Some(self)
    }

    fn transition_observer(&mut self) -> Option<&mut dyn TransitionObserver<S, A>> {
        Some(self)
    }

    fn episode_listener(&mut self) -> Option<&mut dyn EpisodeListener<S>> {
        Some(self)
    }
}

impl<S, A> ValueEstimates<S, A> for QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn get_value(&self, state: &S) -> f64 {
        self.best_actions(state).1
    }

    fn get_policy(&self, state: &S) -> Option<A> {
        self.best_actions(state).0.into_iter().next()
    }
}

impl<S, A> QValueEstimates<S, A> for QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn get_q_value(&self, state: &S, action: &A) -> f64 {
        self.q(state, action)
    }
}

impl<S, A> Learner<S, A> for QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn update(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        let QLearningParameters { alpha, discount, .. } = self.params;
        if alpha == 0.0 {
            return;
        }
        let sample = reward + discount * self.get_value(next_state);
        let q = self.q_values.entry((state.clone(), action.clone())).or_insert(0.0);
        *q = (1.0 - alpha) * *q + alpha * sample;
    }
}

impl<S, A> TransitionObserver<S, A> for QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn observe_transition(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        self.episode_rewards += reward;
        self.update(state, action, next_state, reward);
    }
}

impl<S, A> EpisodeListener<S> for QLearningAgent<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    fn register_initial_state(&mut self, _state: &S) {
        self.episode_rewards = 0.0;
        if self.episodes_so_far == 0 {
            debug!(num_training = self.params.num_training, "beginning training");
        }
    }

    fn final_state(&mut self, _state: &S) {
        if self.is_in_training() {
            self.training_rewards += self.episode_rewards;
        } else {
            self.testing_rewards += self.episode_rewards;
        }
        self.episodes_so_far += 1;

        let window = 100;
        if self.episodes_so_far % window == 0 && self.episodes_so_far <= self.params.num_training {
            info!(
                completed = self.episodes_so_far,
                total = self.params.num_training,
                average_training_reward = self.training_rewards / self.episodes_so_far as f64,
                "training progress"
            );
        }
        if self.episodes_so_far == self.params.num_training {
            info!("training done, turning off epsilon and alpha");
        }
        if !self.is_in_training() {
            self.params.epsilon = 0.0;
            self.params.alpha = 0.0;
        }
    }
}
