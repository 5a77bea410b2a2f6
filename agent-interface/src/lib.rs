//! Capabilities an agent can offer to an environment driver.
//!
//! Every agent implements [`Agent`]. Everything else is optional: an agent
//! advertises an extra capability by overriding the matching probe method
//! (`value_estimates`, `learner`, ...) to return itself. Drivers and displays
//! ask for a capability right before using it and skip the call when the
//! probe returns `None`.

/// What every participant must implement.
pub trait Agent<State, Action> {
    /// Choose an action for `state`.
    ///
    /// `None` means the agent has nothing to play (usually because `state`
    /// has no legal action).
    fn get_action(&mut self, state: &State) -> Option<Action>;

    /// State values and greedy policy, used for visualization.
    fn value_estimates(&self) -> Option<&dyn ValueEstimates<State, Action>> {
        None
    }

    /// Per-action values, used for visualization.
    fn q_value_estimates(&self) -> Option<&dyn QValueEstimates<State, Action>> {
        None
    }

    /// Raw update hook.
    fn learner(&mut self) -> Option<&mut dyn Learner<State, Action>> {
        None
    }

    /// Transition bookkeeping hook, called by drivers after every step.
    fn transition_observer(&mut self) -> Option<&mut dyn TransitionObserver<State, Action>> {
        None
    }

    /// Episode start/end notifications.
    fn episode_listener(&mut self) -> Option<&mut dyn EpisodeListener<State>> {
        None
    }
}

/// Agents able to report how good a state is.
pub trait ValueEstimates<State, Action> {
    /// Estimated value of `state`.
    fn get_value(&self, state: &State) -> f64;

    /// Best action in `state`, `None` when there is no legal action.
    fn get_policy(&self, state: &State) -> Option<Action>;
}

/// Agents able to report how good an action is.
pub trait QValueEstimates<State, Action> {
    /// Estimated value of playing `action` in `state`.
    fn get_q_value(&self, state: &State, action: &Action) -> f64;
}

/// Agents that learn from individual transitions.
pub trait Learner<State, Action> {
    /// Incorporate one `(state, action, next_state, reward)` sample.
    fn update(&mut self, state: &State, action: &Action, next_state: &State, reward: f64);
}

/// Agents that want to see every transition the driver executes.
pub trait TransitionObserver<State, Action> {
    /// `reward` is whatever the driver accumulates for this agent, see the
    /// driver documentation.
    fn observe_transition(&mut self, state: &State, action: &Action, next_state: &State, reward: f64);
}

/// Agents that track episode boundaries.
pub trait EpisodeListener<State> {
    /// Called once after `reset`, before the first action.
    fn register_initial_state(&mut self, state: &State);

    /// Called once with the last state of the episode.
    fn final_state(&mut self, state: &State);
}
