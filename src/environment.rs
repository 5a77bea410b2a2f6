//! Module defining the protocol every environment exposes to drivers

use crate::{action_catalog::ActionCatalog, error::EnvError};

/// Outcome of one `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S, I> {
    /// Observation after the action, an independent copy.
    pub state: S,
    /// Reward attributed to the step.
    pub reward: f64,
    /// When true, the caller must `reset` before stepping again.
    pub done: bool,
    /// Environment specific extra information.
    pub info: I,
}

/// What an environment should implement
pub trait Environment {
    /// Observation handed to agents.
    type State;
    /// What agents play.
    type Action;
    /// Extra information attached to each [`Step`].
    type Info;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Self::State, EnvError>;

    /// Run one timestep of the environment dynamics.
    ///
    /// # Error
    /// Returned when `action` is not legal or the environment cannot advance;
    /// the episode is left as it was unless the error says otherwise.
    fn step(&mut self, action: &Self::Action) -> Result<Step<Self::State, Self::Info>, EnvError>;

    /// Legal actions in the current state, for the actor whose turn it is.
    fn possible_actions(&self) -> ActionCatalog<Self::Action>;

    /// Push the current state to the display backend.
    fn render(&mut self) -> Result<(), EnvError>;

    /// Reseed the environment generator; `None` picks a fresh seed.
    ///
    /// Returns the seeds actually used.
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64>;
}
