//! Errors raised by the environments.

use crate::turn_game::RuleError;

/// Everything an environment can refuse to do.
///
/// Configuration errors (`UnknownBoard`, `UnknownLayout`, `InvalidLayout`) are
/// fatal at construction. `IllegalAction` leaves the episode untouched so the
/// caller may retry. `ActorCrash` means the running game is over with a fault.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The grid name is not registered.
    #[error("unknown board '{0}'")]
    UnknownBoard(String),

    /// The layout name is not registered.
    #[error("the layout '{0}' cannot be found")]
    UnknownLayout(String),

    /// A layout text could not be parsed.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// The action is not part of the current action catalog.
    #[error("illegal action {action} (legal actions: {legal})")]
    IllegalAction {
        /// Debug rendering of the refused action.
        action: String,
        /// Debug rendering of the legal actions at that time.
        legal: String,
    },

    /// Sampling from a catalog without any action.
    #[error("cannot sample from an empty action catalog")]
    EmptyCatalog,

    /// An actor failed while its successor was generated, or ran out of time.
    #[error("agent {agent_idx} crashed: {reason}")]
    ActorCrash {
        /// Index of the crashed actor.
        agent_idx: usize,
        /// What went wrong.
        reason: String,
    },

    /// `step` was called on a finished game.
    #[error("the episode is over, call reset first")]
    EpisodeOver,

    /// `step` or `render` was called before the first `reset`.
    #[error("the environment has not been reset")]
    NotReset,

    /// An agent had nothing to play although it was its turn.
    #[error("agent {agent_idx} returned no action")]
    NoAction {
        /// Index of the silent actor.
        agent_idx: usize,
    },

    /// The driver was given the wrong number of agents.
    #[error("expected {expected} agents, got {actual}")]
    AgentCountMismatch {
        /// Number of actors in the game.
        expected: usize,
        /// Number of agents supplied.
        actual: usize,
    },

    /// A transition probability lies outside `[0, 1]`.
    #[error("transition probability {probability} is outside [0, 1]")]
    InvalidProbability {
        /// The offending probability.
        probability: f64,
    },

    /// Transition probabilities do not form a distribution.
    #[error("transition probabilities sum to {total}, expected 1")]
    MalformedTransitions {
        /// Accumulated probability mass.
        total: f64,
    },

    /// The display backend could not write its output.
    #[error("display failed")]
    Display(#[from] std::io::Error),
}

impl EnvError {
    pub(crate) fn illegal_action<A: std::fmt::Debug>(action: &A, legal: &[A]) -> Self {
        EnvError::IllegalAction {
            action: format!("{action:?}"),
            legal: format!("{legal:?}"),
        }
    }
}

impl From<RuleError> for EnvError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::IllegalAction { action, legal, .. } => EnvError::IllegalAction { action, legal },
            RuleError::TerminalState => EnvError::EpisodeOver,
        }
    }
}
