//! Turn-based game engine seen by [`TurnGameEnv`](crate::turn_game_env::TurnGameEnv).
//!
//! A game engine provides three things:
//! - a [`TurnState`]: immutable snapshots that know the legal actions of every
//!   actor and how to produce a successor,
//! - a [`GameLayout`]: the board a game is played on,
//! - [`GameRules`]: layout registry, game creation, terminal detection and
//!   fault handling.
//!
//! [`Game`] is the per-episode bookkeeping shared by every engine.

use std::{fmt::Debug, time::Duration};

use tracing::{debug, warn};

use crate::error::EnvError;

/// Failures of successor generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The actor cannot play this action here.
    #[error("illegal action {action} for agent {agent_idx} (legal actions: {legal})")]
    IllegalAction {
        /// Actor that tried to play.
        agent_idx: usize,
        /// Debug rendering of the action.
        action: String,
        /// Debug rendering of the legal actions.
        legal: String,
    },

    /// The state is already won or lost.
    #[error("can't generate a successor of a terminal state")]
    TerminalState,
}

/// Snapshot of a turn-based game.
pub trait TurnState: Clone + Debug {
    /// Action token.
    type Action: Clone + PartialEq + Debug;

    /// Legal actions of `agent_idx`, empty once the game is decided.
    fn legal_actions(&self, agent_idx: usize) -> Vec<Self::Action>;

    /// State reached when `agent_idx` plays `action`.
    ///
    /// # Error
    /// [`RuleError::IllegalAction`] when `action` is not legal for this actor,
    /// [`RuleError::TerminalState`] when the game is already decided.
    fn generate_successor(&self, agent_idx: usize, action: &Self::Action) -> Result<Self, RuleError>;

    /// Global score.
    fn score(&self) -> f64;

    /// True when the game is won.
    fn is_win(&self) -> bool;

    /// True when the game is lost.
    fn is_lose(&self) -> bool;
}

/// Board a game is played on.
pub trait GameLayout: Clone + Debug {
    /// Registered name.
    fn name(&self) -> &str;

    /// Number of ghosts the board declares.
    fn num_ghosts(&self) -> usize;
}

/// What the rules engine should implement.
pub trait GameRules {
    /// Snapshot type.
    type State: TurnState;
    /// Board type.
    type Layout: GameLayout;

    /// Resolve a layout by name.
    ///
    /// # Error
    /// [`EnvError::UnknownLayout`] for unregistered names.
    fn layout(&self, name: &str) -> Result<Self::Layout, EnvError>;

    /// Fresh game on `layout` with at most `num_ghosts` ghosts.
    fn new_game(
        &self,
        layout: &Self::Layout,
        num_ghosts: usize,
        quiet: bool,
        catch_exceptions: bool,
    ) -> Game<Self::State>;

    /// Check terminal conditions on the current state, marking the game over
    /// when they hold.
    fn process(&self, game: &mut Game<Self::State>);

    /// Mark `agent_idx` as crashed, which ends the game.
    fn agent_crash(&self, game: &mut Game<Self::State>, agent_idx: usize) {
        warn!(agent_idx, "agent crashed");
        game.mark_crashed(agent_idx);
    }

    /// Longest time an actor may think about a single move.
    fn move_timeout(&self, agent_idx: usize) -> Duration;

    /// Longest time an actor may think over a whole game.
    fn max_total_time(&self, agent_idx: usize) -> Duration;
}

/// One episode of a turn-based game.
#[derive(Debug, Clone)]
pub struct Game<S: TurnState> {
    /// Current state.
    pub state: S,
    move_history: Vec<(usize, S::Action)>,
    num_agents: usize,
    game_over: bool,
    crashed_agent: Option<usize>,
    agent_timeout: bool,
    muted_agent: Option<usize>,
    quiet: bool,
    catch_exceptions: bool,
}

impl<S: TurnState> Game<S> {
    /// Start a game from `state` with `num_agents` actors.
    pub fn new(state: S, num_agents: usize, quiet: bool, catch_exceptions: bool) -> Self {
        Game {
            state,
            move_history: Vec::new(),
            num_agents,
            game_over: false,
            crashed_agent: None,
            agent_timeout: false,
            muted_agent: None,
            quiet,
            catch_exceptions,
        }
    }

    /// Append a move to the history.
    pub fn record_move(&mut self, agent_idx: usize, action: S::Action) {
        self.move_history.push((agent_idx, action));
    }

    /// Every move played so far, with the actor that played it.
    pub fn move_history(&self) -> &[(usize, S::Action)] {
        &self.move_history
    }

    /// Number of actors.
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// True once the rules ended the game.
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// End the game.
    pub fn set_game_over(&mut self) {
        self.game_over = true;
    }

    /// Silence an actor while the engine handles its failure.
    pub fn mute(&mut self, agent_idx: usize) {
        debug!(agent_idx, "mute");
        self.muted_agent = Some(agent_idx);
    }

    /// Undo [`mute`](Self::mute).
    pub fn unmute(&mut self) {
        self.muted_agent = None;
    }

    /// Actor currently muted, if any.
    pub fn muted_agent(&self) -> Option<usize> {
        self.muted_agent
    }

    /// Record a crash and end the game.
    pub fn mark_crashed(&mut self, agent_idx: usize) {
        self.crashed_agent = Some(agent_idx);
        self.game_over = true;
    }

    /// Actor that crashed, if any.
    pub fn crashed_agent(&self) -> Option<usize> {
        self.crashed_agent
    }

    /// Record that the crash was a timeout.
    pub fn mark_timeout(&mut self) {
        self.agent_timeout = true;
    }

    /// True when an actor ran out of time.
    pub fn agent_timed_out(&self) -> bool {
        self.agent_timeout
    }

    /// Quiet games do not announce their result.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether actor failures are turned into crashes.
    pub fn catch_exceptions(&self) -> bool {
        self.catch_exceptions
    }
}
