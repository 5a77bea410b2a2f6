//! Environment adapter over a turn-based multi-agent game.
//!
//! Agents play in turn, pacman (index 0) first, then every ghost. After each
//! successful [`step`](Environment::step) the turn passes to the next index,
//! even when the step ended the game. The reward of a step is the change of
//! the global game score it caused, so it is always expressed from pacman's
//! point of view, whoever played.

use std::{fmt, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    action_catalog::ActionCatalog,
    configuration::{DisplayMode, PacmanConfiguration},
    display::{GameDisplay, NullDisplay, TextPacmanDisplay},
    environment::{Environment, Step},
    error::EnvError,
    logger::init_logger,
    pacman::ClassicGameRules,
    turn_game::{Game, GameLayout, GameRules, TurnState},
};

/// What a terminal step carries besides the final state.
pub struct FinishedGame<R: GameRules> {
    /// The game, including its move history.
    pub game: Game<R::State>,
    /// The board it was played on.
    pub layout: R::Layout,
}

impl<R: GameRules> fmt::Debug for FinishedGame<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinishedGame")
            .field("game", &self.game)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<R: GameRules> Clone for FinishedGame<R> {
    fn clone(&self) -> Self {
        FinishedGame {
            game: self.game.clone(),
            layout: self.layout.clone(),
        }
    }
}

/// `info` of a turn game step, `Some` only when the step ended the game.
pub type TurnInfo<R> = Option<FinishedGame<R>>;

/// Adapter exposing [`GameRules`] through the [`Environment`] protocol.
pub struct TurnGameEnv<R: GameRules> {
    rules: R,
    layout: R::Layout,
    num_ghosts: usize,
    num_agents: usize,
    agent_idx: usize,
    catch_exceptions: bool,
    game: Option<Game<R::State>>,
    display: Box<dyn GameDisplay<R::State>>,
    display_initialized: bool,
    rng: StdRng,
    seed: u64,
}

/// The pacman environment.
pub type PacmanEnv = TurnGameEnv<ClassicGameRules>;

impl<R: GameRules> TurnGameEnv<R> {
    /// Resolve `layout_name` and size the game to at most `max_ghosts` ghosts.
    ///
    /// # Error
    /// [`EnvError::UnknownLayout`] when the rules do not know the layout.
    pub fn new(
        rules: R,
        layout_name: &str,
        max_ghosts: usize,
        catch_exceptions: bool,
        display: Box<dyn GameDisplay<R::State>>,
        seed: Option<u64>,
    ) -> Result<Self, EnvError> {
        let layout = rules.layout(layout_name)?;
        let num_ghosts = max_ghosts.min(layout.num_ghosts());
        let seed = seed.unwrap_or_else(rand::random);
        debug!(layout = layout.name(), num_ghosts, seed, "turn game environment created");
        Ok(TurnGameEnv {
            rules,
            layout,
            num_ghosts,
            num_agents: num_ghosts + 1,
            agent_idx: 0,
            catch_exceptions,
            game: None,
            display,
            display_initialized: false,
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    /// Start a new game.
    ///
    /// `quiet` silences the rules' announcements. Agents reading the display
    /// while choosing their first move need `initialize_display_early`.
    pub fn reset_with(&mut self, quiet: bool, initialize_display_early: bool) -> Result<R::State, EnvError> {
        if self.display_initialized {
            self.display.finish()?;
            self.display_initialized = false;
        }
        let game = self
            .rules
            .new_game(&self.layout, self.num_ghosts, quiet, self.catch_exceptions);
        let state = game.state.clone();
        self.game = Some(game);
        self.agent_idx = 0;
        if initialize_display_early {
            self.display.initialize(&state)?;
            self.display_initialized = true;
        }
        trace!(layout = self.layout.name(), "reset");
        Ok(state)
    }

    /// Legal actions of `agent_idx` in `state`; each defaults to the current
    /// one when `None`.
    ///
    /// Before the first reset, asking for the current state gives an empty
    /// catalog.
    pub fn possible_actions_for(
        &self,
        state: Option<&R::State>,
        agent_idx: Option<usize>,
    ) -> ActionCatalog<<R::State as TurnState>::Action> {
        let idx = agent_idx.unwrap_or(self.agent_idx);
        let state = state.or_else(|| self.game.as_ref().map(|game| &game.state));
        ActionCatalog::from_optional(state.map(|state| state.legal_actions(idx)))
    }

    /// Uniformly random legal action for the current actor.
    pub fn sample_action(&mut self) -> Result<<R::State as TurnState>::Action, EnvError> {
        self.possible_actions_for(None, None).sample(&mut self.rng).cloned()
    }

    /// Crash `agent_idx` on the driver's behalf (timeout, no action).
    ///
    /// The game ends and the returned error describes the crash. Without
    /// `catch_exceptions`, nothing changes and the error is returned as is.
    pub fn crash_agent(&mut self, agent_idx: usize, reason: impl Into<String>) -> EnvError {
        let reason = reason.into();
        if let Some(game) = self.game.as_mut().filter(|game| game.catch_exceptions()) {
            warn!(agent_idx, %reason, "crashing agent");
            game.mute(agent_idx);
            self.rules.agent_crash(game, agent_idx);
            game.unmute();
        }
        EnvError::ActorCrash { agent_idx, reason }
    }

    /// Record that the crash of `agent_idx` is due to a timeout, then crash it.
    pub fn time_out_agent(&mut self, agent_idx: usize, elapsed: Duration) -> EnvError {
        if let Some(game) = self.game.as_mut().filter(|game| game.catch_exceptions()) {
            game.mark_timeout();
        }
        self.crash_agent(agent_idx, format!("timed out after {elapsed:?}"))
    }

    /// Actor whose turn it is.
    pub fn agent_idx(&self) -> usize {
        self.agent_idx
    }

    /// Ghosts plus pacman.
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// Ghosts in play.
    pub fn num_ghosts(&self) -> usize {
        self.num_ghosts
    }

    /// Current game, `None` before the first reset.
    pub fn game(&self) -> Option<&Game<R::State>> {
        self.game.as_ref()
    }

    /// Board in use.
    pub fn layout(&self) -> &R::Layout {
        &self.layout
    }

    /// Rules in use.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Whether actor failures are turned into crashes.
    pub fn catch_exceptions(&self) -> bool {
        self.catch_exceptions
    }
}

impl TurnGameEnv<ClassicGameRules> {
    /// Build a pacman environment from `config`.
    ///
    /// # Error
    /// [`EnvError::UnknownLayout`] when the layout name is not registered.
    pub fn from_configuration(config: &PacmanConfiguration) -> Result<Self, EnvError> {
        if config.log {
            if let Err(err) = init_logger() {
                warn!("could not initialize the logger: {err:#}");
            }
        }
        let display: Box<dyn GameDisplay<_>> = match config.display {
            DisplayMode::Text => Box::new(TextPacmanDisplay::new(config.frame_time)),
            DisplayMode::Quiet => Box::new(NullDisplay),
        };
        Self::new(
            ClassicGameRules::new(config.timeout),
            config.layout(),
            config.max_ghosts,
            config.catch_exceptions,
            display,
            config.seed(),
        )
    }
}

impl<R: GameRules> Environment for TurnGameEnv<R> {
    type State = R::State;
    type Action = <R::State as TurnState>::Action;
    type Info = TurnInfo<R>;

    fn reset(&mut self) -> Result<R::State, EnvError> {
        self.reset_with(false, false)
    }

    #[instrument(level = "trace", skip(self), fields(agent_idx = self.agent_idx))]
    fn step(&mut self, action: &Self::Action) -> Result<Step<R::State, TurnInfo<R>>, EnvError> {
        let agent_idx = self.agent_idx;
        let game = self.game.as_mut().ok_or(EnvError::NotReset)?;
        if game.is_over() {
            return Err(EnvError::EpisodeOver);
        }

        let successor = match game.state.generate_successor(agent_idx, action) {
            Ok(successor) => successor,
            Err(err) if game.catch_exceptions() => {
                info!(agent_idx, "{err}");
                game.record_move(agent_idx, action.clone());
                game.mute(agent_idx);
                self.rules.agent_crash(game, agent_idx);
                game.unmute();
                return Err(EnvError::ActorCrash {
                    agent_idx,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        game.record_move(agent_idx, action.clone());
        let reward = successor.score() - game.state.score();
        game.state = successor;
        self.rules.process(game);

        let done = game.is_over();
        let info = done.then(|| FinishedGame {
            game: game.clone(),
            layout: self.layout.clone(),
        });
        let state = game.state.clone();
        self.agent_idx = (agent_idx + 1) % self.num_agents;
        trace!(reward, done, next_agent = self.agent_idx);
        Ok(Step {
            state,
            reward,
            done,
            info,
        })
    }

    fn possible_actions(&self) -> ActionCatalog<Self::Action> {
        self.possible_actions_for(None, None)
    }

    fn render(&mut self) -> Result<(), EnvError> {
        let game = self.game.as_ref().ok_or(EnvError::NotReset)?;
        if !self.display_initialized {
            self.display.initialize(&game.state)?;
            self.display_initialized = true;
        }
        self.display.update(&game.state)?;
        Ok(())
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        self.seed = seed.unwrap_or_else(rand::random);
        self.rng = StdRng::seed_from_u64(self.seed);
        vec![self.seed]
    }
}
