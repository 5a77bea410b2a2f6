//! Environment adapter over a Markov decision process.
//!
//! [`MdpEnv`] holds the current state of an [`Mdp`], samples successors from
//! its noisy transition model with its own seeded generator and reports the
//! MDP reward of the exact transition taken. An episode is over as soon as
//! the reached state has no legal action.

use agent_interface::Agent;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, instrument, trace, warn};

use crate::{
    action_catalog::ActionCatalog,
    configuration::{DisplayMode, GridworldConfiguration},
    display::{MdpDisplay, NullDisplay, TextGridworldDisplay, ZeroEstimates},
    environment::{Environment, Step},
    error::EnvError,
    gridworld::{Board, Gridworld},
    logger::init_logger,
    mdp::Mdp,
};

/// Slack allowed on the total probability mass of a transition.
const PROB_EPSILON: f64 = 1e-9;

/// Adapter exposing an [`Mdp`] through the [`Environment`] protocol.
pub struct MdpEnv<M: Mdp> {
    mdp: M,
    state: M::State,
    actions: ActionCatalog<M::Action>,
    display: Box<dyn MdpDisplay<M::State, M::Action>>,
    rng: StdRng,
    seed: u64,
}

/// The gridworld environment.
pub type GridworldEnv = MdpEnv<Gridworld>;

impl<M: Mdp> MdpEnv<M> {
    /// Start `display` and place the agent on the start state.
    ///
    /// `seed` drives every transition; `None` picks a random one.
    pub fn new(
        mdp: M,
        mut display: Box<dyn MdpDisplay<M::State, M::Action>>,
        seed: Option<u64>,
    ) -> Result<Self, EnvError> {
        display.start()?;
        let seed = seed.unwrap_or_else(rand::random);
        let state = mdp.start_state();
        let actions = ActionCatalog::from_actions(mdp.possible_actions(&state));
        debug!(seed, ?state, "mdp environment created");
        Ok(MdpEnv {
            mdp,
            state,
            actions,
            display,
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    /// Underlying process.
    pub fn mdp(&self) -> &M {
        &self.mdp
    }

    /// Current state.
    pub fn state(&self) -> &M::State {
        &self.state
    }

    /// Seed currently driving the generator.
    pub fn current_seed(&self) -> u64 {
        self.seed
    }

    /// Every state of the process.
    pub fn observation_space(&self) -> Vec<M::State> {
        self.mdp.states()
    }

    /// Legal actions in `state`, or in the current state when `None`.
    pub fn possible_actions_for(&self, state: Option<&M::State>) -> ActionCatalog<M::Action> {
        match state {
            Some(state) => ActionCatalog::from_actions(self.mdp.possible_actions(state)),
            None => self.actions.clone(),
        }
    }

    /// Uniformly random legal action, drawn with the environment generator.
    pub fn sample_action(&mut self) -> Result<M::Action, EnvError> {
        self.actions.sample(&mut self.rng).cloned()
    }

    /// Show the estimates of `agent`: Q-values when it has them, else state
    /// values, else zeros. Then pause the display.
    pub fn render_with(&mut self, agent: Option<&dyn Agent<M::State, M::Action>>) -> Result<(), EnvError> {
        if let Some(estimates) = agent.and_then(|agent| agent.q_value_estimates()) {
            self.display.display_q_values(estimates, &self.state, "CURRENT Q-VALUES")?;
        } else if let Some(estimates) = agent.and_then(|agent| agent.value_estimates()) {
            self.display.display_values(estimates, &self.state, "CURRENT VALUES")?;
        } else {
            self.display.display_values(&ZeroEstimates, &self.state, "CURRENT VALUES")?;
        }
        self.display.pause()?;
        Ok(())
    }

    fn sample_next_state(&mut self, action: &M::Action) -> Result<M::State, EnvError> {
        let successors = self.mdp.transition_states_and_probs(&self.state, action);
        pick_successor(successors, self.rng.random())
    }
}

/// Successor selected by `draw`, a uniform number in `[0, 1)`, walking the
/// cumulative distribution.
///
/// When rounding leaves the total slightly under 1 and `draw` lands past it,
/// the last successor with a positive probability is returned.
fn pick_successor<S>(successors: Vec<(S, f64)>, draw: f64) -> Result<S, EnvError> {
    if let Some((_, probability)) = successors.iter().find(|(_, prob)| !(0.0..=1.0).contains(prob)) {
        return Err(EnvError::InvalidProbability {
            probability: *probability,
        });
    }
    let total: f64 = successors.iter().map(|(_, prob)| prob).sum();
    if (total - 1.0).abs() > PROB_EPSILON {
        return Err(EnvError::MalformedTransitions { total });
    }

    let mut cumulative = 0.0;
    let mut fallback = None;
    for (next, prob) in successors {
        if prob == 0.0 {
            continue;
        }
        cumulative += prob;
        if draw < cumulative {
            return Ok(next);
        }
        fallback = Some(next);
    }
    fallback.ok_or(EnvError::MalformedTransitions { total })
}

impl MdpEnv<Gridworld> {
    /// Build a gridworld environment from `config`.
    ///
    /// # Error
    /// [`EnvError::UnknownBoard`] when the board name is not registered.
    pub fn from_configuration(config: &GridworldConfiguration) -> Result<Self, EnvError> {
        if config.log {
            if let Err(err) = init_logger() {
                warn!("could not initialize the logger: {err:#}");
            }
        }
        let mut grid = Board::from_name(config.grid())?.build()?;
        grid.set_living_reward(config.living_reward);
        grid.set_noise(config.noise);
        let display: Box<dyn MdpDisplay<_, _>> = match config.display {
            DisplayMode::Text => Box::new(TextGridworldDisplay::new(grid.clone())),
            DisplayMode::Quiet => Box::new(NullDisplay),
        };
        Self::new(grid, display, config.seed())
    }
}

impl<M: Mdp> Environment for MdpEnv<M> {
    type State = M::State;
    type Action = M::Action;
    type Info = ();

    fn reset(&mut self) -> Result<M::State, EnvError> {
        self.state = self.mdp.start_state();
        self.actions = ActionCatalog::from_actions(self.mdp.possible_actions(&self.state));
        trace!(state = ?self.state, "reset");
        Ok(self.state.clone())
    }

    #[instrument(level = "trace", skip(self))]
    fn step(&mut self, action: &M::Action) -> Result<Step<M::State, ()>, EnvError> {
        if !self.actions.contains(action) {
            return Err(EnvError::illegal_action(action, self.actions.as_slice()));
        }
        let next = self.sample_next_state(action)?;
        let reward = self.mdp.reward(&self.state, action, &next);
        self.state = next;
        self.actions = ActionCatalog::from_actions(self.mdp.possible_actions(&self.state));
        let done = self.actions.is_empty();
        trace!(state = ?self.state, reward, done);
        Ok(Step {
            state: self.state.clone(),
            reward,
            done,
            info: (),
        })
    }

    fn possible_actions(&self) -> ActionCatalog<M::Action> {
        self.possible_actions_for(None)
    }

    fn render(&mut self) -> Result<(), EnvError> {
        self.render_with(None)
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        self.seed = seed.unwrap_or_else(rand::random);
        self.rng = StdRng::seed_from_u64(self.seed);
        vec![self.seed]
    }
}
