//! Episode loops driving agents through the environments.
//!
//! Both loops follow the same protocol: reset, notify the agents, then ask
//! the acting agent for an action, step, feed the transition back to the
//! agent, until the environment reports `done`.

use std::{
    fmt,
    time::{Duration, Instant},
};

use agent_interface::Agent;
use tracing::{debug, info, instrument, warn};

use crate::{
    environment::Environment,
    error::EnvError,
    mdp::Mdp,
    mdp_env::MdpEnv,
    turn_game::{Game, GameRules, TurnState},
    turn_game_env::TurnGameEnv,
};

/// Options of [`run_mdp_episode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOptions {
    /// Discount applied to the return.
    pub discount: f64,
    /// Show the agent estimates after every step.
    pub render: bool,
    /// Stop after this many steps even if the episode is not over.
    pub max_steps: Option<usize>,
}

impl Default for EpisodeOptions {
    fn default() -> Self {
        EpisodeOptions {
            discount: 0.9,
            render: false,
            max_steps: None,
        }
    }
}

/// One executed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S, A> {
    /// Where the agent was.
    pub state: S,
    /// What it played.
    pub action: A,
    /// Where it landed.
    pub next_state: S,
    /// What it got.
    pub reward: f64,
}

/// Result of [`run_mdp_episode`].
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport<S, A> {
    /// Discounted sum of the rewards.
    pub returns: f64,
    /// Every transition, in order.
    pub transitions: Vec<Transition<S, A>>,
    /// Last state reached.
    pub final_state: S,
    /// False when `max_steps` cut the episode short.
    pub finished: bool,
}

/// Play one episode of `env` with `agent`.
///
/// After each step the agent sees the transition through its
/// [`TransitionObserver`](agent_interface::TransitionObserver), or through its
/// [`Learner`](agent_interface::Learner) when it only has that.
///
/// # Error
/// Environment errors abort the episode. [`EnvError::NoAction`] when the agent
/// has nothing to play in a non-terminal state.
#[instrument(level = "debug", skip_all)]
pub fn run_mdp_episode<M: Mdp>(
    env: &mut MdpEnv<M>,
    agent: &mut dyn Agent<M::State, M::Action>,
    options: &EpisodeOptions,
) -> Result<EpisodeReport<M::State, M::Action>, EnvError> {
    let mut state = env.reset()?;
    debug!(?state, "episode started");
    if let Some(listener) = agent.episode_listener() {
        listener.register_initial_state(&state);
    }
    if options.render {
        env.render_with(Some(&*agent))?;
    }

    let mut transitions = Vec::new();
    let mut returns = 0.0;
    let mut discount = 1.0;
    let mut finished = false;
    while options.max_steps.map_or(true, |max| transitions.len() < max) {
        let action = agent.get_action(&state).ok_or(EnvError::NoAction { agent_idx: 0 })?;
        let step = env.step(&action)?;
        debug!(?state, ?action, next_state = ?step.state, reward = step.reward);

        returns += step.reward * discount;
        discount *= options.discount;
        if let Some(observer) = agent.transition_observer() {
            observer.observe_transition(&state, &action, &step.state, step.reward);
        } else if let Some(learner) = agent.learner() {
            learner.update(&state, &action, &step.state, step.reward);
        }
        if options.render {
            env.render_with(Some(&*agent))?;
        }

        transitions.push(Transition {
            state,
            action,
            next_state: step.state.clone(),
            reward: step.reward,
        });
        state = step.state;
        if step.done {
            finished = true;
            break;
        }
    }

    if let Some(listener) = agent.episode_listener() {
        listener.final_state(&state);
    }
    debug!(returns, steps = transitions.len(), finished, "episode ended");
    Ok(EpisodeReport {
        returns,
        transitions,
        final_state: state,
        finished,
    })
}

/// Options of [`run_turn_game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameOptions {
    /// No announcements and no rendering.
    pub quiet: bool,
    /// Push every state to the display.
    pub render: bool,
    /// Draw the first frame before the first action.
    pub initialize_display_early: bool,
}

/// Result of [`run_turn_game`].
pub struct GameOutcome<R: GameRules> {
    /// The finished game.
    pub game: Game<R::State>,
    /// The board it was played on.
    pub layout: R::Layout,
    /// Actor that crashed, if any.
    pub crashed_agent: Option<usize>,
}

impl<R: GameRules> fmt::Debug for GameOutcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameOutcome")
            .field("game", &self.game)
            .field("layout", &self.layout)
            .field("crashed_agent", &self.crashed_agent)
            .finish()
    }
}

impl<R: GameRules> Clone for GameOutcome<R> {
    fn clone(&self) -> Self {
        GameOutcome {
            game: self.game.clone(),
            layout: self.layout.clone(),
            crashed_agent: self.crashed_agent,
        }
    }
}

impl<R: GameRules> GameOutcome<R> {
    /// Final score.
    pub fn score(&self) -> f64 {
        self.game.state.score()
    }

    /// True when pacman won.
    pub fn is_win(&self) -> bool {
        self.game.state.is_win()
    }
}

/// Play one game of `env`, `agents[i]` acting for agent index `i`.
///
/// Each agent's transition observer receives, after its own move, the sum of
/// the latest reward of every agent: the score change since this agent last
/// played. With `catch_exceptions`, an agent exceeding the rules' time limits
/// or returning no action crashes and the game ends.
///
/// # Error
/// [`EnvError::AgentCountMismatch`] when `agents` does not match the game.
/// Without `catch_exceptions`, any agent or environment failure.
#[instrument(level = "debug", skip_all)]
pub fn run_turn_game<R: GameRules>(
    env: &mut TurnGameEnv<R>,
    agents: &mut [Box<dyn Agent<R::State, <R::State as TurnState>::Action>>],
    options: &GameOptions,
) -> Result<GameOutcome<R>, EnvError> {
    if agents.len() != env.num_agents() {
        return Err(EnvError::AgentCountMismatch {
            expected: env.num_agents(),
            actual: agents.len(),
        });
    }

    let mut state = env.reset_with(options.quiet, options.initialize_display_early)?;
    for agent in agents.iter_mut() {
        if let Some(listener) = agent.episode_listener() {
            listener.register_initial_state(&state);
        }
    }

    let catch_exceptions = env.catch_exceptions();
    let mut rewards = vec![0.0; agents.len()];
    let mut think_time = vec![Duration::ZERO; agents.len()];
    let crashed_agent = loop {
        let agent_idx = env.agent_idx();
        let agent = &mut agents[agent_idx];

        let started = Instant::now();
        let action = agent.get_action(&state);
        let elapsed = started.elapsed();
        think_time[agent_idx] += elapsed;
        if catch_exceptions
            && (elapsed > env.rules().move_timeout(agent_idx)
                || think_time[agent_idx] > env.rules().max_total_time(agent_idx))
        {
            let err = env.time_out_agent(agent_idx, elapsed);
            warn!("{err}");
            break Some(agent_idx);
        }

        let Some(action) = action else {
            if catch_exceptions {
                let err = env.crash_agent(agent_idx, "no action");
                warn!("{err}");
                break Some(agent_idx);
            }
            return Err(EnvError::NoAction { agent_idx });
        };

        let step = match env.step(&action) {
            Ok(step) => step,
            Err(err @ EnvError::ActorCrash { .. }) => {
                warn!("{err}");
                break Some(agent_idx);
            }
            Err(err) => return Err(err),
        };

        rewards[agent_idx] = step.reward;
        if let Some(observer) = agent.transition_observer() {
            observer.observe_transition(&state, &action, &step.state, rewards.iter().sum());
        }
        if options.render && !options.quiet {
            env.render()?;
        }
        state = step.state;
        if step.done {
            break None;
        }
    };

    let game = env.game().cloned().ok_or(EnvError::NotReset)?;
    for agent in agents.iter_mut() {
        if let Some(listener) = agent.episode_listener() {
            listener.final_state(&game.state);
        }
    }
    debug!(score = game.state.score(), ?crashed_agent, moves = game.move_history().len(), "game ended");
    Ok(GameOutcome {
        game,
        layout: env.layout().clone(),
        crashed_agent,
    })
}

/// Statistics over several games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSummary {
    scores: Vec<f64>,
    wins: Vec<bool>,
}

impl GameSummary {
    /// Empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one game.
    pub fn record<R: GameRules>(&mut self, outcome: &GameOutcome<R>) {
        self.push(outcome.score(), outcome.is_win());
    }

    /// Add one result.
    pub fn push(&mut self, score: f64, win: bool) {
        info!(score, win, "game recorded");
        self.scores.push(score);
        self.wins.push(win);
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True when no game was recorded.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores, in order.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Mean score, `0` without games.
    pub fn average_score(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.len() as f64
    }

    /// Number of wins.
    pub fn wins(&self) -> usize {
        self.wins.iter().filter(|win| **win).count()
    }

    /// Share of games won, `0` without games.
    pub fn win_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.wins() as f64 / self.len() as f64
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scores: Vec<String> = self.scores.iter().map(|score| score.to_string()).collect();
        let record: Vec<&str> = self.wins.iter().map(|win| if *win { "Win" } else { "Loss" }).collect();
        writeln!(f, "Average Score: {}", self.average_score())?;
        writeln!(f, "Scores:        {}", scores.join(", "))?;
        writeln!(f, "Win Rate:      {}/{} ({:.2})", self.wins(), self.len(), self.win_rate())?;
        write!(f, "Record:        {}", record.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut summary = GameSummary::new();
        assert_eq!(summary.average_score(), 0.0);
        summary.push(500.0, true);
        summary.push(-400.0, false);
        assert_eq!(summary.average_score(), 50.0);
        assert_eq!(summary.win_rate(), 0.5);
        assert_eq!(
            summary.to_string(),
            "Average Score: 50\nScores:        500, -400\nWin Rate:      1/2 (0.50)\nRecord:        Win, Loss"
        );
    }
}
