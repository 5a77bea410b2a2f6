//! # Classroom Gym
//!
//! Reinforcement-learning environments for two classic teaching games, behind
//! one reset/step/render/possible-actions protocol:
//!
//! - a stochastic grid MDP ([`GridworldEnv`](crate::mdp_env::GridworldEnv)),
//!   where every move may slip sideways and exit cells pay a reward,
//! - a turn-based pursuit game ([`PacmanEnv`](crate::turn_game_env::PacmanEnv)),
//!   where pacman and the ghosts play one move each in turn and the reward is
//!   the change of the game score.
//!
//! Agents implement [`Agent`](agent_interface::Agent) and advertise extra
//! capabilities (value estimates, learning hooks, episode notifications)
//! through optional traits, so a random agent, a value iteration planner, a
//! Q-learner or a human at the keyboard can be swapped without touching the
//! driving loop.
//!
//! # Documentation Overview
//!
//! - The driver-facing protocol is the [`Environment`](crate::environment::Environment) trait.
//! - Legal actions come as an [`ActionCatalog`](crate::action_catalog::ActionCatalog).
//! - For configuring the environments, see
//!   [`GridworldConfiguration`](crate::configuration::GridworldConfiguration) and
//!   [`PacmanConfiguration`](crate::configuration::PacmanConfiguration).
//! - To plug another process or game, implement [`Mdp`](crate::mdp::Mdp) or
//!   [`GameRules`](crate::turn_game::GameRules).
//! - Ready-made episode loops live in [`runner`].
//!
//! # Usage Example
//!
//! ```no_run
//! use classroom_gym::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = GridworldConfiguration::new()
//!         .with_grid("BridgeGrid")
//!         .with_display(DisplayMode::Quiet);
//!     let mut env = GridworldEnv::from_configuration(&config)?;
//!
//!     let mut state = env.reset()?;
//!     let mut total = 0.0;
//!     loop {
//!         let action = env.sample_action()?;
//!         let step = env.step(&action)?;
//!         total += step.reward;
//!         state = step.state;
//!         if step.done {
//!             break;
//!         }
//!     }
//!     println!("finished in {state} with return {total}");
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub use agent_interface;
pub use anyhow;

pub mod action_catalog;
pub mod agents;
pub mod configuration;
pub mod display;
pub mod environment;
pub mod error;
pub mod gridworld;
pub mod logger;
pub mod mdp;
pub mod mdp_env;
pub mod pacman;
pub mod runner;
pub mod turn_game;
pub mod turn_game_env;

/// Commonly used types and traits for quick access.
///
/// ```rust
/// use classroom_gym::prelude::*;
/// ```
pub mod prelude {
    pub use crate::action_catalog::ActionCatalog;
    pub use crate::configuration::{DisplayMode, GridworldConfiguration, PacmanConfiguration};
    pub use crate::environment::{Environment, Step};
    pub use crate::error::EnvError;
    pub use crate::mdp_env::{GridworldEnv, MdpEnv};
    pub use crate::turn_game_env::{PacmanEnv, TurnGameEnv};
    pub use agent_interface::Agent;
}
