//! Ready-made agents.
//!
//! Agents that need the legal actions of a state receive an *action function*
//! at construction, usually built from
//! [`MdpEnv::possible_actions_for`](crate::mdp_env::MdpEnv::possible_actions_for)
//! or [`TurnState::legal_actions`](crate::turn_game::TurnState::legal_actions).
//! Every agent owning randomness owns its own seeded generator.

mod greedy;
mod manual;
mod q_learning;
mod random;
mod value_iteration;

pub use greedy::GreedyAgent;
pub use manual::ManualAgent;
pub use q_learning::{QLearningAgent, QLearningParameters};
pub use random::RandomAgent;
pub use value_iteration::ValueIterationAgent;

/// Legal actions of a state, as seen by an agent.
pub type ActionFn<S, A> = Box<dyn Fn(&S) -> Vec<A>>;
