//! Visualization backends.
//!
//! Displays only read what they are given, they never influence the
//! dynamics. [`NullDisplay`] discards everything and is what tests use.

use std::io;

use agent_interface::{QValueEstimates, ValueEstimates};

mod text_gridworld;
mod text_pacman;

pub use text_gridworld::TextGridworldDisplay;
pub use text_pacman::TextPacmanDisplay;

/// What an MDP display backend should implement.
pub trait MdpDisplay<S, A> {
    /// Called once, when the environment is built.
    fn start(&mut self) -> io::Result<()>;

    /// Show state values and the greedy policy.
    fn display_values(
        &mut self,
        estimates: &dyn ValueEstimates<S, A>,
        current: &S,
        message: &str,
    ) -> io::Result<()>;

    /// Show per-action values.
    fn display_q_values(
        &mut self,
        estimates: &dyn QValueEstimates<S, A>,
        current: &S,
        message: &str,
    ) -> io::Result<()>;

    /// Wait before the next frame.
    fn pause(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// What a turn-based game display backend should implement.
pub trait GameDisplay<S> {
    /// Draw the first frame.
    fn initialize(&mut self, state: &S) -> io::Result<()>;

    /// Draw the state reached after a move.
    fn update(&mut self, state: &S) -> io::Result<()>;

    /// Close the display.
    fn finish(&mut self) -> io::Result<()>;
}

/// Estimates used when there is no agent to ask: every value is zero and
/// there is no policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroEstimates;

impl<S, A> ValueEstimates<S, A> for ZeroEstimates {
    fn get_value(&self, _state: &S) -> f64 {
        0.0
    }

    fn get_policy(&self, _state: &S) -> Option<A> {
        None
    }
}

impl<S, A> QValueEstimates<S, A> for ZeroEstimates {
    fn get_q_value(&self, _state: &S, _action: &A) -> f64 {
        0.0
    }
}

/// Display that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl<S, A> MdpDisplay<S, A> for NullDisplay {
    fn start(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn display_values(&mut self, _: &dyn ValueEstimates<S, A>, _: &S, _: &str) -> io::Result<()> {
        Ok(())
    }

    fn display_q_values(&mut self, _: &dyn QValueEstimates<S, A>, _: &S, _: &str) -> io::Result<()> {
        Ok(())
    }
}

impl<S> GameDisplay<S> for NullDisplay {
    fn initialize(&mut self, _state: &S) -> io::Result<()> {
        Ok(())
    }

    fn update(&mut self, _state: &S) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}
