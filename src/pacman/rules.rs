use std::time::Duration;

use tracing::{info, warn};

use super::{GameState, Layout};
use crate::{
    error::EnvError,
    turn_game::{Game, GameLayout, GameRules, TurnState},
};

/// Classic pacman rules: the game ends as soon as pacman wins or loses.
#[derive(Debug, Clone)]
pub struct ClassicGameRules {
    timeout: Duration,
}

impl ClassicGameRules {
    /// Rules with the given per-move think time.
    pub fn new(timeout: Duration) -> Self {
        ClassicGameRules { timeout }
    }

    fn announce(&self, game: &Game<GameState>, message: &str) {
        info!(score = game.state.points(), "{message}");
        if !game.is_quiet() {
            println!("{message} Score: {}", game.state.points());
        }
    }
}

impl Default for ClassicGameRules {
    fn default() -> Self {
        ClassicGameRules::new(Duration::from_secs(30))
    }
}

impl GameRules for ClassicGameRules {
    type State = GameState;
    type Layout = Layout;

    fn layout(&self, name: &str) -> Result<Layout, EnvError> {
        Layout::by_name(name)
    }

    fn new_game(&self, layout: &Layout, num_ghosts: usize, quiet: bool, catch_exceptions: bool) -> Game<GameState> {
        let num_ghosts = num_ghosts.min(layout.num_ghosts());
        let state = GameState::initial(layout, num_ghosts);
        Game::new(state, num_ghosts + 1, quiet, catch_exceptions)
    }

    fn process(&self, game: &mut Game<GameState>) {
        if game.is_over() {
            return;
        }
        if game.state.is_win() {
            self.announce(game, "Pacman emerges victorious!");
            game.set_game_over();
        } else if game.state.is_lose() {
            self.announce(game, "Pacman died!");
            game.set_game_over();
        }
    }

    fn agent_crash(&self, game: &mut Game<GameState>, agent_idx: usize) {
        let message = if agent_idx == 0 { "Pacman crashed" } else { "A ghost crashed" };
        warn!(agent_idx, "{message}");
        if !game.is_quiet() && game.muted_agent().is_none() {
            eprintln!("{message}");
        }
        game.mark_crashed(agent_idx);
    }

    fn move_timeout(&self, _agent_idx: usize) -> Duration {
        self.timeout
    }

    fn max_total_time(&self, _agent_idx: usize) -> Duration {
        self.timeout
    }
}
