//! Config for the environments
//!
//! Configuration can be created programmatically using `new()` and the
//! `with_*` builders, or by reading environment variables using `from_env()`.
//!
//! # Environment Variables
//!
//! All values are optional. Flags are case-insensitive, set them to `"true"`
//! to enable them. Numbers that cannot be parsed fall back to the default.
//!
//! Gridworld ([`GridworldConfiguration`]):
//! - `GRIDWORLD_GRID`: Board name (default: `BookGrid`)
//! - `GRIDWORLD_LIVING_REWARD`: Reward of every non-exit transition (default: `0.0`)
//! - `GRIDWORLD_NOISE`: Probability of a deflected move (default: `0.2`)
//! - `GRIDWORLD_DISPLAY`: `text` or `quiet` (default: `text`)
//! - `GRIDWORLD_FIXED_SEED`: Use [`FIXED_SEED`] (default: `false`)
//!
//! Pacman ([`PacmanConfiguration`]):
//! - `PACMAN_LAYOUT`: Layout name (default: `mediumClassic`)
//! - `PACMAN_MAX_GHOSTS`: Upper bound on the number of ghosts (default: `4`)
//! - `PACMAN_CATCH_EXCEPTIONS`: Turn actor failures into crashes (default: `false`)
//! - `PACMAN_TIMEOUT_SECS`: Think time per move (default: `30`)
//! - `PACMAN_DISPLAY`: `text` or `quiet` (default: `text`)
//! - `PACMAN_FRAME_TIME_MS`: Delay between frames of the text display (default: `100`)
//! - `PACMAN_FIXED_SEED`: Use [`FIXED_SEED`] (default: `false`)
//!
//! Both:
//! - `GYM_LOG`: Enable logging to a file (default: `false`)

use std::{str::FromStr, time::Duration};

/// Seed used when `fixed_seed` is enabled.
pub const FIXED_SEED: u64 = 188;

/// Display backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Text output on stdout.
    #[default]
    Text,
    /// No output at all.
    Quiet,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(DisplayMode::Text),
            "quiet" | "null" | "none" => Ok(DisplayMode::Quiet),
            other => Err(format!("unknown display mode '{other}'")),
        }
    }
}

fn get_env_flag(var: &str, default: bool) -> bool {
    match std::env::var(var) {
        Ok(val) => val.eq_ignore_ascii_case("true"),
        Err(_) => default,
    }
}

fn get_env_parsed<T: FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|val| val.trim().parse().ok())
        .unwrap_or(default)
}

fn get_env_string(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_owned())
}

/// Configuration for [`GridworldEnv`](crate::mdp_env::GridworldEnv).
#[derive(Debug, Clone, PartialEq)]
pub struct GridworldConfiguration {
    pub(crate) grid: String,
    pub(crate) living_reward: f64,
    pub(crate) noise: f64,
    pub(crate) display: DisplayMode,
    pub(crate) fixed_seed: bool,
    pub(crate) log: bool,
}

impl GridworldConfiguration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - The board is `BookGrid`.
    /// - The living reward is `0.0` and the noise `0.2`.
    /// - Values are printed as text.
    /// - The generator is seeded from entropy.
    /// - Logging to file is disabled.
    pub fn new() -> Self {
        Self {
            grid: "BookGrid".to_owned(),
            living_reward: 0.0,
            noise: 0.2,
            display: DisplayMode::Text,
            fixed_seed: false,
            log: false,
        }
    }

    /// Create configuration from environment variables (see module documentation).
    pub fn from_env() -> Self {
        let default = Self::new();
        Self {
            grid: get_env_string("GRIDWORLD_GRID", &default.grid),
            living_reward: get_env_parsed("GRIDWORLD_LIVING_REWARD", default.living_reward),
            noise: get_env_parsed("GRIDWORLD_NOISE", default.noise),
            display: get_env_parsed("GRIDWORLD_DISPLAY", default.display),
            fixed_seed: get_env_flag("GRIDWORLD_FIXED_SEED", default.fixed_seed),
            log: get_env_flag("GYM_LOG", default.log),
        }
    }

    /// Board name.
    pub fn with_grid(mut self, value: impl Into<String>) -> Self {
        self.grid = value.into();
        self
    }

    /// Reward of every non-exit transition.
    pub fn with_living_reward(mut self, value: f64) -> Self {
        self.living_reward = value;
        self
    }

    /// Probability that a move is deflected.
    pub fn with_noise(mut self, value: f64) -> Self {
        self.noise = value;
        self
    }

    /// Display backend.
    pub fn with_display(mut self, value: DisplayMode) -> Self {
        self.display = value;
        self
    }

    /// Enable or disable the fixed seed.
    pub fn with_fixed_seed(mut self, value: bool) -> Self {
        self.fixed_seed = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Board name.
    pub fn grid(&self) -> &str {
        &self.grid
    }

    /// Seed implied by `fixed_seed`.
    pub fn seed(&self) -> Option<u64> {
        self.fixed_seed.then_some(FIXED_SEED)
    }
}

impl Default for GridworldConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for [`PacmanEnv`](crate::turn_game_env::PacmanEnv).
#[derive(Debug, Clone, PartialEq)]
pub struct PacmanConfiguration {
    pub(crate) layout: String,
    pub(crate) max_ghosts: usize,
    pub(crate) catch_exceptions: bool,
    pub(crate) timeout: Duration,
    pub(crate) display: DisplayMode,
    pub(crate) frame_time: Duration,
    pub(crate) fixed_seed: bool,
    pub(crate) log: bool,
}

impl PacmanConfiguration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - The layout is `mediumClassic` with at most 4 ghosts.
    /// - Actor failures propagate as errors.
    /// - Each move may take 30 seconds.
    /// - The board is printed as text every 100 ms.
    /// - The generator is seeded from entropy.
    /// - Logging to file is disabled.
    pub fn new() -> Self {
        Self {
            layout: "mediumClassic".to_owned(),
            max_ghosts: 4,
            catch_exceptions: false,
            timeout: Duration::from_secs(30),
            display: DisplayMode::Text,
            frame_time: Duration::from_millis(100),
            fixed_seed: false,
            log: false,
        }
    }

    /// Create configuration from environment variables (see module documentation).
    pub fn from_env() -> Self {
        let default = Self::new();
        Self {
            layout: get_env_string("PACMAN_LAYOUT", &default.layout),
            max_ghosts: get_env_parsed("PACMAN_MAX_GHOSTS", default.max_ghosts),
            catch_exceptions: get_env_flag("PACMAN_CATCH_EXCEPTIONS", default.catch_exceptions),
            timeout: Duration::from_secs(get_env_parsed("PACMAN_TIMEOUT_SECS", default.timeout.as_secs())),
            display: get_env_parsed("PACMAN_DISPLAY", default.display),
            frame_time: Duration::from_millis(get_env_parsed(
                "PACMAN_FRAME_TIME_MS",
                default.frame_time.as_millis() as u64,
            )),
            fixed_seed: get_env_flag("PACMAN_FIXED_SEED", default.fixed_seed),
            log: get_env_flag("GYM_LOG", default.log),
        }
    }

    /// Layout name.
    pub fn with_layout(mut self, value: impl Into<String>) -> Self {
        self.layout = value.into();
        self
    }

    /// Upper bound on the number of ghosts.
    pub fn with_max_ghosts(mut self, value: usize) -> Self {
        self.max_ghosts = value;
        self
    }

    /// Enable or disable turning actor failures into crashes.
    pub fn with_catch_exceptions(mut self, value: bool) -> Self {
        self.catch_exceptions = value;
        self
    }

    /// Think time per move.
    pub fn with_timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    /// Display backend.
    pub fn with_display(mut self, value: DisplayMode) -> Self {
        self.display = value;
        self
    }

    /// Delay between frames of the text display.
    pub fn with_frame_time(mut self, value: Duration) -> Self {
        self.frame_time = value;
        self
    }

    /// Enable or disable the fixed seed.
    pub fn with_fixed_seed(mut self, value: bool) -> Self {
        self.fixed_seed = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Layout name.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Whether actor failures are turned into crashes.
    pub fn catch_exceptions(&self) -> bool {
        self.catch_exceptions
    }

    /// Display backend.
    pub fn display(&self) -> DisplayMode {
        self.display
    }

    /// Seed implied by `fixed_seed`.
    pub fn seed(&self) -> Option<u64> {
        self.fixed_seed.then_some(FIXED_SEED)
    }
}

impl Default for PacmanConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
