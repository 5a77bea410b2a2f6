//! Play pacman games with the built-in agents.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, warn, Level};

use classroom_gym::{
    agent_interface::Agent,
    agents::{GreedyAgent, ManualAgent, QLearningAgent, QLearningParameters, RandomAgent},
    configuration::{DisplayMode, PacmanConfiguration},
    logger::init_console_logger,
    pacman::{Direction, GameState},
    runner::{run_turn_game, GameOptions, GameSummary},
    turn_game::TurnState,
    turn_game_env::PacmanEnv,
};

type PacmanAgent = Box<dyn Agent<GameState, Direction>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PacmanKind {
    Greedy,
    Random,
    Q,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GhostKind {
    Random,
}

/// Command-line arguments, layered over the `PACMAN_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "pacman", about = "Play pacman games")]
struct Cli {
    /// Number of games to play.
    #[arg(short = 'n', long, default_value_t = 1)]
    games: usize,

    /// Layout to play on.
    #[arg(short, long)]
    layout: Option<String>,

    /// Pacman agent.
    #[arg(short, long, value_enum, default_value_t = PacmanKind::Greedy)]
    pacman: PacmanKind,

    /// Ghost agent.
    #[arg(short, long, value_enum, default_value_t = GhostKind::Random)]
    ghosts: GhostKind,

    /// Maximum number of ghosts.
    #[arg(short = 'k', long)]
    max_ghosts: Option<usize>,

    /// Minimal output and no board.
    #[arg(short, long)]
    quiet: bool,

    /// Delay between frames, in milliseconds.
    #[arg(long)]
    frame_time: Option<u64>,

    /// Always play the same games.
    #[arg(short, long)]
    fixed_seed: bool,

    /// Games used for training; they are not displayed nor counted.
    #[arg(short = 'x', long, default_value_t = 0)]
    training: usize,

    /// Turn agent failures and timeouts into crashes.
    #[arg(short, long)]
    catch_exceptions: bool,

    /// Seconds an agent may think about a move.
    #[arg(long)]
    timeout: Option<u64>,

    /// Log every event to a timestamped file.
    #[arg(long)]
    log: bool,

    /// Print debug events on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn build_configuration(cli: &Cli) -> PacmanConfiguration {
    let mut config = PacmanConfiguration::from_env();
    if let Some(layout) = &cli.layout {
        config = config.with_layout(layout.clone());
    }
    if let Some(max_ghosts) = cli.max_ghosts {
        config = config.with_max_ghosts(max_ghosts);
    }
    if cli.quiet {
        config = config.with_display(DisplayMode::Quiet);
    }
    if let Some(frame_time) = cli.frame_time {
        config = config.with_frame_time(Duration::from_millis(frame_time));
    }
    if cli.fixed_seed {
        config = config.with_fixed_seed(true);
    }
    if cli.catch_exceptions {
        config = config.with_catch_exceptions(true);
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(timeout));
    }
    if cli.log {
        config = config.with_log(true);
    }
    config
}

fn build_agents(cli: &Cli, num_ghosts: usize, seed: Option<u64>) -> Vec<PacmanAgent> {
    let pacman_actions = |state: &GameState| state.legal_actions(0);
    let pacman: PacmanAgent = match cli.pacman {
        PacmanKind::Greedy => Box::new(GreedyAgent::new(seed)),
        PacmanKind::Random => Box::new(RandomAgent::new(pacman_actions, seed)),
        PacmanKind::Q => Box::new(QLearningAgent::new(
            pacman_actions,
            QLearningParameters {
                epsilon: 0.05,
                alpha: 0.2,
                discount: 0.8,
                num_training: cli.training,
            },
            seed,
        )),
        PacmanKind::Manual => Box::new(ManualAgent::from_stdin(pacman_actions)),
    };

    let mut agents = vec![pacman];
    for idx in 1..=num_ghosts {
        let ghost_seed = seed.map(|seed| seed + idx as u64);
        let ghost: PacmanAgent = match cli.ghosts {
            GhostKind::Random => Box::new(RandomAgent::new(
                move |state: &GameState| state.legal_actions(idx),
                ghost_seed,
            )),
        };
        agents.push(ghost);
    }
    agents
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if !cli.log {
        init_console_logger(if cli.verbose { Level::DEBUG } else { Level::WARN })?;
    }

    let config = build_configuration(&cli);
    let mut env = PacmanEnv::from_configuration(&config).context("could not build the pacman environment")?;
    let mut agents = build_agents(&cli, env.num_ghosts(), config.seed().map(|seed| seed + 1));

    let mut summary = GameSummary::new();
    let mut failure = None;
    for game in 0..cli.games {
        let training = game < cli.training;
        let options = GameOptions {
            quiet: training || cli.quiet,
            render: !training && config.display() == DisplayMode::Text,
            initialize_display_early: cli.pacman == PacmanKind::Manual,
        };
        match run_turn_game(&mut env, &mut agents, &options) {
            Ok(outcome) => {
                if let Some(agent_idx) = outcome.crashed_agent {
                    warn!(game, agent_idx, "game ended by a crash");
                }
                if !training {
                    summary.record(&outcome);
                }
            }
            Err(err) => {
                error!(game, "game failed: {err}");
                failure = Some(err);
                break;
            }
        }
    }

    if !summary.is_empty() {
        println!("{summary}");
    }
    match failure {
        Some(err) => Err(err).context("a game could not be completed"),
        None => Ok(()),
    }
}
