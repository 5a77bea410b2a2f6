//! Run agents on a gridworld board.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::Level;

use classroom_gym::{
    agent_interface::Agent,
    agents::{ManualAgent, QLearningAgent, QLearningParameters, RandomAgent, ValueIterationAgent},
    configuration::{DisplayMode, GridworldConfiguration},
    gridworld::{GridAction, GridState},
    logger::init_console_logger,
    mdp::Mdp,
    mdp_env::GridworldEnv,
    runner::{run_mdp_episode, EpisodeOptions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    Random,
    Value,
    Q,
    Manual,
}

/// Command-line arguments, layered over the `GRIDWORLD_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "gridworld", about = "Run an agent on a stochastic gridworld")]
struct Cli {
    /// Board to use (case sensitive): BookGrid, BridgeGrid, CliffGrid,
    /// CliffGrid2, DiscountGrid or MazeGrid.
    #[arg(short, long)]
    grid: Option<String>,

    /// Reward for living for a time step.
    #[arg(short = 'r', long, allow_negative_numbers = true)]
    living_reward: Option<f64>,

    /// How often an action results in an unintended direction.
    #[arg(short, long)]
    noise: Option<f64>,

    /// Discount on future rewards.
    #[arg(short, long, default_value_t = 0.9)]
    discount: f64,

    /// Chance of taking a random action in Q-learning.
    #[arg(short, long, default_value_t = 0.3)]
    epsilon: f64,

    /// TD learning rate.
    #[arg(short = 'l', long, default_value_t = 0.5)]
    learning_rate: f64,

    /// Rounds of value iteration.
    #[arg(short, long, default_value_t = 10)]
    iterations: usize,

    /// Episodes of the MDP to run.
    #[arg(short = 'k', long, default_value_t = 1)]
    episodes: usize,

    /// Agent type.
    #[arg(short, long, value_enum, default_value_t = AgentKind::Random)]
    agent: AgentKind,

    /// Skip the display of the learning episodes.
    #[arg(short, long)]
    quiet: bool,

    /// Always play with the same seed.
    #[arg(short, long)]
    fixed_seed: bool,

    /// Log every event to a timestamped file.
    #[arg(long)]
    log: bool,

    /// Print debug events on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn build_configuration(cli: &Cli) -> GridworldConfiguration {
    let mut config = GridworldConfiguration::from_env();
    if let Some(grid) = &cli.grid {
        config = config.with_grid(grid.clone());
    }
    if let Some(reward) = cli.living_reward {
        config = config.with_living_reward(reward);
    }
    if let Some(noise) = cli.noise {
        config = config.with_noise(noise);
    }
    if cli.quiet {
        config = config.with_display(DisplayMode::Quiet);
    }
    if cli.fixed_seed {
        config = config.with_fixed_seed(true);
    }
    if cli.log {
        config = config.with_log(true);
    }
    config
}

fn build_agent(cli: &Cli, env: &GridworldEnv, seed: Option<u64>) -> Box<dyn Agent<GridState, GridAction>> {
    let grid = env.mdp().clone();
    let action_fn = move |state: &GridState| grid.possible_actions(state);
    match cli.agent {
        AgentKind::Random => Box::new(RandomAgent::new(action_fn, seed)),
        AgentKind::Value => Box::new(ValueIterationAgent::new(env.mdp().clone(), cli.discount, cli.iterations)),
        AgentKind::Q => Box::new(QLearningAgent::new(
            action_fn,
            QLearningParameters {
                epsilon: cli.epsilon,
                alpha: cli.learning_rate,
                discount: cli.discount,
                num_training: cli.episodes,
            },
            seed,
        )),
        AgentKind::Manual => Box::new(ManualAgent::from_stdin(action_fn)),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if !cli.log {
        init_console_logger(if cli.verbose { Level::DEBUG } else { Level::WARN })?;
    }

    let config = build_configuration(&cli);
    let mut env = GridworldEnv::from_configuration(&config).context("could not build the gridworld")?;
    let mut agent = build_agent(&cli, &env, config.seed().map(|seed| seed + 1));

    let display = !cli.quiet && cli.agent != AgentKind::Manual;
    if display && cli.agent == AgentKind::Value {
        env.render_with(Some(agent.as_ref()))?;
    }

    let options = EpisodeOptions {
        discount: cli.discount,
        render: display,
        max_steps: None,
    };
    let mut total = 0.0;
    for episode in 1..=cli.episodes {
        let report = run_mdp_episode(&mut env, agent.as_mut(), &options)
            .with_context(|| format!("episode {episode} failed"))?;
        println!("EPISODE {episode} COMPLETE: RETURN WAS {}", report.returns);
        total += report.returns;
    }
    if cli.episodes > 0 {
        println!();
        println!("AVERAGE RETURNS FROM START STATE: {}", total / cli.episodes as f64);
        println!();
    }

    if !cli.quiet && matches!(cli.agent, AgentKind::Q | AgentKind::Value) {
        env.render_with(Some(agent.as_ref()))?;
    }
    Ok(())
}
