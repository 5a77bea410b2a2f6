use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use classroom_gym::{
    agent_interface::TransitionObserver,
    agents::RandomAgent,
    display::NullDisplay,
    pacman::{Direction, GameState, Layout, Position},
    prelude::*,
    runner::{run_turn_game, GameOptions, GameSummary},
    turn_game::{Game, GameLayout, GameRules, RuleError, TurnState},
};

use Direction::{East, Stop, West};

/// Moves of the ghost catching pacman on `openLine`, one entry per turn.
const CATCH_SCRIPT: [Direction; 8] = [East, West, East, West, Stop, West, Stop, West];

fn open_line(catch_exceptions: bool) -> PacmanEnv {
    let config = PacmanConfiguration::new()
        .with_layout("openLine")
        .with_display(DisplayMode::Quiet)
        .with_catch_exceptions(catch_exceptions)
        .with_fixed_seed(true);
    PacmanEnv::from_configuration(&config).unwrap()
}

/// Plays a fixed list of moves and logs the rewards it observes.
struct Scripted {
    moves: VecDeque<Direction>,
    observed: Rc<RefCell<Vec<f64>>>,
}

impl Scripted {
    fn boxed(moves: impl IntoIterator<Item = Direction>) -> (Box<dyn Agent<GameState, Direction>>, Rc<RefCell<Vec<f64>>>) {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let agent = Scripted {
            moves: moves.into_iter().collect(),
            observed: Rc::clone(&observed),
        };
        (Box::new(agent), observed)
    }
}

impl Agent<GameState, Direction> for Scripted {
    fn get_action(&mut self, _state: &GameState) -> Option<Direction> {
        self.moves.pop_front()
    }

    fn transition_observer(&mut self) -> Option<&mut dyn TransitionObserver<GameState, Direction>> {
        Some(self)
    }
}

impl TransitionObserver<GameState, Direction> for Scripted {
    fn observe_transition(&mut self, _state: &GameState, _action: &Direction, _next: &GameState, reward: f64) {
        self.observed.borrow_mut().push(reward);
    }
}

#[test]
fn test_catch_trace_rewards_and_turns() {
    let mut env = open_line(false);
    let start = env.reset().unwrap();
    assert_eq!(env.possible_actions().as_slice(), &[East, Stop]);
    assert_eq!(start.pacman_position(), Position::new(1, 1));
    assert_eq!(start.ghost_positions(), vec![Position::new(7, 1)]);

    // (actor, pacman x, ghost x, points) after each move of CATCH_SCRIPT.
    let expected = [
        (0, 2, 7, 9),
        (1, 2, 6, 9),
        (0, 3, 6, 18),
        (1, 3, 5, 18),
        (0, 3, 5, 17),
        (1, 3, 4, 17),
        (0, 3, 4, 16),
        (1, 3, 3, -484),
    ];
    let mut rewards = Vec::new();
    let mut last = None;
    for (turn, (action, (actor, pacman_x, ghost_x, points))) in CATCH_SCRIPT.into_iter().zip(expected).enumerate() {
        assert_eq!(env.agent_idx(), actor, "turn {turn}");
        let step = env.step(&action).unwrap();
        assert_eq!(step.state.pacman_position(), Position::new(pacman_x, 1), "turn {turn}");
        assert_eq!(step.state.ghost_positions(), vec![Position::new(ghost_x, 1)], "turn {turn}");
        assert_eq!(step.state.points(), points, "turn {turn}");
        assert_eq!(step.done, turn == CATCH_SCRIPT.len() - 1, "turn {turn}");
        rewards.push(step.reward);
        last = Some(step);
    }
    assert_eq!(rewards, vec![9.0, 0.0, 9.0, 0.0, -1.0, 0.0, -1.0, -500.0]);
    assert_eq!(env.agent_idx(), 0);

    let last = last.unwrap();
    assert!(last.state.is_lose());
    assert_eq!(rewards.iter().sum::<f64>(), last.state.score() - start.score());
    let finished = last.info.unwrap();
    assert_eq!(finished.game.move_history().len(), CATCH_SCRIPT.len());
    assert_eq!(finished.layout.name(), "openLine");

    assert!(env.possible_actions().is_empty());
    assert!(matches!(env.step(&Stop), Err(EnvError::EpisodeOver)));
}

#[test]
fn test_only_terminal_step_carries_info() {
    let mut env = open_line(false);
    env.reset().unwrap();
    let step = env.step(&East).unwrap();
    assert!(!step.done);
    assert!(step.info.is_none());
}

#[test]
fn test_runner_shares_score_changes() {
    let mut env = open_line(false);
    let pacman_moves = CATCH_SCRIPT.iter().copied().step_by(2);
    let ghost_moves = CATCH_SCRIPT.iter().copied().skip(1).step_by(2);
    let (pacman, pacman_rewards) = Scripted::boxed(pacman_moves);
    let (ghost, ghost_rewards) = Scripted::boxed(ghost_moves);
    let mut agents = vec![pacman, ghost];

    let outcome = run_turn_game(&mut env, &mut agents, &GameOptions::default()).unwrap();
    assert_eq!(outcome.score(), (18 - 2 - 500) as f64);
    assert!(!outcome.is_win());
    assert_eq!(outcome.crashed_agent, None);
    assert_eq!(*pacman_rewards.borrow(), vec![9.0, 9.0, -1.0, -1.0]);
    assert_eq!(*ghost_rewards.borrow(), vec![9.0, 9.0, -1.0, -501.0]);

    let mut summary = GameSummary::new();
    summary.record(&outcome);
    assert_eq!(summary.wins(), 0);
    assert_eq!(summary.average_score(), -484.0);
}

#[test]
fn test_silent_agent_crashes_with_catch() {
    let mut env = open_line(true);
    let (pacman, _) = Scripted::boxed([East]);
    let (ghost, _) = Scripted::boxed([]);
    let mut agents = vec![pacman, ghost];

    let outcome = run_turn_game(&mut env, &mut agents, &GameOptions::default()).unwrap();
    assert_eq!(outcome.crashed_agent, Some(1));
    assert_eq!(outcome.game.crashed_agent(), Some(1));
    assert!(outcome.game.is_over());
    assert_eq!(outcome.game.move_history(), &[(0, East)]);
    assert!(matches!(env.step(&West), Err(EnvError::EpisodeOver)));
}

/// Sleeps before every move.
struct Slow;

impl Agent<GameState, Direction> for Slow {
    fn get_action(&mut self, _state: &GameState) -> Option<Direction> {
        std::thread::sleep(Duration::from_millis(1));
        Some(East)
    }
}

#[test]
fn test_slow_agent_times_out_with_catch() {
    let config = PacmanConfiguration::new()
        .with_layout("openLine")
        .with_display(DisplayMode::Quiet)
        .with_catch_exceptions(true)
        .with_timeout(Duration::ZERO);
    let mut env = PacmanEnv::from_configuration(&config).unwrap();
    let (ghost, _) = Scripted::boxed([West]);
    let mut agents: Vec<Box<dyn Agent<GameState, Direction>>> = vec![Box::new(Slow), ghost];

    let outcome = run_turn_game(&mut env, &mut agents, &GameOptions::default()).unwrap();
    assert_eq!(outcome.crashed_agent, Some(0));
    assert!(outcome.game.agent_timed_out());
    assert_eq!(outcome.game.crashed_agent(), Some(0));
    assert!(outcome.game.is_over());
    assert!(outcome.game.move_history().is_empty());
    assert_eq!(env.agent_idx(), 0);
    assert!(matches!(env.step(&East), Err(EnvError::EpisodeOver)));
}

#[test]
fn test_silent_agent_fails_without_catch() {
    let mut env = open_line(false);
    let (pacman, _) = Scripted::boxed([]);
    let (ghost, _) = Scripted::boxed([]);
    let mut agents = vec![pacman, ghost];

    let err = run_turn_game(&mut env, &mut agents, &GameOptions::default()).unwrap_err();
    assert!(matches!(err, EnvError::NoAction { agent_idx: 0 }));
}

#[test]
fn test_illegal_move_crashes_with_catch() {
    let mut env = open_line(true);
    let (pacman, _) = Scripted::boxed([West]);
    let (ghost, _) = Scripted::boxed([]);
    let mut agents = vec![pacman, ghost];

    let outcome = run_turn_game(&mut env, &mut agents, &GameOptions::default()).unwrap();
    assert_eq!(outcome.crashed_agent, Some(0));
    assert_eq!(outcome.game.move_history(), &[(0, West)]);
    assert_eq!(env.agent_idx(), 0);
}

#[test]
fn test_wrong_agent_count() {
    let mut env = open_line(false);
    let (pacman, _) = Scripted::boxed([East]);
    let mut agents = vec![pacman];
    let err = run_turn_game(&mut env, &mut agents, &GameOptions::default()).unwrap_err();
    assert!(matches!(err, EnvError::AgentCountMismatch { expected: 2, actual: 1 }));
}

#[test]
fn test_every_layout_starts_with_pacman_actions() {
    for name in Layout::NAMES {
        let config = PacmanConfiguration::new()
            .with_layout(name)
            .with_display(DisplayMode::Quiet);
        let mut env = PacmanEnv::from_configuration(&config).unwrap();
        let state = env.reset().unwrap();
        let actions = env.possible_actions();
        assert!(!actions.is_empty(), "{name}");
        assert!(actions.contains(&Stop), "{name}");
        assert_eq!(actions, env.possible_actions(), "{name}");
        assert_eq!(actions, env.possible_actions_for(Some(&state), Some(0)), "{name}");
        for ghost in 1..env.num_agents() {
            assert!(!env.possible_actions_for(None, Some(ghost)).is_empty(), "{name} ghost {ghost}");
            assert!(!env.possible_actions_for(None, Some(ghost)).contains(&Stop), "{name} ghost {ghost}");
        }
    }
}

#[test]
fn test_max_ghosts_limits_agents() {
    let config = PacmanConfiguration::new()
        .with_layout("mediumClassic")
        .with_max_ghosts(1)
        .with_display(DisplayMode::Quiet);
    let mut env = PacmanEnv::from_configuration(&config).unwrap();
    let state = env.reset().unwrap();
    assert_eq!(env.num_agents(), 2);
    assert_eq!(state.ghost_positions().len(), 1);
}

#[test]
fn test_seeded_random_games_repeat() {
    let play = || {
        let mut env = open_line(true);
        let mut agents: Vec<Box<dyn Agent<GameState, Direction>>> = (0..env.num_agents())
            .map(|idx| {
                let agent = RandomAgent::new(move |state: &GameState| state.legal_actions(idx), Some(idx as u64));
                Box::new(agent) as Box<dyn Agent<GameState, Direction>>
            })
            .collect();
        let options = GameOptions {
            quiet: true,
            ..GameOptions::default()
        };
        run_turn_game(&mut env, &mut agents, &options).unwrap()
    };
    let first = play();
    let second = play();
    assert!(first.game.is_over());
    assert_eq!(first.score(), second.score());
    assert_eq!(first.game.move_history(), second.game.move_history());
}

#[test]
fn test_sample_action_is_legal() {
    let mut env = open_line(false);
    env.reset().unwrap();
    for _ in 0..4 {
        let action = env.sample_action().unwrap();
        assert!(env.possible_actions().contains(&action));
        env.step(&action).unwrap();
    }
}

/// Counting game: pacman adds 1 or 3, every ghost takes 1 away, reaching 5 wins.
#[derive(Debug, Clone, PartialEq)]
struct Tally {
    total: i32,
}

impl TurnState for Tally {
    type Action = i32;

    fn legal_actions(&self, agent_idx: usize) -> Vec<i32> {
        match agent_idx {
            _ if self.is_win() => vec![],
            0 => vec![1, 3],
            _ => vec![-1],
        }
    }

    fn generate_successor(&self, agent_idx: usize, action: &i32) -> Result<Self, RuleError> {
        if self.is_win() {
            return Err(RuleError::TerminalState);
        }
        let legal = self.legal_actions(agent_idx);
        if !legal.contains(action) {
            return Err(RuleError::IllegalAction {
                agent_idx,
                action: action.to_string(),
                legal: format!("{legal:?}"),
            });
        }
        Ok(Tally {
            total: self.total + action,
        })
    }

    fn score(&self) -> f64 {
        f64::from(self.total)
    }

    fn is_win(&self) -> bool {
        self.total >= 5
    }

    fn is_lose(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
struct Table;

impl GameLayout for Table {
    fn name(&self) -> &str {
        "table"
    }

    fn num_ghosts(&self) -> usize {
        2
    }
}

struct TallyRules;

impl GameRules for TallyRules {
    type State = Tally;
    type Layout = Table;

    fn layout(&self, name: &str) -> Result<Table, EnvError> {
        match name {
            "table" => Ok(Table),
            _ => Err(EnvError::UnknownLayout(name.to_owned())),
        }
    }

    fn new_game(&self, _layout: &Table, num_ghosts: usize, quiet: bool, catch_exceptions: bool) -> Game<Tally> {
        Game::new(Tally { total: 0 }, num_ghosts + 1, quiet, catch_exceptions)
    }

    fn process(&self, game: &mut Game<Tally>) {
        if game.state.is_win() || game.state.is_lose() {
            game.set_game_over();
        }
    }

    fn move_timeout(&self, _agent_idx: usize) -> Duration {
        Duration::from_secs(1)
    }

    fn max_total_time(&self, _agent_idx: usize) -> Duration {
        Duration::from_secs(10)
    }
}

#[test]
fn test_generic_engine_rewards_are_score_deltas() {
    let mut env = TurnGameEnv::new(TallyRules, "table", 5, false, Box::new(NullDisplay), Some(1)).unwrap();
    assert_eq!(env.num_ghosts(), 2);
    env.reset().unwrap();

    let script = [(0, 3, 3.0), (1, -1, -1.0), (2, -1, -1.0), (0, 3, 3.0), (1, -1, -1.0), (2, -1, -1.0)];
    for (agent_idx, action, reward) in script {
        assert_eq!(env.agent_idx(), agent_idx);
        let step = env.step(&action).unwrap();
        assert_eq!(step.reward, reward);
        assert!(!step.done);
    }

    let step = env.step(&3).unwrap();
    assert_eq!(step.reward, 3.0);
    assert!(step.done);
    assert_eq!(step.state, Tally { total: 5 });
    let finished = step.info.clone().unwrap();
    assert_eq!(finished.game.state, Tally { total: 5 });
    assert!(format!("{finished:?}").contains("Table"));
    assert_eq!(env.agent_idx(), 1);
    assert!(matches!(env.step(&-1), Err(EnvError::EpisodeOver)));
}

#[test]
fn test_generic_engine_respects_max_ghosts() {
    let mut env = TurnGameEnv::new(TallyRules, "table", 0, false, Box::new(NullDisplay), None).unwrap();
    assert_eq!(env.num_agents(), 1);
    env.reset().unwrap();
    env.step(&1).unwrap();
    assert_eq!(env.agent_idx(), 0);
    assert!(TurnGameEnv::new(TallyRules, "chair", 0, false, Box::new(NullDisplay), None).is_err());
}

#[test]
fn test_generic_engine_crash_keeps_turn() {
    let mut env = TurnGameEnv::new(TallyRules, "table", 1, true, Box::new(NullDisplay), Some(2)).unwrap();
    env.reset().unwrap();
    env.step(&1).unwrap();
    let err = env.step(&7).unwrap_err();
    assert!(matches!(err, EnvError::ActorCrash { agent_idx: 1, .. }));
    assert_eq!(env.agent_idx(), 1);
    let game = env.game().unwrap();
    assert_eq!(game.crashed_agent(), Some(1));
    assert_eq!(game.move_history(), &[(0, 1), (1, 7)]);
}
