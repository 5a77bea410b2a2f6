use classroom_gym::{
    agent_interface::QValueEstimates,
    agents::{QLearningAgent, QLearningParameters, RandomAgent, ValueIterationAgent},
    display::NullDisplay,
    gridworld::{Board, GridAction, GridState},
    mdp::Mdp,
    prelude::*,
    runner::{run_mdp_episode, EpisodeOptions},
};

fn quiet_config(grid: &str) -> GridworldConfiguration {
    GridworldConfiguration::new()
        .with_grid(grid)
        .with_display(DisplayMode::Quiet)
        .with_fixed_seed(true)
}

#[test]
fn test_book_grid_deterministic_walk() {
    let config = quiet_config("BookGrid").with_noise(0.0);
    let mut env = GridworldEnv::from_configuration(&config).unwrap();
    assert_eq!(env.reset().unwrap(), GridState::at(0, 0));

    let path = [
        (GridAction::North, GridState::at(0, 1)),
        (GridAction::North, GridState::at(0, 2)),
        (GridAction::East, GridState::at(1, 2)),
        (GridAction::East, GridState::at(2, 2)),
        (GridAction::East, GridState::at(3, 2)),
    ];
    for (action, expected) in path {
        let step = env.step(&action).unwrap();
        assert_eq!(step.state, expected);
        assert_eq!(step.reward, 0.0);
        assert!(!step.done);
    }
    assert_eq!(env.possible_actions().as_slice(), &[GridAction::Exit]);

    let step = env.step(&GridAction::Exit).unwrap();
    assert_eq!(step.state, GridState::Terminal);
    assert_eq!(step.reward, 1.0);
    assert!(step.done);
    assert!(env.possible_actions().is_empty());
}

#[test]
fn test_living_reward_is_paid_on_moves() {
    let config = quiet_config("BookGrid").with_noise(0.0).with_living_reward(-0.04);
    let mut env = GridworldEnv::from_configuration(&config).unwrap();
    env.reset().unwrap();
    let step = env.step(&GridAction::East).unwrap();
    assert_eq!(step.reward, -0.04);
}

#[test]
fn test_every_board_starts_with_actions() {
    for board in Board::ALL {
        let mut env = GridworldEnv::from_configuration(&quiet_config(board.name())).unwrap();
        let state = env.reset().unwrap();
        let actions = env.possible_actions();
        assert!(!actions.is_empty(), "{board}");
        assert_eq!(actions, env.possible_actions_for(Some(&state)), "{board}");
        assert_eq!(actions, env.possible_actions(), "{board}");
    }
}

#[test]
fn test_done_matches_empty_catalog_on_random_walks() {
    let mut env = GridworldEnv::from_configuration(&quiet_config("DiscountGrid")).unwrap();
    for _ in 0..20 {
        env.reset().unwrap();
        loop {
            let action = env.sample_action().unwrap();
            let step = env.step(&action).unwrap();
            assert_eq!(step.done, env.possible_actions().is_empty());
            if step.done {
                break;
            }
        }
        assert!(matches!(env.sample_action(), Err(EnvError::EmptyCatalog)));
        assert!(matches!(env.step(&GridAction::North), Err(EnvError::IllegalAction { .. })));
    }
}

#[test]
fn test_fixed_seed_replays_episodes() {
    let run = || {
        let mut env = GridworldEnv::from_configuration(&quiet_config("MazeGrid")).unwrap();
        let mdp = env.mdp().clone();
        let mut agent = RandomAgent::new(move |state: &GridState| mdp.possible_actions(state), Some(5));
        let options = EpisodeOptions {
            max_steps: Some(200),
            ..EpisodeOptions::default()
        };
        run_mdp_episode(&mut env, &mut agent, &options).unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.transitions, second.transitions);
    assert_eq!(first.returns, second.returns);
}

#[test]
fn test_value_iteration_policy_reaches_the_good_exit() {
    let config = quiet_config("BookGrid").with_noise(0.0);
    let mut env = GridworldEnv::from_configuration(&config).unwrap();
    let mut agent = ValueIterationAgent::new(env.mdp().clone(), 0.9, 100);
    let report = run_mdp_episode(&mut env, &mut agent, &EpisodeOptions::default()).unwrap();

    assert!(report.finished);
    assert_eq!(report.final_state, GridState::Terminal);
    assert_eq!(report.transitions.len(), 6);
    assert_eq!(report.transitions.last().unwrap().reward, 1.0);
    assert!((report.returns - 0.9f64.powi(5)).abs() < 1e-12);
}

#[test]
fn test_q_learning_learns_from_episodes() {
    let mut env = GridworldEnv::new(Board::BridgeGrid.build().unwrap(), Box::new(NullDisplay), Some(9)).unwrap();
    let mdp = env.mdp().clone();
    let params = QLearningParameters {
        epsilon: 1.0,
        alpha: 0.5,
        discount: 0.9,
        num_training: 5,
    };
    let mut agent = QLearningAgent::new(move |state: &GridState| mdp.possible_actions(state), params, Some(2));

    for episode in 1..=5 {
        let report = run_mdp_episode(&mut env, &mut agent, &EpisodeOptions::default()).unwrap();
        assert!(report.finished);
        assert_eq!(agent.episodes_so_far(), episode);
    }
    assert!(!agent.is_in_training());

    // Every episode ends on an exit, so some exit Q-value moved away from zero.
    let exits = (0..7).flat_map(|x| [0, 1, 2].map(|y| GridState::at(x, y)));
    let learned = exits
        .filter(|state| env.mdp().possible_actions(state) == vec![GridAction::Exit])
        .any(|state| agent.get_q_value(&state, &GridAction::Exit) != 0.0);
    assert!(learned);
}

#[test]
fn test_max_steps_cuts_episode() {
    let config = quiet_config("MazeGrid").with_noise(0.0);
    let mut env = GridworldEnv::from_configuration(&config).unwrap();
    let mut agent = RandomAgent::new(|_: &GridState| vec![GridAction::West], Some(0));
    let options = EpisodeOptions {
        max_steps: Some(3),
        ..EpisodeOptions::default()
    };
    let report = run_mdp_episode(&mut env, &mut agent, &options).unwrap();
    assert!(!report.finished);
    assert_eq!(report.transitions.len(), 3);
    assert_eq!(report.final_state, GridState::at(0, 0));
}

#[test]
fn test_agent_without_action_fails_the_episode() {
    let mut env = GridworldEnv::from_configuration(&quiet_config("BookGrid")).unwrap();
    let mut agent = RandomAgent::new(|_: &GridState| Vec::<GridAction>::new(), Some(0));
    let err = run_mdp_episode(&mut env, &mut agent, &EpisodeOptions::default()).unwrap_err();
    assert!(matches!(err, EnvError::NoAction { agent_idx: 0 }));
}
