//! Stochastic grid MDP.
//!
//! A gridworld is a rectangle of cells. The agent moves north, west, south or
//! east; with probability `noise` the move is deflected to one of the two
//! perpendicular directions instead. Moving into a wall or off the grid leaves
//! the agent in place. Exit cells only allow [`GridAction::Exit`], which pays
//! the cell value and ends the episode in [`GridState::Terminal`].

use std::{fmt, str::FromStr};

use crate::{error::EnvError, mdp::Mdp};

mod boards;

pub use boards::Board;

/// Content of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// Not walkable.
    Wall,
    /// Plain walkable cell.
    Empty,
    /// Walkable cell where episodes begin.
    Start,
    /// Exit cell paying the given reward.
    Exit(f64),
}

/// Position of the agent. `y = 0` is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridState {
    /// Absorbing state reached after exiting.
    Terminal,
    /// On the grid.
    Cell {
        /// Column, from the left.
        x: usize,
        /// Row, from the bottom.
        y: usize,
    },
}

impl GridState {
    /// Shorthand for [`GridState::Cell`].
    pub fn at(x: usize, y: usize) -> Self {
        GridState::Cell { x, y }
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridState::Terminal => write!(f, "TERMINAL_STATE"),
            GridState::Cell { x, y } => write!(f, "({x}, {y})"),
        }
    }
}

/// Gridworld actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridAction {
    /// y + 1
    North,
    /// x - 1
    West,
    /// y - 1
    South,
    /// x + 1
    East,
    /// Leave through an exit cell.
    Exit,
}

impl GridAction {
    /// The four moves, in the order they are offered.
    pub const MOVES: [GridAction; 4] = [
        GridAction::North,
        GridAction::West,
        GridAction::South,
        GridAction::East,
    ];

    fn offset(self) -> (isize, isize) {
        match self {
            GridAction::North => (0, 1),
            GridAction::West => (-1, 0),
            GridAction::South => (0, -1),
            GridAction::East => (1, 0),
            GridAction::Exit => (0, 0),
        }
    }

    /// Directions a noisy move can slip to.
    fn perpendicular(self) -> [GridAction; 2] {
        match self {
            GridAction::North | GridAction::South => [GridAction::West, GridAction::East],
            GridAction::West | GridAction::East => [GridAction::North, GridAction::South],
            GridAction::Exit => [GridAction::Exit, GridAction::Exit],
        }
    }
}

impl fmt::Display for GridAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GridAction::North => "north",
            GridAction::West => "west",
            GridAction::South => "south",
            GridAction::East => "east",
            GridAction::Exit => "exit",
        };
        f.write_str(name)
    }
}

impl FromStr for GridAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(GridAction::North),
            "west" | "w" => Ok(GridAction::West),
            "south" | "s" => Ok(GridAction::South),
            "east" | "e" => Ok(GridAction::East),
            "exit" | "x" => Ok(GridAction::Exit),
            other => Err(format!("unknown gridworld action '{other}'")),
        }
    }
}

/// A gridworld MDP.
#[derive(Debug, Clone, PartialEq)]
pub struct Gridworld {
    width: usize,
    height: usize,
    /// Indexed by `y * width + x`.
    cells: Vec<Cell>,
    start: (usize, usize),
    living_reward: f64,
    noise: f64,
}

impl Gridworld {
    /// Build a gridworld from rows listed top row first.
    ///
    /// # Error
    /// Returned when rows have different lengths or there is not exactly one
    /// start cell.
    pub fn from_rows(rows: &[Vec<Cell>]) -> Result<Gridworld, EnvError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return Err(EnvError::InvalidLayout("grid rows must be non-empty and of equal length".to_owned()));
        }

        let mut cells = vec![Cell::Wall; width * height];
        let mut start = None;
        for (ybar, row) in rows.iter().enumerate() {
            let y = height - ybar - 1;
            for (x, cell) in row.iter().enumerate() {
                if *cell == Cell::Start {
                    if start.is_some() {
                        return Err(EnvError::InvalidLayout("grid has several start cells".to_owned()));
                    }
                    start = Some((x, y));
                }
                cells[y * width + x] = *cell;
            }
        }
        let start = start.ok_or_else(|| EnvError::InvalidLayout("grid has no start cell".to_owned()))?;

        Ok(Gridworld {
            width,
            height,
            cells,
            start,
            living_reward: 0.0,
            noise: 0.2,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at `(x, y)`, `y = 0` being the bottom row.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    /// Current living reward.
    pub fn living_reward(&self) -> f64 {
        self.living_reward
    }

    /// Current noise.
    pub fn noise(&self) -> f64 {
        self.noise
    }

    fn is_allowed(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.cell(x as usize, y as usize) != Cell::Wall
    }

    /// Where a deterministic move ends.
    fn destination(&self, x: usize, y: usize, action: GridAction) -> GridState {
        let (dx, dy) = action.offset();
        let (nx, ny) = (x as isize + dx, y as isize + dy);
        if self.is_allowed(nx, ny) {
            GridState::at(nx as usize, ny as usize)
        } else {
            GridState::at(x, y)
        }
    }
}

/// Merge duplicate outcomes, keeping first-seen order.
fn aggregate(successors: Vec<(GridState, f64)>) -> Vec<(GridState, f64)> {
    let mut merged: Vec<(GridState, f64)> = Vec::with_capacity(successors.len());
    for (state, prob) in successors {
        match merged.iter_mut().find(|(s, _)| *s == state) {
            Some((_, total)) => *total += prob,
            None => merged.push((state, prob)),
        }
    }
    merged
}

impl Mdp for Gridworld {
    type State = GridState;
    type Action = GridAction;

    fn states(&self) -> Vec<GridState> {
        let mut states = vec![GridState::Terminal];
        for x in 0..self.width {
            for y in 0..self.height {
                if self.cell(x, y) != Cell::Wall {
                    states.push(GridState::at(x, y));
                }
            }
        }
        states
    }

    fn start_state(&self) -> GridState {
        GridState::at(self.start.0, self.start.1)
    }

    fn possible_actions(&self, state: &GridState) -> Vec<GridAction> {
        match *state {
            GridState::Terminal => vec![],
            GridState::Cell { x, y } => match self.cell(x, y) {
                Cell::Exit(_) => vec![GridAction::Exit],
                Cell::Wall => vec![],
                Cell::Empty | Cell::Start => GridAction::MOVES.to_vec(),
            },
        }
    }

    fn transition_states_and_probs(&self, state: &GridState, action: &GridAction) -> Vec<(GridState, f64)> {
        if !self.possible_actions(state).contains(action) {
            return vec![];
        }
        let GridState::Cell { x, y } = *state else {
            return vec![];
        };
        if let Cell::Exit(_) = self.cell(x, y) {
            return vec![(GridState::Terminal, 1.0)];
        }

        let [left, right] = action.perpendicular();
        aggregate(vec![
            (self.destination(x, y, *action), 1.0 - self.noise),
            (self.destination(x, y, left), self.noise / 2.0),
            (self.destination(x, y, right), self.noise / 2.0),
        ])
    }

    fn reward(&self, state: &GridState, _action: &GridAction, _next_state: &GridState) -> f64 {
        match *state {
            GridState::Terminal => 0.0,
            GridState::Cell { x, y } => match self.cell(x, y) {
                Cell::Exit(value) => value,
                _ => self.living_reward,
            },
        }
    }

    fn is_terminal(&self, state: &GridState) -> bool {
        *state == GridState::Terminal
    }

    fn set_living_reward(&mut self, reward: f64) {
        self.living_reward = reward;
    }

    fn set_noise(&mut self, noise: f64) {
        self.noise = noise;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Gridworld {
        Board::BookGrid.build().unwrap()
    }

    #[test]
    fn test_probabilities_sum_to_one_on_every_board() {
        for board in Board::ALL {
            let mut grid = board.build().unwrap();
            for noise in [0.0, 0.2, 0.5] {
                grid.set_noise(noise);
                for state in grid.states() {
                    for action in grid.possible_actions(&state) {
                        let total: f64 = grid
                            .transition_states_and_probs(&state, &action)
                            .iter()
                            .map(|(_, p)| p)
                            .sum();
                        assert!((total - 1.0).abs() < 1e-9, "{board:?} {state} {action}: {total}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_noisy_move_splits_mass() {
        let grid = book();
        // (1, 0): north is the wall at (1, 1), so the intended move stays put.
        let successors = grid.transition_states_and_probs(&GridState::at(1, 0), &GridAction::North);
        assert_eq!(
            successors,
            vec![
                (GridState::at(1, 0), 0.8),
                (GridState::at(0, 0), 0.1),
                (GridState::at(2, 0), 0.1),
            ]
        );
    }

    #[test]
    fn test_blocked_outcomes_are_merged() {
        let grid = book();
        // Bottom-left corner: south and west both bounce back.
        let successors = grid.transition_states_and_probs(&GridState::at(0, 0), &GridAction::South);
        assert_eq!(successors.len(), 2);
        assert_eq!(successors[0].0, GridState::at(0, 0));
        assert!((successors[0].1 - 0.9).abs() < 1e-12);
        assert_eq!(successors[1], (GridState::at(1, 0), 0.1));
    }

    #[test]
    fn test_exit_cells() {
        let mut grid = book();
        grid.set_living_reward(-0.5);
        let exit = GridState::at(3, 2);
        assert_eq!(grid.possible_actions(&exit), vec![GridAction::Exit]);
        assert_eq!(
            grid.transition_states_and_probs(&exit, &GridAction::Exit),
            vec![(GridState::Terminal, 1.0)]
        );
        assert_eq!(grid.reward(&exit, &GridAction::Exit, &GridState::Terminal), 1.0);
        assert_eq!(grid.reward(&GridState::at(3, 1), &GridAction::Exit, &GridState::Terminal), -1.0);
        assert_eq!(grid.reward(&GridState::at(0, 0), &GridAction::North, &GridState::at(0, 1)), -0.5);
        assert_eq!(grid.reward(&GridState::Terminal, &GridAction::Exit, &GridState::Terminal), 0.0);
    }

    #[test]
    fn test_illegal_pairs_have_no_successor() {
        let grid = book();
        assert!(grid.transition_states_and_probs(&GridState::at(0, 0), &GridAction::Exit).is_empty());
        assert!(grid.transition_states_and_probs(&GridState::Terminal, &GridAction::North).is_empty());
        assert!(grid.possible_actions(&GridState::Terminal).is_empty());
    }

    #[test]
    fn test_states_skip_walls() {
        let grid = book();
        let states = grid.states();
        assert_eq!(states[0], GridState::Terminal);
        assert_eq!(states.len(), 1 + 12 - 1);
        assert!(!states.contains(&GridState::at(1, 1)));
        assert_eq!(grid.start_state(), GridState::at(0, 0));
    }

    #[test]
    fn test_grid_validation() {
        assert!(Gridworld::from_rows(&[vec![Cell::Empty]]).is_err());
        assert!(Gridworld::from_rows(&[vec![Cell::Start, Cell::Empty], vec![Cell::Empty]]).is_err());
        assert!(Gridworld::from_rows(&[vec![Cell::Start, Cell::Start]]).is_err());
        assert!(Gridworld::from_rows(&[vec![Cell::Start, Cell::Exit(1.0)]]).is_ok());
    }

    #[test]
    fn test_action_names() {
        for action in GridAction::MOVES {
            assert_eq!(action.to_string().parse::<GridAction>(), Ok(action));
        }
        assert_eq!("EXIT".parse::<GridAction>(), Ok(GridAction::Exit));
        assert!("up".parse::<GridAction>().is_err());
    }
}
