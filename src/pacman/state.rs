use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use super::{Direction, Grid, Layout, Position, SCARED_TIME, TIME_PENALTY};
use crate::turn_game::{RuleError, TurnState};

const FOOD_SCORE: i64 = 10;
const WIN_SCORE: i64 = 500;
const GHOST_SCORE: i64 = 200;
const DEATH_PENALTY: i64 = 500;

/// Position and status of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentState {
    /// Agent 0 is the only pacman.
    pub is_pacman: bool,
    /// Where the agent spawned, eaten ghosts go back there.
    pub start: Position,
    /// Current cell.
    pub position: Position,
    /// Last non-stop direction, `Stop` before the first move.
    pub direction: Direction,
    /// Remaining scared moves, only meaningful for ghosts.
    pub scared_timer: u32,
}

impl AgentState {
    fn spawn(is_pacman: bool, position: Position) -> Self {
        AgentState {
            is_pacman,
            start: position,
            position,
            direction: Direction::Stop,
            scared_timer: 0,
        }
    }

    fn respawn(&mut self) {
        self.position = self.start;
        self.direction = Direction::Stop;
        self.scared_timer = 0;
    }

    fn advance(&mut self, direction: Direction) {
        if let Some(next) = self.position.offset(direction.vector()) {
            self.position = next;
        }
        if direction != Direction::Stop {
            self.direction = direction;
        }
    }
}

/// Immutable pacman snapshot. Walls are shared between every state of a game.
#[derive(Debug, Clone)]
pub struct GameState {
    walls: Arc<Grid>,
    agents: Vec<AgentState>,
    food: Grid,
    capsules: Vec<Position>,
    score: i64,
    win: bool,
    lose: bool,
    agent_moved: Option<usize>,
}

impl GameState {
    /// Start of a game on `layout`, keeping the first `num_ghosts` ghosts.
    pub fn initial(layout: &Layout, num_ghosts: usize) -> Self {
        let mut agents = Vec::new();
        let mut ghosts = 0;
        for &(is_pacman, position) in layout.agent_positions() {
            if !is_pacman {
                if ghosts == num_ghosts {
                    continue;
                }
                ghosts += 1;
            }
            agents.push(AgentState::spawn(is_pacman, position));
        }
        GameState {
            walls: Arc::clone(layout.walls()),
            agents,
            food: layout.food().clone(),
            capsules: layout.capsules().to_vec(),
            score: 0,
            win: false,
            lose: false,
            agent_moved: None,
        }
    }

    /// Number of agents in play.
    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// State of `agent_idx`.
    pub fn agent_state(&self, agent_idx: usize) -> Option<&AgentState> {
        self.agents.get(agent_idx)
    }

    /// Pacman's cell.
    pub fn pacman_position(&self) -> Position {
        self.agents[0].position
    }

    /// Ghost states, agent 1 first.
    pub fn ghost_states(&self) -> &[AgentState] {
        &self.agents[1..]
    }

    /// Ghost cells, agent 1 first.
    pub fn ghost_positions(&self) -> Vec<Position> {
        self.ghost_states().iter().map(|ghost| ghost.position).collect()
    }

    /// Remaining food.
    pub fn food(&self) -> &Grid {
        &self.food
    }

    /// Remaining food pellets.
    pub fn num_food(&self) -> usize {
        self.food.count()
    }

    /// Remaining capsules.
    pub fn capsules(&self) -> &[Position] {
        &self.capsules
    }

    /// Maze walls.
    pub fn walls(&self) -> &Arc<Grid> {
        &self.walls
    }

    /// True when `pos` is a wall.
    pub fn has_wall(&self, pos: Position) -> bool {
        self.walls.get(pos)
    }

    /// Agent that produced this state, `None` for the initial state.
    pub fn agent_moved(&self) -> Option<usize> {
        self.agent_moved
    }

    /// Integer score.
    pub fn points(&self) -> i64 {
        self.score
    }

    fn open_directions(&self, position: Position) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |direction| {
            *direction == Direction::Stop
                || position
                    .offset(direction.vector())
                    .is_some_and(|next| !self.has_wall(next))
        })
    }

    fn ghost_actions(&self, ghost: &AgentState) -> Vec<Direction> {
        let mut actions: Vec<Direction> = self
            .open_directions(ghost.position)
            .filter(|direction| *direction != Direction::Stop)
            .collect();
        let reverse = ghost.direction.reverse();
        if actions.len() > 1 {
            actions.retain(|direction| *direction != reverse);
        }
        if actions.is_empty() {
            actions.push(Direction::Stop);
        }
        actions
    }

    fn consume(&mut self, position: Position) {
        if self.food.get(position) {
            self.food.set(position, false);
            self.score += FOOD_SCORE;
            if self.food.count() == 0 && !self.lose {
                self.score += WIN_SCORE;
                self.win = true;
            }
        }
        if let Some(idx) = self.capsules.iter().position(|capsule| *capsule == position) {
            self.capsules.remove(idx);
            for ghost in &mut self.agents[1..] {
                ghost.scared_timer = SCARED_TIME;
            }
        }
    }

    fn check_death(&mut self, agent_idx: usize) {
        let pacman = self.agents[0].position;
        let ghosts: Vec<usize> = if agent_idx == 0 {
            (1..self.agents.len()).collect()
        } else {
            vec![agent_idx]
        };
        for idx in ghosts {
            if self.agents[idx].position != pacman {
                continue;
            }
            if self.agents[idx].scared_timer > 0 {
                self.score += GHOST_SCORE;
                self.agents[idx].respawn();
            } else if !self.win {
                self.score -= DEATH_PENALTY;
                self.lose = true;
            }
        }
    }
}

impl TurnState for GameState {
    type Action = Direction;

    fn legal_actions(&self, agent_idx: usize) -> Vec<Direction> {
        if self.win || self.lose {
            return Vec::new();
        }
        match self.agents.get(agent_idx) {
            None => Vec::new(),
            Some(agent) if agent.is_pacman => self.open_directions(agent.position).collect(),
            Some(ghost) => self.ghost_actions(ghost),
        }
    }

    fn generate_successor(&self, agent_idx: usize, action: &Direction) -> Result<Self, RuleError> {
        if self.win || self.lose {
            return Err(RuleError::TerminalState);
        }
        let legal = self.legal_actions(agent_idx);
        if !legal.contains(action) {
            return Err(RuleError::IllegalAction {
                agent_idx,
                action: format!("{action:?}"),
                legal: format!("{legal:?}"),
            });
        }

        let mut next = self.clone();
        next.agents[agent_idx].advance(*action);
        if agent_idx == 0 {
            next.consume(next.agents[0].position);
        } else {
            let ghost = &mut next.agents[agent_idx];
            ghost.scared_timer = ghost.scared_timer.saturating_sub(1);
        }
        next.check_death(agent_idx);
        if agent_idx == 0 {
            next.score -= TIME_PENALTY;
        }
        next.agent_moved = Some(agent_idx);
        Ok(next)
    }

    fn score(&self) -> f64 {
        self.score as f64
    }

    fn is_win(&self) -> bool {
        self.win
    }

    fn is_lose(&self) -> bool {
        self.lose
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.agents == other.agents
            && self.food == other.food
            && self.capsules == other.capsules
            && self.score == other.score
    }
}

impl Eq for GameState {}

impl Hash for GameState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.agents.hash(state);
        self.food.hash(state);
        self.capsules.hash(state);
        self.score.hash(state);
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = (self.walls.width(), self.walls.height());
        for y in (0..height).rev() {
            let mut row = String::with_capacity(width);
            for x in 0..width {
                let pos = Position { x, y };
                let agent = self.agents.iter().find(|agent| agent.position == pos);
                let c = match agent {
                    Some(agent) if agent.is_pacman => match agent.direction {
                        Direction::North => 'v',
                        Direction::South => '^',
                        Direction::West => '>',
                        _ => '<',
                    },
                    Some(_) => 'G',
                    None if self.walls.get(pos) => '%',
                    None if self.food.get(pos) => '.',
                    None if self.capsules.contains(&pos) => 'o',
                    None => ' ',
                };
                row.push(c);
            }
            writeln!(f, "{row}")?;
        }
        writeln!(f, "Score: {}", self.score)
    }
}
