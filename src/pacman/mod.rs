//! Pacman: one pacman (agent 0) against ghosts (agents 1..), on a maze.
//!
//! Pacman pays 1 point per move, earns 10 per food pellet and 500 for
//! clearing the board. Eating a capsule scares every ghost for
//! [`SCARED_TIME`] ghost moves; touching a scared ghost earns 200 and sends
//! it home, touching any other ghost costs 500 and loses the game.

use std::{fmt, str::FromStr};

mod layout;
mod rules;
mod state;

pub use layout::{Grid, Layout, Position};
pub use rules::ClassicGameRules;
pub use state::{AgentState, GameState};

/// Ghost moves a capsule keeps ghosts scared.
pub const SCARED_TIME: u32 = 40;

/// Score lost on every pacman move.
pub const TIME_PENALTY: i64 = 1;

/// Moves, pacman can also stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// y + 1
    North,
    /// y - 1
    South,
    /// x + 1
    East,
    /// x - 1
    West,
    /// Stay in place.
    Stop,
}

impl Direction {
    /// Every direction, in the order legal actions are listed.
    pub const ALL: [Direction; 5] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Stop,
    ];

    /// `(dx, dy)` of a move.
    pub fn vector(self) -> (isize, isize) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }

    /// Opposite direction, `Stop` is its own reverse.
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
            Direction::Stop => "Stop",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" | "w" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" | "d" => Ok(Direction::East),
            "west" | "a" => Ok(Direction::West),
            "stop" | "q" | "" => Ok(Direction::Stop),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}
