use std::{fmt, str::FromStr};

use super::{Cell, Gridworld};
use crate::error::EnvError;

/// Registered gridworld boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    /// 4x3 textbook grid, +1 and -1 exits.
    BookGrid,
    /// Narrow bridge between two cliffs.
    BridgeGrid,
    /// Cliff along the bottom row.
    CliffGrid,
    /// Cliff with a closer, smaller exit.
    CliffGrid2,
    /// Near and distant exits next to a cliff.
    DiscountGrid,
    /// Small maze.
    MazeGrid,
}

impl Board {
    /// Every registered board.
    pub const ALL: [Board; 6] = [
        Board::BookGrid,
        Board::BridgeGrid,
        Board::CliffGrid,
        Board::CliffGrid2,
        Board::DiscountGrid,
        Board::MazeGrid,
    ];

    /// Resolve a board by its (case sensitive) name.
    pub fn from_name(name: &str) -> Result<Board, EnvError> {
        Board::ALL
            .into_iter()
            .find(|board| board.name() == name)
            .ok_or_else(|| EnvError::UnknownBoard(name.to_owned()))
    }

    /// Registered name.
    pub fn name(self) -> &'static str {
        match self {
            Board::BookGrid => "BookGrid",
            Board::BridgeGrid => "BridgeGrid",
            Board::CliffGrid => "CliffGrid",
            Board::CliffGrid2 => "CliffGrid2",
            Board::DiscountGrid => "DiscountGrid",
            Board::MazeGrid => "MazeGrid",
        }
    }

    /// Build a fresh gridworld with default living reward and noise.
    pub fn build(self) -> Result<Gridworld, EnvError> {
        Gridworld::from_rows(&self.rows())
    }

    fn rows(self) -> Vec<Vec<Cell>> {
        use Cell::{Empty as O, Start as S, Wall as W};
        let x = Cell::Exit;
        match self {
            Board::BookGrid => vec![
                vec![O, O, O, x(1.0)],
                vec![O, W, O, x(-1.0)],
                vec![S, O, O, O],
            ],
            Board::BridgeGrid => vec![
                vec![W, x(-100.0), x(-100.0), x(-100.0), x(-100.0), x(-100.0), W],
                vec![x(1.0), S, O, O, O, O, x(10.0)],
                vec![W, x(-100.0), x(-100.0), x(-100.0), x(-100.0), x(-100.0), W],
            ],
            Board::CliffGrid => vec![
                vec![O, O, O, O, O],
                vec![S, O, O, O, x(10.0)],
                vec![x(-100.0), x(-100.0), x(-100.0), x(-100.0), x(-100.0)],
            ],
            Board::CliffGrid2 => vec![
                vec![O, O, O, O, O],
                vec![x(8.0), S, O, O, x(10.0)],
                vec![x(-100.0), x(-100.0), x(-100.0), x(-100.0), x(-100.0)],
            ],
            Board::DiscountGrid => vec![
                vec![O, O, O, O, O],
                vec![O, W, O, O, O],
                vec![O, W, x(1.0), W, x(10.0)],
                vec![S, O, O, O, O],
                vec![x(-10.0), x(-10.0), x(-10.0), x(-10.0), x(-10.0)],
            ],
            Board::MazeGrid => vec![
                vec![O, O, O, x(1.0)],
                vec![W, W, O, W],
                vec![O, W, O, O],
                vec![O, W, W, O],
                vec![S, O, O, O],
            ],
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Board {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_name(s)
    }
}
