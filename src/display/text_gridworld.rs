use std::io::{self, Write};

use agent_interface::{QValueEstimates, ValueEstimates};

use super::MdpDisplay;
use crate::gridworld::{Cell, GridAction, GridState, Gridworld};

const VALUE_WIDTH: usize = 10;
const Q_HALF: usize = 8;
const Q_WIDTH: usize = 2 * Q_HALF + 1;

/// Draws a gridworld as text tables, top row first.
pub struct TextGridworldDisplay<W: Write = io::Stdout> {
    grid: Gridworld,
    out: W,
}

impl TextGridworldDisplay {
    /// Display writing to stdout.
    pub fn new(grid: Gridworld) -> Self {
        Self::with_writer(grid, io::stdout())
    }
}

impl<W: Write> TextGridworldDisplay<W> {
    /// Display writing to `out`.
    pub fn with_writer(grid: Gridworld, out: W) -> Self {
        TextGridworldDisplay { grid, out }
    }

    /// Give the writer back.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn value_cell(&self, x: usize, y: usize, estimates: &dyn ValueEstimates<GridState, GridAction>, current: &GridState) -> String {
        let state = GridState::at(x, y);
        let marker = if state == *current { "*" } else { "" };
        let text = match self.grid.cell(x, y) {
            Cell::Wall => "#####".to_owned(),
            Cell::Exit(_) => format!("{marker}[{:.2}]", estimates.get_value(&state)),
            Cell::Empty | Cell::Start => {
                let arrow = estimates.get_policy(&state).map_or(' ', arrow);
                format!("{marker}{arrow}{:.2}", estimates.get_value(&state))
            }
        };
        format!("{text:^VALUE_WIDTH$}")
    }

    fn q_cell(&self, x: usize, y: usize, estimates: &dyn QValueEstimates<GridState, GridAction>, current: &GridState) -> [String; 3] {
        let state = GridState::at(x, y);
        let marker = if state == *current { '*' } else { ' ' };
        let q = |action: GridAction| format!("{:.2}", estimates.get_q_value(&state, &action));
        match self.grid.cell(x, y) {
            Cell::Wall => ["#".repeat(Q_WIDTH), "#".repeat(Q_WIDTH), "#".repeat(Q_WIDTH)],
            Cell::Exit(_) => [
                " ".repeat(Q_WIDTH),
                format!("{:^Q_WIDTH$}", format!("{marker}[{}]", q(GridAction::Exit))),
                " ".repeat(Q_WIDTH),
            ],
            Cell::Empty | Cell::Start => [
                format!("{:^Q_WIDTH$}", q(GridAction::North)),
                format!("{:<Q_HALF$}{marker}{:>Q_HALF$}", q(GridAction::West), q(GridAction::East)),
                format!("{:^Q_WIDTH$}", q(GridAction::South)),
            ],
        }
    }
}

fn arrow(action: GridAction) -> char {
    match action {
        GridAction::North => '^',
        GridAction::West => '<',
        GridAction::South => 'v',
        GridAction::East => '>',
        GridAction::Exit => 'x',
    }
}

impl<W: Write> MdpDisplay<GridState, GridAction> for TextGridworldDisplay<W> {
    fn start(&mut self) -> io::Result<()> {
        writeln!(self.out, "Gridworld {}x{}", self.grid.width(), self.grid.height())
    }

    fn display_values(
        &mut self,
        estimates: &dyn ValueEstimates<GridState, GridAction>,
        current: &GridState,
        message: &str,
    ) -> io::Result<()> {
        let rows: Vec<String> = (0..self.grid.height())
            .rev()
            .map(|y| {
                (0..self.grid.width())
                    .map(|x| self.value_cell(x, y, estimates, current))
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect();
        writeln!(self.out, "{message}")?;
        for row in rows {
            writeln!(self.out, "{row}")?;
        }
        writeln!(self.out)
    }

    fn display_q_values(
        &mut self,
        estimates: &dyn QValueEstimates<GridState, GridAction>,
        current: &GridState,
        message: &str,
    ) -> io::Result<()> {
        writeln!(self.out, "{message}")?;
        for y in (0..self.grid.height()).rev() {
            let cells: Vec<[String; 3]> = (0..self.grid.width())
                .map(|x| self.q_cell(x, y, estimates, current))
                .collect();
            for line in 0..3 {
                let text: Vec<&str> = cells.iter().map(|cell| cell[line].as_str()).collect();
                writeln!(self.out, "{}", text.join("|"))?;
            }
            writeln!(self.out, "{}", "-".repeat((Q_WIDTH + 1) * self.grid.width()))?;
        }
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{display::ZeroEstimates, gridworld::Board};

    struct NorthEverywhere;

    impl ValueEstimates<GridState, GridAction> for NorthEverywhere {
        fn get_value(&self, _state: &GridState) -> f64 {
            0.5
        }

        fn get_policy(&self, _state: &GridState) -> Option<GridAction> {
            Some(GridAction::North)
        }
    }

    fn render(f: impl FnOnce(&mut TextGridworldDisplay<Vec<u8>>) -> io::Result<()>) -> String {
        let grid = Board::BookGrid.build().unwrap();
        let mut display = TextGridworldDisplay::with_writer(grid, Vec::new());
        f(&mut display).unwrap();
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_values_table() {
        let text = render(|d| d.display_values(&NorthEverywhere, &GridState::at(0, 0), "VALUES"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "VALUES");
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("#####"));
        assert!(lines[3].contains("*^0.50"));
        assert!(lines[1].contains("[0.50]"));
    }

    #[test]
    fn test_q_values_grid() {
        let text = render(|d| d.display_q_values(&ZeroEstimates, &GridState::Terminal, "Q-VALUES"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Q-VALUES");
        assert_eq!(lines.len(), 1 + 3 * 4 + 1);
        assert!(lines[2].starts_with("0.00"));
    }
}
