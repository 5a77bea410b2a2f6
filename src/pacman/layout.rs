use std::{fmt, sync::Arc};

use crate::{error::EnvError, turn_game::GameLayout};

/// Cell coordinates, `y = 0` is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl Position {
    /// Shorthand constructor.
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Neighbour at `(dx, dy)`, `None` when it would leave the first quadrant.
    pub fn offset(self, (dx, dy): (isize, isize)) -> Option<Position> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Position { x, y })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Boolean matrix over the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// All-false grid.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at `pos`, false outside the grid.
    pub fn get(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height && self.cells[pos.y * self.width + pos.x]
    }

    /// Overwrite the value at `pos`, ignored outside the grid.
    pub fn set(&mut self, pos: Position, value: bool) {
        if pos.x < self.width && pos.y < self.height {
            self.cells[pos.y * self.width + pos.x] = value;
        }
    }

    /// Number of true cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }
}

/// Static description of a maze: walls, initial food, capsules and agent
/// starting positions (pacman first).
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    name: String,
    walls: Arc<Grid>,
    food: Grid,
    capsules: Vec<Position>,
    agent_positions: Vec<(bool, Position)>,
    num_ghosts: usize,
}

impl Layout {
    /// Parse a layout drawn with `%` walls, `.` food, `o` capsules, `P` pacman,
    /// `G` or `1`-`4` ghosts and spaces. The first line is the top row.
    ///
    /// # Error
    /// [`EnvError::InvalidLayout`] on ragged rows, unknown characters, or when
    /// there is not exactly one pacman.
    pub fn parse(name: &str, text: &str) -> Result<Layout, EnvError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(EnvError::InvalidLayout(format!("{name}: empty layout")));
        }
        if let Some(row) = rows.iter().find(|row| row.chars().count() != width) {
            return Err(EnvError::InvalidLayout(format!("{name}: ragged row '{row}'")));
        }

        let mut walls = Grid::new(width, height);
        let mut food = Grid::new(width, height);
        let mut capsules = Vec::new();
        let mut agents: Vec<(usize, Position)> = Vec::new();
        for (ybar, row) in rows.iter().enumerate() {
            let y = height - 1 - ybar;
            for (x, c) in row.chars().enumerate() {
                let pos = Position { x, y };
                match c {
                    '%' => walls.set(pos, true),
                    '.' => food.set(pos, true),
                    'o' => capsules.push(pos),
                    'P' => agents.push((0, pos)),
                    'G' => agents.push((1, pos)),
                    '1'..='4' => agents.push((c as usize - '0' as usize, pos)),
                    ' ' => {}
                    other => {
                        return Err(EnvError::InvalidLayout(format!(
                            "{name}: unexpected character '{other}' at {pos}"
                        )))
                    }
                }
            }
        }

        let pacmen = agents.iter().filter(|(idx, _)| *idx == 0).count();
        if pacmen != 1 {
            return Err(EnvError::InvalidLayout(format!("{name}: expected one pacman, found {pacmen}")));
        }
        agents.sort();
        let num_ghosts = agents.len() - 1;
        capsules.sort();

        Ok(Layout {
            name: name.to_owned(),
            walls: Arc::new(walls),
            food,
            capsules,
            agent_positions: agents.into_iter().map(|(idx, pos)| (idx == 0, pos)).collect(),
            num_ghosts,
        })
    }

    /// Resolve one of the built-in layouts.
    ///
    /// # Error
    /// [`EnvError::UnknownLayout`] for unregistered names.
    pub fn by_name(name: &str) -> Result<Layout, EnvError> {
        let text = match name {
            "testClassic" => TEST_CLASSIC,
            "smallGrid" => SMALL_GRID,
            "mediumGrid" => MEDIUM_GRID,
            "minimaxClassic" => MINIMAX_CLASSIC,
            "trappedClassic" => TRAPPED_CLASSIC,
            "smallClassic" => SMALL_CLASSIC,
            "mediumClassic" => MEDIUM_CLASSIC,
            "capsuleClassic" => CAPSULE_CLASSIC,
            "openLine" => OPEN_LINE,
            _ => return Err(EnvError::UnknownLayout(name.to_owned())),
        };
        Layout::parse(name, text)
    }

    /// Names accepted by [`by_name`](Self::by_name).
    pub const NAMES: [&'static str; 9] = [
        "testClassic",
        "smallGrid",
        "mediumGrid",
        "minimaxClassic",
        "trappedClassic",
        "smallClassic",
        "mediumClassic",
        "capsuleClassic",
        "openLine",
    ];

    /// Columns.
    pub fn width(&self) -> usize {
        self.walls.width()
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.walls.height()
    }

    /// Walls, shared with every state played on this layout.
    pub fn walls(&self) -> &Arc<Grid> {
        &self.walls
    }

    /// Initial food.
    pub fn food(&self) -> &Grid {
        &self.food
    }

    /// Initial capsules.
    pub fn capsules(&self) -> &[Position] {
        &self.capsules
    }

    /// `(is_pacman, position)` of every agent, pacman first.
    pub fn agent_positions(&self) -> &[(bool, Position)] {
        &self.agent_positions
    }
}

impl GameLayout for Layout {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_ghosts(&self) -> usize {
        self.num_ghosts
    }
}

const TEST_CLASSIC: &str = "
%%%%%
% . %
%.G.%
% . %
%. .%
%   %
%  .%
%   %
%P .%
%%%%%
";

const SMALL_GRID: &str = "
%%%%%%%
%    .%
%.%%% %
%P  G %
%%%%%%%
";

const MEDIUM_GRID: &str = "
%%%%%%%%
%P     %
% .% . %
%  %   %
% .% . %
%     G%
%%%%%%%%
";

const MINIMAX_CLASSIC: &str = "
%%%%%%%%%
%.P    G%
% %.%G%%%
%G    %%%
%%%%%%%%%
";

const TRAPPED_CLASSIC: &str = "
%%%%%%%%
%   P G%
%G%%%%%%
%....  %
%%%%%%%%
";

const SMALL_CLASSIC: &str = "
%%%%%%%%%%%%%%%%%%%%
%......%G  G%......%
%.%%...%%  %%...%%.%
%.%o.%........%.o%.%
%.%%.%.%%%%%%.%.%%.%
%........P.........%
%%%%%%%%%%%%%%%%%%%%
";

const MEDIUM_CLASSIC: &str = "
%%%%%%%%%%%%%%%%%%%%
%o...%........%....%
%.%%.%.%%%%%%.%.%%.%
%.%..............%.%
%.%.%%.%%  %%.%%.%.%
%......%G  G%......%
%.%.%%.%%%%%%.%%.%.%
%.%..............%.%
%.%%.%.%%%%%%.%.%%.%
%....%...P....%...o%
%%%%%%%%%%%%%%%%%%%%
";

const CAPSULE_CLASSIC: &str = "
%%%%%%%%%%%%%%%%%%%
%G.       G   ....%
%.% % %%%%%% %.%%.%
%.%o% %   o% %.o%.%
%.%%%.%  %%% %..%.%
%.....  P    %..%G%
%%%%%%%%%%%%%%%%%%%
";

/// Corridor with one ghost, fully deterministic for scripted play.
const OPEN_LINE: &str = "
%%%%%%%%%
%P...  G%
%%%%%%%%%
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_layout_parses() {
        for name in Layout::NAMES {
            let layout = Layout::by_name(name).unwrap();
            assert_eq!(layout.name(), name);
            assert!(layout.num_ghosts() >= 1, "{name}");
            assert!(layout.agent_positions()[0].0, "{name}: pacman first");
            assert!(layout.food().count() > 0, "{name}");
        }
    }

    #[test]
    fn test_unknown_layout() {
        assert!(matches!(Layout::by_name("hugeClassic"), Err(EnvError::UnknownLayout(_))));
    }

    #[test]
    fn test_coordinates_are_flipped() {
        let layout = Layout::by_name("openLine").unwrap();
        assert_eq!((layout.width(), layout.height()), (9, 3));
        assert_eq!(layout.agent_positions()[0], (true, Position::new(1, 1)));
        assert_eq!(layout.agent_positions()[1], (false, Position::new(7, 1)));
        assert!(layout.walls().get(Position::new(0, 0)));
        assert!(layout.food().get(Position::new(2, 1)));
        assert_eq!(layout.food().count(), 3);
    }

    #[test]
    fn test_numbered_ghosts_sort_after_pacman() {
        let layout = Layout::parse("numbered", "%%%%%\n%2P1%\n%%%%%\n").unwrap();
        let positions = layout.agent_positions();
        assert_eq!(positions[0], (true, Position::new(2, 1)));
        assert_eq!(positions[1], (false, Position::new(3, 1)));
        assert_eq!(positions[2], (false, Position::new(1, 1)));
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(Layout::parse("ragged", "%%%\n%P\n").is_err());
        assert!(Layout::parse("no pacman", "%%%\n%G%\n").is_err());
        assert!(Layout::parse("bad char", "%%%\n%P#\n").is_err());
        assert!(Layout::parse("empty", "\n\n").is_err());
    }
}
