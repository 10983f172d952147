use super::error::{EngineError, Result};

/// Position is a single grid cell; `x` is the column and `y` is the row.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Position {
    pub(crate) x: usize,
    pub(crate) y: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({0},{1})", self.x, self.y)
    }
}

impl Position {
    pub(crate) fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring cell in the given direction, or None if it falls off the grid.
    pub(crate) fn step(&self, direction: &Direction, size: &GridSize) -> Option<Position> {
        let (x, y) = match direction {
            Direction::Up => (Some(self.x), self.y.checked_sub(1)),
            Direction::Down => (Some(self.x), self.y.checked_add(1)),
            Direction::Left => (self.x.checked_sub(1), Some(self.y)),
            Direction::Right => (self.x.checked_add(1), Some(self.y)),
        };
        let candidate = Position::new(x?, y?);
        size.contains(&candidate).then_some(candidate)
    }
}

/// GridSize bounds every position on the board.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct GridSize {
    rows: usize,
    columns: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            rows: 5,
            columns: 5,
        }
    }
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0} x {1}", self.rows, self.columns)
    }
}

impl GridSize {
    /// Two players, the target and one free cell for the target to jump to.
    pub(crate) const MIN_CELLS: usize = 4;

    pub(crate) fn new(rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(EngineError::InvalidArgument(format!(
                "grid dimensions must be positive, got {rows} x {columns}"
            )));
        }
        if rows.saturating_mul(columns) < Self::MIN_CELLS {
            return Err(EngineError::InvalidArgument(format!(
                "grid needs at least {} cells, got {rows} x {columns}",
                Self::MIN_CELLS
            )));
        }
        Ok(Self { rows, columns })
    }

    #[inline(always)]
    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub(crate) fn columns(&self) -> usize {
        self.columns
    }

    #[inline(always)]
    pub(crate) fn contains(&self, pos: &Position) -> bool {
        pos.x < self.columns && pos.y < self.rows
    }
}

/// Direction represents the direction a player asked to move in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Player {
    One,
    Two,
}

impl Player {
    pub(crate) fn other(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub(crate) fn number(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = EngineError;

    fn try_from(number: u8) -> Result<Self> {
        match number {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            n => Err(EngineError::InvalidArgument(format!(
                "player number must be 1 or 2, got {n}"
            ))),
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player {}", self.number())
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    fn size(rows: usize, columns: usize) -> GridSize {
        GridSize::new(rows, columns).expect("valid grid size")
    }

    #[rstest]
    #[case::up(Direction::Up, Position::new(2, 1))]
    #[case::down(Direction::Down, Position::new(2, 3))]
    #[case::left(Direction::Left, Position::new(1, 2))]
    #[case::right(Direction::Right, Position::new(3, 2))]
    fn step_interior(#[case] direction: Direction, #[case] expected: Position) {
        let from = Position::new(2, 2);
        assert_eq!(from.step(&direction, &size(5, 5)), Some(expected));
    }

    #[rstest]
    #[case::up_from_top(Position::new(1, 0), Direction::Up)]
    #[case::left_from_left_edge(Position::new(0, 1), Direction::Left)]
    #[case::down_from_bottom(Position::new(1, 2), Direction::Down)]
    #[case::right_from_right_edge(Position::new(3, 1), Direction::Right)]
    fn step_off_grid(#[case] from: Position, #[case] direction: Direction) {
        // three rows, four columns
        assert_eq!(from.step(&direction, &size(3, 4)), None);
    }

    #[rstest]
    #[case::zero_rows(0, 5)]
    #[case::zero_columns(5, 0)]
    #[case::too_few_cells(1, 3)]
    fn grid_size_rejects(#[case] rows: usize, #[case] columns: usize) {
        assert!(matches!(
            GridSize::new(rows, columns),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[rstest]
    #[case::square(2, 2)]
    #[case::single_row(1, 4)]
    #[case::wide(3, 10)]
    fn grid_size_accepts(#[case] rows: usize, #[case] columns: usize) {
        let s = size(rows, columns);
        assert_eq!((s.rows(), s.columns()), (rows, columns));
        assert!(s.contains(&Position::new(columns - 1, rows - 1)));
        assert!(!s.contains(&Position::new(columns, 0)));
        assert!(!s.contains(&Position::new(0, rows)));
    }

    #[test]
    fn player_numbers() {
        assert_eq!(Player::try_from(1).ok(), Some(Player::One));
        assert_eq!(Player::try_from(2).ok(), Some(Player::Two));
        assert!(Player::try_from(0).is_err());
        assert!(Player::try_from(3).is_err());
        assert_eq!(Player::One.other(), Player::Two);
        assert_eq!(Player::Two.to_string(), "player 2");
    }
}
