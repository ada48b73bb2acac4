pub mod cell;
pub mod grid;

pub use cell::CellState;
pub use grid::{Grid, GridEvent, Renderer};

/// Grid coordinate as `(row, col)`, zero-indexed.
pub type Coord = (u16, u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Fixed iteration order used by every builder and solver.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Unit offset as `(row, col)` deltas.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// The two directions at right angles to this one.
    pub fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::North | Direction::South => [Direction::West, Direction::East],
            Direction::West | Direction::East => [Direction::North, Direction::South],
        }
    }

    /// Coordinate `distance` cells away in this direction.
    /// Returns `None` when that would underflow; the caller still has to check grid bounds.
    pub fn step(self, coord: Coord, distance: u16) -> Option<Coord> {
        let (row, col) = coord;
        match self {
            Direction::North => row.checked_sub(distance).map(|r| (r, col)),
            Direction::South => row.checked_add(distance).map(|r| (r, col)),
            Direction::West => col.checked_sub(distance).map(|c| (row, c)),
            Direction::East => col.checked_add(distance).map(|c| (row, c)),
        }
    }
}
