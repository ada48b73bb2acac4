use thiserror::Error;

use crate::generators::Algorithm;
use crate::maze::Coord;

/// Errors raised while building a grid or carving a maze into it.
///
/// All of these are fatal for the run that produced them: the caller has to start
/// over with corrected parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("invalid grid size {size}: must be odd and at least {min}", min = crate::maze::Grid::MIN_SIZE)]
    InvalidSize { size: usize },
    /// A coordinate fell outside the grid. Internal invariants keep builders from
    /// ever producing one, so this signals a bug rather than bad input.
    #[error("coordinate {coord:?} is out of bounds")]
    OutOfBounds { coord: Coord },
    #[error("{algorithm} cannot carve a {size}x{size} grid (needs at least {min}x{min})", min = .algorithm.min_size())]
    UngeneratableGrid { algorithm: Algorithm, size: u16 },
    #[error("depth-first carving finished without a dead end to use as exit")]
    NoDeadEnd,
    #[error("unknown cell character {ch:?} at row {row}, column {col}")]
    InvalidCell { ch: char, row: usize, col: usize },
    #[error("border cell {coord:?} is not a wall")]
    BorderPassage { coord: Coord },
    #[error("unknown maze algorithm {0:?}")]
    UnknownAlgorithm(String),
}

/// Errors reported by the path solvers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("maze not generated")]
    EmptyGrid,
    #[error("cannot find a unique starting cell")]
    MissingEntrance,
    #[error("cannot find a unique exit cell")]
    MissingExit,
    #[error("exit is not reachable from the entrance")]
    NoPathFound,
}

/// Errors surfaced by the terminal driver.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}
