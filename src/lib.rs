pub mod app;
pub mod error;
pub mod generators;
pub mod maze;
pub mod solvers;

pub use error::{MazeError, SolveError};
pub use generators::{Algorithm, Generated, generate};
pub use maze::{CellState, Coord, Grid, GridEvent, Renderer};
pub use solvers::{Solver, solve, solve_with};
