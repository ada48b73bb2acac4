use std::str::FromStr;
use std::sync::mpsc;

use rand::{Rng, SeedableRng, rngs::StdRng};

mod dfs;
pub mod frontier;
mod prim;
mod prim_single;
#[cfg(test)]
pub(crate) mod test_rng;

pub use dfs::DfsBuilder;
pub use prim::PrimBuilder;
pub use prim_single::PrimSingleBuilder;

use crate::error::MazeError;
use crate::maze::{CellState, Coord, Direction, Grid, GridEvent};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    PrimSimple,
    PrimWeighted,
    PrimSingleOpen,
    IterativeDfs,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::PrimSimple,
        Algorithm::PrimWeighted,
        Algorithm::PrimSingleOpen,
        Algorithm::IterativeDfs,
    ];

    /// Smallest grid this algorithm can seed.
    /// Double openings need two cells of clearance past the seed's first wall.
    pub fn min_size(self) -> u16 {
        match self {
            Algorithm::PrimSingleOpen => Grid::MIN_SIZE,
            Algorithm::PrimSimple | Algorithm::PrimWeighted | Algorithm::IterativeDfs => 7,
        }
    }

    /// Name accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::PrimSimple => "prim-simple",
            Algorithm::PrimWeighted => "prim-weighted",
            Algorithm::PrimSingleOpen => "prim-single-open",
            Algorithm::IterativeDfs => "iterative-dfs",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::PrimSimple => write!(f, "Prim's Algorithm"),
            Algorithm::PrimWeighted => write!(f, "Weighted Prim's Algorithm"),
            Algorithm::PrimSingleOpen => write!(f, "Prim's Algorithm (Single Opening)"),
            Algorithm::IterativeDfs => write!(f, "Iterative Depth-First Search (DFS)"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MazeError::UnknownAlgorithm(s.to_string()))
    }
}

/// Where a builder is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Seeding,
    Expanding,
    Finalizing,
    Done,
}

/// What a single call to [`MazeBuilder::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The seed cell was opened.
    Seeded(Coord),
    /// A new cell was carved: the cell behind the wall for double openings,
    /// the wall itself for single openings.
    Carved(Coord),
    /// A frontier wall was consumed but could no longer be opened.
    Skipped(Coord),
    /// Depth-first carving ran out of openable walls around this cell.
    Backtracked(Coord),
    Finalized { start: Coord, end: Coord },
    Done,
}

/// A maze-carving algorithm driven one step at a time.
///
/// Every step leaves the grid in a consistent state, so an external driver may pace
/// the steps however it likes or simply stop calling `step`.
pub trait MazeBuilder {
    fn algorithm(&self) -> Algorithm;

    fn phase(&self) -> Phase;

    fn grid(&self) -> &Grid;

    fn step(&mut self) -> Result<StepOutcome, MazeError>;

    fn into_grid(self: Box<Self>) -> Grid;

    /// Steps until the maze is finished.
    fn run(&mut self) -> Result<(), MazeError> {
        let mut steps = 0usize;
        loop {
            if self.step()? == StepOutcome::Done {
                tracing::info!(
                    "[generate] {} finished a {}x{} maze in {} steps",
                    self.algorithm(),
                    self.grid().size(),
                    self.grid().size(),
                    steps
                );
                return Ok(());
            }
            steps += 1;
        }
    }
}

/// Pending wall candidate together with the direction it was reached in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierEntry {
    pub wall: Coord,
    pub direction: Direction,
}

/// Double-opening rule.
///
/// `wall` may be opened towards `direction` when it is an interior wall and the two
/// cells straight ahead of it, along with both their side neighbors, are interior
/// walls too. Opening it then can only ever connect the new region through `wall`.
pub fn is_openable(grid: &Grid, wall: Coord, direction: Direction) -> bool {
    grid.is_wall(wall)
        && (1..=2).all(|distance| {
            direction.step(wall, distance).is_some_and(|ahead| {
                grid.is_wall(ahead)
                    && direction
                        .perpendicular()
                        .into_iter()
                        .all(|side| side.step(ahead, 1).is_some_and(|c| grid.is_wall(c)))
            })
        })
}

/// Walls around `cell` that satisfy the double-opening rule, in North, South, West, East order.
pub fn openable_walls(grid: &Grid, cell: Coord) -> Vec<FrontierEntry> {
    Direction::ALL
        .into_iter()
        .filter_map(|direction| {
            let wall = direction.step(cell, 1)?;
            is_openable(grid, wall, direction).then_some(FrontierEntry { wall, direction })
        })
        .collect()
}

/// Opens the wall of `entry` and the cell behind it, returning the latter.
fn carve_through(grid: &mut Grid, entry: FrontierEntry) -> Result<Coord, MazeError> {
    let FrontierEntry { wall, direction } = entry;
    let behind = direction
        .step(wall, 1)
        .ok_or(MazeError::OutOfBounds { coord: wall })?;
    grid.set(wall, CellState::Passage)?;
    grid.set(behind, CellState::Passage)?;
    Ok(behind)
}

/// Picks a seed on one of the four lines just inside the border, at least two cells
/// away from every corner.
fn choose_seed<R: Rng + ?Sized>(size: u16, rng: &mut R) -> Coord {
    let on_row = rng.random_bool(0.5);
    let edge = if rng.random_bool(0.5) { 1 } else { size - 2 };
    let along = rng.random_range(2..size - 2);
    if on_row { (edge, along) } else { (along, edge) }
}

/// Rejects grids too small for `algorithm` and wipes anything left from a previous run.
fn prepare(algorithm: Algorithm, grid: &mut Grid) -> Result<(), MazeError> {
    if grid.size() < algorithm.min_size() {
        return Err(MazeError::UngeneratableGrid {
            algorithm,
            size: grid.size(),
        });
    }
    grid.reset();
    Ok(())
}

/// Marks the entrance and exit and tells the renderer the maze is complete.
fn finish(grid: &mut Grid, start: Coord, end: Coord) -> Result<StepOutcome, MazeError> {
    grid.set(start, CellState::Start)?;
    grid.set(end, CellState::End)?;
    grid.notify_completed();
    tracing::debug!("[generate] entrance at {:?}, exit at {:?}", start, end);
    Ok(StepOutcome::Finalized { start, end })
}

/// Creates a step-by-step builder for `algorithm` over `grid`.
pub fn builder<R>(
    algorithm: Algorithm,
    grid: Grid,
    rng: R,
) -> Result<Box<dyn MazeBuilder + Send>, MazeError>
where
    R: Rng + Send + 'static,
{
    Ok(match algorithm {
        Algorithm::PrimSimple => Box::new(PrimBuilder::simple(grid, rng)?),
        Algorithm::PrimWeighted => Box::new(PrimBuilder::weighted(grid, rng)?),
        Algorithm::PrimSingleOpen => Box::new(PrimSingleBuilder::new(grid, rng)?),
        Algorithm::IterativeDfs => Box::new(DfsBuilder::new(grid, rng)?),
    })
}

/// Runs `algorithm` over `grid` to completion with the given random source.
pub fn build<R>(algorithm: Algorithm, grid: Grid, rng: R) -> Result<Grid, MazeError>
where
    R: Rng + Send + 'static,
{
    let mut builder = builder(algorithm, grid, rng)?;
    builder.run()?;
    Ok(builder.into_grid())
}

/// A finished maze, plus every grid event emitted while carving it when requested.
#[derive(Debug)]
pub struct Generated {
    pub grid: Grid,
    pub trace: Option<Vec<GridEvent>>,
}

pub fn generate(
    algorithm: Algorithm,
    size: u16,
    seed: Option<u64>,
    trace: bool,
) -> Result<Generated, MazeError> {
    let rng = get_rng(seed);
    if !trace {
        let grid = build(algorithm, Grid::new(size)?, rng)?;
        return Ok(Generated { grid, trace: None });
    }

    let (tx, rx) = mpsc::channel();
    let mut grid = build(algorithm, Grid::with_renderer(size, tx)?, rng)?;
    // Dropping the sender closes the channel so the receiver can be drained
    drop(grid.detach_renderer());
    Ok(Generated {
        grid,
        trace: Some(rx.into_iter().collect()),
    })
}
