use rand::Rng;

use super::frontier::{FrontierPolicy, RecencyWeighted, UniformRandom};
use super::{
    Algorithm, FrontierEntry, MazeBuilder, Phase, StepOutcome, carve_through, choose_seed, finish,
    is_openable, openable_walls, prepare,
};
use crate::error::MazeError;
use crate::maze::{CellState, Coord, Grid};

/// Randomized Prim's algorithm with double openings.
///
/// The frontier holds every openable wall found next to the carved region. Each step
/// takes one entry out of it, chosen by the policy, and if the wall can still be
/// opened carves it together with the cell behind. The walls around that new cell join
/// the frontier. The last cell carved becomes the exit.
pub struct PrimBuilder<P, R> {
    algorithm: Algorithm,
    grid: Grid,
    policy: P,
    rng: R,
    phase: Phase,
    frontier: Vec<FrontierEntry>,
    start: Option<Coord>,
    last_opened: Option<Coord>,
}

impl<R: Rng> PrimBuilder<UniformRandom, R> {
    /// Picks frontier walls uniformly at random.
    pub fn simple(grid: Grid, rng: R) -> Result<Self, MazeError> {
        Self::with_policy(Algorithm::PrimSimple, grid, UniformRandom, rng)
    }
}

impl<R: Rng> PrimBuilder<RecencyWeighted, R> {
    /// Prefers the newest frontier walls, producing longer corridors.
    pub fn weighted(grid: Grid, rng: R) -> Result<Self, MazeError> {
        Self::with_policy(
            Algorithm::PrimWeighted,
            grid,
            RecencyWeighted::default(),
            rng,
        )
    }
}

impl<P: FrontierPolicy, R: Rng> PrimBuilder<P, R> {
    pub fn with_policy(
        algorithm: Algorithm,
        mut grid: Grid,
        policy: P,
        rng: R,
    ) -> Result<Self, MazeError> {
        prepare(algorithm, &mut grid)?;
        Ok(Self {
            algorithm,
            grid,
            policy,
            rng,
            phase: Phase::Seeding,
            frontier: Vec::new(),
            start: None,
            last_opened: None,
        })
    }

    pub fn frontier(&self) -> &[FrontierEntry] {
        &self.frontier
    }

    fn seed(&mut self) -> Result<StepOutcome, MazeError> {
        let seed = choose_seed(self.grid.size(), &mut self.rng);
        self.grid.set(seed, CellState::Passage)?;
        self.frontier.extend(openable_walls(&self.grid, seed));
        self.start = Some(seed);
        self.phase = Phase::Expanding;
        tracing::debug!(
            "[prim] seeded at {:?} with {} frontier walls",
            seed,
            self.frontier.len()
        );
        Ok(StepOutcome::Seeded(seed))
    }

    fn expand(&mut self) -> Result<StepOutcome, MazeError> {
        let idx = self.policy.select(self.frontier.len(), &mut self.rng);
        // Removal keeps insertion order, which the weighted policy depends on
        let entry = self.frontier.remove(idx);

        // Another opening may have grown next to this wall since it was queued
        if !is_openable(&self.grid, entry.wall, entry.direction) {
            tracing::trace!("[prim] skipping stale wall {:?}", entry.wall);
            return Ok(StepOutcome::Skipped(entry.wall));
        }

        let cell = carve_through(&mut self.grid, entry)?;
        self.last_opened = Some(cell);
        self.frontier.extend(openable_walls(&self.grid, cell));
        tracing::trace!(
            "[prim] carved {:?} through {:?}, frontier size {}",
            cell,
            entry.wall,
            self.frontier.len()
        );
        Ok(StepOutcome::Carved(cell))
    }

    fn finalize(&mut self) -> Result<StepOutcome, MazeError> {
        let (Some(start), Some(end)) = (self.start, self.last_opened) else {
            return Err(MazeError::UngeneratableGrid {
                algorithm: self.algorithm,
                size: self.grid.size(),
            });
        };
        let outcome = finish(&mut self.grid, start, end)?;
        self.phase = Phase::Done;
        Ok(outcome)
    }
}

impl<P: FrontierPolicy, R: Rng> MazeBuilder for PrimBuilder<P, R> {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn step(&mut self) -> Result<StepOutcome, MazeError> {
        match self.phase {
            Phase::Seeding => self.seed(),
            Phase::Expanding if self.frontier.is_empty() => {
                self.phase = Phase::Finalizing;
                self.finalize()
            }
            Phase::Expanding => self.expand(),
            Phase::Finalizing => self.finalize(),
            Phase::Done => Ok(StepOutcome::Done),
        }
    }

    fn into_grid(self: Box<Self>) -> Grid {
        self.grid
    }
}
