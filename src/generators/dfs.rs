use rand::Rng;

use super::frontier::{Adjacent, FrontierPolicy};
use super::{
    Algorithm, MazeBuilder, Phase, StepOutcome, carve_through, choose_seed, finish,
    openable_walls, prepare,
};
use crate::error::MazeError;
use crate::maze::{CellState, Coord, Grid};

/// Iterative depth-first carving with double openings.
///
/// The stack only ever holds carved cells. Their openable walls are recomputed on every
/// pop, and a cell with none left is backtracked over. Backtracked cells with a single
/// passage neighbor are dead ends, and one of them becomes the exit.
pub struct DfsBuilder<R> {
    grid: Grid,
    policy: Adjacent,
    rng: R,
    phase: Phase,
    stack: Vec<Coord>,
    dead_ends: Vec<Coord>,
    start: Option<Coord>,
}

impl<R: Rng> DfsBuilder<R> {
    pub fn new(mut grid: Grid, rng: R) -> Result<Self, MazeError> {
        prepare(Algorithm::IterativeDfs, &mut grid)?;
        Ok(Self {
            grid,
            policy: Adjacent,
            rng,
            phase: Phase::Seeding,
            stack: Vec::new(),
            dead_ends: Vec::new(),
            start: None,
        })
    }

    pub fn dead_ends(&self) -> &[Coord] {
        &self.dead_ends
    }

    fn visit(&mut self, cell: Coord) -> Result<StepOutcome, MazeError> {
        let walls = openable_walls(&self.grid, cell);
        if walls.is_empty() {
            if self.start != Some(cell) && self.grid.passage_neighbors(cell) == 1 {
                self.dead_ends.push(cell);
            }
            return Ok(StepOutcome::Backtracked(cell));
        }

        let entry = walls[self.policy.select(walls.len(), &mut self.rng)];
        // Put the cell back first so we can look at its other walls later
        self.stack.push(cell);
        let carved = carve_through(&mut self.grid, entry)?;
        // Then carve on from the new cell
        self.stack.push(carved);
        Ok(StepOutcome::Carved(carved))
    }

    fn finalize(&mut self) -> Result<StepOutcome, MazeError> {
        if self.dead_ends.is_empty() {
            return Err(MazeError::NoDeadEnd);
        }
        let start = self.start.ok_or(MazeError::NoDeadEnd)?;
        let end = self.dead_ends[self.rng.random_range(0..self.dead_ends.len())];
        tracing::debug!(
            "[dfs] picking the exit among {} dead ends",
            self.dead_ends.len()
        );
        let outcome = finish(&mut self.grid, start, end)?;
        self.phase = Phase::Done;
        Ok(outcome)
    }
}

impl<R: Rng> MazeBuilder for DfsBuilder<R> {
    fn algorithm(&self) -> Algorithm {
        Algorithm::IterativeDfs
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn step(&mut self) -> Result<StepOutcome, MazeError> {
        match self.phase {
            Phase::Seeding => {
                let seed = choose_seed(self.grid.size(), &mut self.rng);
                self.grid.set(seed, CellState::Passage)?;
                self.stack.push(seed);
                self.start = Some(seed);
                self.phase = Phase::Expanding;
                tracing::debug!("[dfs] seeded at {:?}", seed);
                Ok(StepOutcome::Seeded(seed))
            }
            Phase::Expanding => match self.stack.pop() {
                Some(cell) => self.visit(cell),
                None => {
                    self.phase = Phase::Finalizing;
                    self.finalize()
                }
            },
            Phase::Finalizing => self.finalize(),
            Phase::Done => Ok(StepOutcome::Done),
        }
    }

    fn into_grid(self: Box<Self>) -> Grid {
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_rng::ZeroRng;

    #[test]
    fn test_dead_ends_exclude_entrance() {
        let mut builder = DfsBuilder::new(Grid::new(9).unwrap(), ZeroRng).unwrap();
        let mut backtracked = Vec::new();
        loop {
            match builder.step().unwrap() {
                StepOutcome::Backtracked(cell) => backtracked.push(cell),
                StepOutcome::Done => break,
                _ => {}
            }
        }
        // Every carved cell is eventually backtracked over, the seed last
        assert_eq!(backtracked.first(), Some(&(5, 6)));
        assert_eq!(backtracked.last(), Some(&(1, 2)));
        assert_eq!(backtracked.len(), 7);
        assert_eq!(builder.dead_ends(), &[(5, 6)]);
    }

    #[test]
    fn test_stack_holds_carved_cells_only() {
        let mut builder = DfsBuilder::new(Grid::new(9).unwrap(), ZeroRng).unwrap();
        builder.step().unwrap();
        assert_eq!(builder.step(), Ok(StepOutcome::Carved((3, 2))));
        assert_eq!(builder.stack, vec![(1, 2), (3, 2)]);
    }
}
