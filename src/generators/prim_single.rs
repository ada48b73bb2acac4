use rand::Rng;

use super::frontier::{FrontierPolicy, UniformRandom};
use super::{Algorithm, FrontierEntry, MazeBuilder, Phase, StepOutcome, choose_seed, finish, prepare};
use crate::error::MazeError;
use crate::maze::{CellState, Coord, Direction, Grid};

/// Relaxed single-connection rule.
///
/// `wall` may be opened when it touches exactly one passage, unless the cell facing
/// away from that passage is a wall with a passage on either side of it.
pub fn is_single_openable(grid: &Grid, wall: Coord) -> bool {
    if !grid.is_wall(wall) {
        return false;
    }
    let connections = Direction::ALL
        .into_iter()
        .filter(|dir| dir.step(wall, 1).is_some_and(|c| grid.is_passage(c)))
        .collect::<Vec<_>>();
    let [toward] = connections.as_slice() else {
        return false;
    };

    let away = toward.opposite();
    match away.step(wall, 1) {
        Some(opposite) if grid.is_wall(opposite) => !away
            .perpendicular()
            .into_iter()
            .any(|side| side.step(opposite, 1).is_some_and(|c| grid.is_passage(c))),
        _ => true,
    }
}

/// Prim's algorithm opening one cell at a time.
///
/// Only the chosen wall is carved, and its wall neighbors join the frontier right
/// away. The result is a more open, cave-like layout that may contain loops.
pub struct PrimSingleBuilder<R> {
    grid: Grid,
    policy: UniformRandom,
    rng: R,
    phase: Phase,
    frontier: Vec<FrontierEntry>,
    start: Option<Coord>,
    last_opened: Option<Coord>,
}

impl<R: Rng> PrimSingleBuilder<R> {
    pub fn new(mut grid: Grid, rng: R) -> Result<Self, MazeError> {
        prepare(Algorithm::PrimSingleOpen, &mut grid)?;
        Ok(Self {
            grid,
            policy: UniformRandom,
            rng,
            phase: Phase::Seeding,
            frontier: Vec::new(),
            start: None,
            last_opened: None,
        })
    }

    /// Carves `cell` and queues every interior wall next to it.
    fn open(&mut self, cell: Coord) -> Result<(), MazeError> {
        self.grid.set(cell, CellState::Passage)?;
        let walls = Direction::ALL.into_iter().filter_map(|direction| {
            direction
                .step(cell, 1)
                .filter(|&wall| self.grid.is_wall(wall))
                .map(|wall| FrontierEntry { wall, direction })
        });
        self.frontier.extend(walls.collect::<Vec<_>>());
        Ok(())
    }
}

impl<R: Rng> MazeBuilder for PrimSingleBuilder<R> {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PrimSingleOpen
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
                self.open(seed)?;
                self.start = Some(seed);
                self.phase = Phase::Expanding;
                tracing::debug!("[prim single] seeded at {:?}", seed);
                Ok(StepOutcome::Seeded(seed))
            }
            Phase::Expanding if self.frontier.is_empty() => {
                self.phase = Phase::Finalizing;
                self.step()
            }
            Phase::Expanding => {
                let idx = self.policy.select(self.frontier.len(), &mut self.rng);
                let FrontierEntry { wall, .. } = self.frontier.remove(idx);
                if !is_single_openable(&self.grid, wall) {
                    return Ok(StepOutcome::Skipped(wall));
                }
                self.open(wall)?;
                self.last_opened = Some(wall);
                Ok(StepOutcome::Carved(wall))
            }
            Phase::Finalizing => {
                let (Some(start), Some(end)) = (self.start, self.last_opened) else {
                    return Err(MazeError::UngeneratableGrid {
                        algorithm: Algorithm::PrimSingleOpen,
                        size: self.grid.size(),
                    });
                };
                let outcome = finish(&mut self.grid, start, end)?;
                self.phase = Phase::Done;
                Ok(outcome)
            }
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

    #[test]
    fn test_single_connection_is_openable() {
        let grid = "\
#######
#..####
#######
#.#####
#######
#######
#######"
            .parse::<Grid>()
            .unwrap();
        // Single connection to the west, nothing open past the east wall
        assert!(is_single_openable(&grid, (1, 3)));
        assert!(is_single_openable(&grid, (4, 1)));
        // Single connection to the north, but (3,1) is open beside the wall below
        assert!(!is_single_openable(&grid, (2, 2)));
        // Two connections
        assert!(!is_single_openable(&grid, (2, 1)));
        // Passages and the border are never openable
        assert!(!is_single_openable(&grid, (1, 1)));
        assert!(!is_single_openable(&grid, (0, 1)));
    }

    #[test]
    fn test_isolated_wall_is_not_openable() {
        let grid = Grid::new(7).unwrap();
        assert!(!is_single_openable(&grid, (3, 3)));
    }
}
