use std::collections::{HashMap, VecDeque};

use super::{VisitedMap, unvisited_neighbors};
use crate::error::SolveError;
use crate::maze::{Coord, Grid};

pub(super) fn solve_bfs(grid: &Grid, start: Coord, goal: Coord) -> Result<VisitedMap, SolveError> {
    let mut queue = VecDeque::from([start]);
    // Cells are marked when queued so each one gets exactly one predecessor
    let mut visited: VisitedMap = HashMap::from([(start, None)]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            // Whatever is left in the queue can only lead to longer paths
            return Ok(visited);
        }

        let next = unvisited_neighbors(grid, current, &visited).collect::<Vec<_>>();
        for neighbor in next {
            visited.insert(neighbor, Some(current));
            queue.push_back(neighbor);
        }
    }

    tracing::debug!(
        "[bfs] exhausted {} reachable cells without reaching {:?}",
        visited.len(),
        goal
    );
    Err(SolveError::NoPathFound)
}
