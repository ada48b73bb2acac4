use std::collections::HashMap;

use super::{VisitedMap, unvisited_neighbors};
use crate::error::SolveError;
use crate::maze::{Coord, Grid};

pub(super) fn solve_dfs(grid: &Grid, start: Coord, goal: Coord) -> Result<VisitedMap, SolveError> {
    let mut stack = vec![start];
    let mut visited: VisitedMap = HashMap::from([(start, None)]);

    while let Some(current) = stack.pop() {
        if current == goal {
            return Ok(visited);
        }

        let next = unvisited_neighbors(grid, current, &visited).collect::<Vec<_>>();
        for neighbor in next {
            visited.insert(neighbor, Some(current));
            stack.push(neighbor);
        }
    }

    tracing::debug!("[dfs] no route from {:?} to {:?}", start, goal);
    Err(SolveError::NoPathFound)
}
