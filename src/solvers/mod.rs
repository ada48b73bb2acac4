use std::collections::HashMap;

mod bfs;
mod dfs;

use bfs::solve_bfs;
use dfs::solve_dfs;

use crate::error::SolveError;
use crate::maze::{CellState, Coord, Grid};

/// Cell each visited cell was first reached from. The entrance maps to `None`.
type VisitedMap = HashMap<Coord, Option<Coord>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Solver {
    /// Queue frontier: always returns a shortest path.
    #[default]
    Bfs,
    /// Stack frontier: often reaches far exits sooner, but the path may be longer.
    Dfs,
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
        }
    }
}

/// Finds a shortest path from the entrance to the exit with breadth-first search.
///
/// The path is returned from the exit back to the entrance, both included.
pub fn solve(grid: &Grid) -> Result<Vec<Coord>, SolveError> {
    solve_with(grid, Solver::Bfs)
}

pub fn solve_with(grid: &Grid, solver: Solver) -> Result<Vec<Coord>, SolveError> {
    let (start, goal) = endpoints(grid)?;
    let visited = match solver {
        Solver::Bfs => solve_bfs(grid, start, goal)?,
        Solver::Dfs => solve_dfs(grid, start, goal)?,
    };
    let path = reconstruct(&visited, goal);
    tracing::info!(
        "[solve] {} found a path of {} steps after visiting {} cells",
        solver,
        path.len() - 1,
        visited.len()
    );
    Ok(path)
}

/// Locates the unique entrance and exit.
fn endpoints(grid: &Grid) -> Result<(Coord, Coord), SolveError> {
    if grid.count(CellState::Wall) == grid.cells().len() {
        return Err(SolveError::EmptyGrid);
    }
    let unique = |state| (grid.count(state) == 1).then(|| grid.find(state)).flatten();
    let start = unique(CellState::Start).ok_or(SolveError::MissingEntrance)?;
    let goal = unique(CellState::End).ok_or(SolveError::MissingExit)?;
    Ok((start, goal))
}

/// Open cells next to `cell` that have not been reached yet, in North, South, West,
/// East order.
fn unvisited_neighbors<'a>(
    grid: &'a Grid,
    cell: Coord,
    visited: &'a VisitedMap,
) -> impl Iterator<Item = Coord> + 'a {
    grid.neighbors(cell)
        .filter(move |&c| grid.is_passage(c) && !visited.contains_key(&c))
}

/// Walks the predecessors back from `goal`.
fn reconstruct(visited: &VisitedMap, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&Some(previous)) = visited.get(&current) {
        path.push(previous);
        current = previous;
    }
    path
}
