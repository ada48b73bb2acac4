use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{Sender, SyncSender};

use super::cell::CellState;
use super::{Coord, Direction};
use crate::error::MazeError;

/// Notification emitted by a [`Grid`] as it changes.
#[derive(Debug, PartialEq)]
pub enum GridEvent {
    /// The whole grid was (re)filled with `cell`.
    Initial { cell: CellState, size: u16 },
    Update {
        coord: Coord,
        old: CellState,
        new: CellState,
    },
    /// Renderer-less snapshot of a finished maze.
    Completed(Grid),
}

/// Receives cell-state changes from a grid. Implemented by whatever presents the maze;
/// the grid never assumes anything about timing or medium.
pub trait Renderer {
    fn initialized(&mut self, size: u16, cell: CellState);

    fn cell_changed(&mut self, coord: Coord, old: CellState, new: CellState);

    fn completed(&mut self, _grid: &Grid) {}
}

// Send errors only mean the receiving side hung up; generation carries on regardless.
impl Renderer for Sender<GridEvent> {
    fn initialized(&mut self, size: u16, cell: CellState) {
        let _ = self.send(GridEvent::Initial { cell, size });
    }

    fn cell_changed(&mut self, coord: Coord, old: CellState, new: CellState) {
        let _ = self.send(GridEvent::Update { coord, old, new });
    }

    fn completed(&mut self, grid: &Grid) {
        let _ = self.send(GridEvent::Completed(grid.snapshot()));
    }
}

impl Renderer for SyncSender<GridEvent> {
    fn initialized(&mut self, size: u16, cell: CellState) {
        let _ = self.send(GridEvent::Initial { cell, size });
    }

    fn cell_changed(&mut self, coord: Coord, old: CellState, new: CellState) {
        let _ = self.send(GridEvent::Update { coord, old, new });
    }

    fn completed(&mut self, grid: &Grid) {
        let _ = self.send(GridEvent::Completed(grid.snapshot()));
    }
}

/// In-memory trace of every event.
impl Renderer for Vec<GridEvent> {
    fn initialized(&mut self, size: u16, cell: CellState) {
        self.push(GridEvent::Initial { cell, size });
    }

    fn cell_changed(&mut self, coord: Coord, old: CellState, new: CellState) {
        self.push(GridEvent::Update { coord, old, new });
    }

    fn completed(&mut self, grid: &Grid) {
        self.push(GridEvent::Completed(grid.snapshot()));
    }
}

/// Square matrix of cell states with a permanently walled border.
pub struct Grid {
    cells: Box<[CellState]>,
    size: u16,
    renderer: Option<Box<dyn Renderer + Send>>,
}

impl Grid {
    /// Smallest size leaving room for a border and an interior double opening.
    pub const MIN_SIZE: u16 = 5;

    /// Creates a `size`x`size` grid filled with walls.
    /// Sizes must be odd so the carved lattice lines up with the border on both sides.
    pub fn new(size: u16) -> Result<Self, MazeError> {
        if size < Self::MIN_SIZE || size % 2 == 0 {
            return Err(MazeError::InvalidSize {
                size: size as usize,
            });
        }
        let cells = vec![CellState::Wall; size as usize * size as usize].into_boxed_slice();
        Ok(Grid {
            cells,
            size,
            renderer: None,
        })
    }

    /// Creates a wall-filled grid that reports every change to `renderer`.
    pub fn with_renderer<R>(size: u16, renderer: R) -> Result<Self, MazeError>
    where
        R: Renderer + Send + 'static,
    {
        let mut grid = Grid::new(size)?;
        let mut renderer: Box<dyn Renderer + Send> = Box::new(renderer);
        renderer.initialized(size, CellState::Wall);
        grid.renderer = Some(renderer);
        Ok(grid)
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Iterates over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.size as usize)
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.0 < self.size && coord.1 < self.size
    }

    /// Strictly inside the border frame.
    pub fn is_interior(&self, coord: Coord) -> bool {
        let (row, col) = coord;
        row > 0 && col > 0 && row < self.size - 1 && col < self.size - 1
    }

    pub fn is_boundary(&self, coord: Coord) -> bool {
        self.in_bounds(coord) && !self.is_interior(coord)
    }

    /// Interior wall. The border never counts, so builders can never open it.
    pub fn is_wall(&self, coord: Coord) -> bool {
        self.is_interior(coord) && self[coord] == CellState::Wall
    }

    /// Interior non-wall cell: passage, start or end.
    pub fn is_passage(&self, coord: Coord) -> bool {
        self.is_interior(coord) && self[coord].is_open()
    }

    pub fn get(&self, coord: Coord) -> Option<CellState> {
        self.in_bounds(coord)
            .then(|| self.cells[self.ravel_index(coord)])
    }

    fn ravel_index(&self, coord: Coord) -> usize {
        // Overflow-safe since size is u16 (assuming usize is at least 32 bits)
        coord.0 as usize * self.size as usize + coord.1 as usize
    }

    /// Overwrites a cell, notifying the renderer when the state actually changes.
    pub fn set(&mut self, coord: Coord, state: CellState) -> Result<(), MazeError> {
        if !self.in_bounds(coord) {
            return Err(MazeError::OutOfBounds { coord });
        }
        let idx = self.ravel_index(coord);
        let old = self.cells[idx];
        if old != state {
            self.cells[idx] = state;
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.cell_changed(coord, old, state);
            }
        }
        Ok(())
    }

    /// First cell in row-major order holding `state`.
    pub fn find(&self, state: CellState) -> Option<Coord> {
        self.cells
            .iter()
            .position(|&cell| cell == state)
            .map(|idx| self.unravel_index(idx))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&cell| cell == state).count()
    }

    fn unravel_index(&self, idx: usize) -> Coord {
        let size = self.size as usize;
        ((idx / size) as u16, (idx % size) as u16)
    }

    /// In-bounds orthogonal neighbors in North, South, West, East order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| dir.step(coord, 1))
            .filter(move |&c| self.in_bounds(c))
    }

    /// Number of orthogonal neighbors that are passages.
    pub fn passage_neighbors(&self, coord: Coord) -> usize {
        self.neighbors(coord)
            .filter(|&c| self.is_passage(c))
            .count()
    }

    /// Refills the grid with walls.
    pub fn reset(&mut self) {
        self.cells.fill(CellState::Wall);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.initialized(self.size, CellState::Wall);
        }
    }

    /// Copy of the cell states without the attached renderer.
    pub fn snapshot(&self) -> Grid {
        Grid {
            cells: self.cells.clone(),
            size: self.size,
            renderer: None,
        }
    }

    /// Removes the renderer, dropping any channel it holds.
    pub fn detach_renderer(&mut self) -> Option<Box<dyn Renderer + Send>> {
        self.renderer.take()
    }

    pub(crate) fn notify_completed(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.completed(self);
            self.renderer = Some(renderer);
        }
    }

    /// Plain-text notation: one line per row, `#` wall, `.` passage, `S` start, `E` end.
    pub fn to_ascii(&self) -> String {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = CellState;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.cells[self.ravel_index(index)]
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size)
            .field("cells", &format_args!("\n{}", self.to_ascii()))
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.cells == other.cells
    }
}

impl FromStr for Grid {
    type Err = MazeError;

    /// Parses the plain-text notation. Blank lines and surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();

        let size = lines.len();
        if lines.iter().any(|line| line.chars().count() != size) {
            return Err(MazeError::InvalidSize { size });
        }
        let mut grid = u16::try_from(size)
            .map_err(|_| MazeError::InvalidSize { size })
            .and_then(Grid::new)?;

        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let state =
                    CellState::from_symbol(ch).ok_or(MazeError::InvalidCell { ch, row, col })?;
                let coord = (row as u16, col as u16);
                if state.is_open() && grid.is_boundary(coord) {
                    return Err(MazeError::BorderPassage { coord });
                }
                grid.set(coord, state)?;
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_new_rejects_bad_sizes() {
        assert_eq!(
            Grid::new(3).unwrap_err(),
            MazeError::InvalidSize { size: 3 }
        );
        assert_eq!(
            Grid::new(8).unwrap_err(),
            MazeError::InvalidSize { size: 8 }
        );
        let grid = Grid::new(5).unwrap();
        assert_eq!(grid.size(), 5);
        assert!(grid.cells().iter().all(|&c| c == CellState::Wall));
    }

    #[test]
    fn test_interior_gating() {
        let mut grid = Grid::new(7).unwrap();
        assert!(grid.in_bounds((6, 6)));
        assert!(!grid.in_bounds((7, 0)));
        assert!(grid.is_interior((1, 5)));
        assert!(!grid.is_interior((0, 3)));
        assert!(!grid.is_interior((3, 6)));

        // A border cell is never a wall nor a passage as far as builders are concerned
        assert!(!grid.is_wall((0, 3)));
        grid.set((0, 3), CellState::Passage).unwrap();
        assert!(!grid.is_passage((0, 3)));

        grid.set((2, 2), CellState::Start).unwrap();
        assert!(grid.is_passage((2, 2)));
        assert!(grid.is_wall((2, 3)));
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut grid = Grid::new(5).unwrap();
        assert_eq!(
            grid.set((5, 1), CellState::Passage),
            Err(MazeError::OutOfBounds { coord: (5, 1) })
        );
        assert_eq!(grid.get((5, 1)), None);
    }

    #[test]
    fn test_find_is_row_major() {
        let mut grid = Grid::new(7).unwrap();
        assert_eq!(grid.find(CellState::Passage), None);
        grid.set((3, 1), CellState::Passage).unwrap();
        grid.set((2, 4), CellState::Passage).unwrap();
        assert_eq!(grid.find(CellState::Passage), Some((2, 4)));
        assert_eq!(grid.count(CellState::Passage), 2);
    }

    #[test]
    fn test_neighbors_order_and_bounds() {
        let grid = Grid::new(5).unwrap();
        let neighbors = grid.neighbors((2, 2)).collect::<Vec<_>>();
        assert_eq!(neighbors, vec![(1, 2), (3, 2), (2, 1), (2, 3)]);
        let corner = grid.neighbors((0, 0)).collect::<Vec<_>>();
        assert_eq!(corner, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn test_renderer_receives_changes_only() {
        let (tx, rx) = mpsc::channel();
        let mut grid = Grid::with_renderer(5, tx).unwrap();
        grid.set((1, 1), CellState::Passage).unwrap();
        // Same state again: no event
        grid.set((1, 1), CellState::Passage).unwrap();
        grid.notify_completed();
        drop(grid.detach_renderer());

        let events = rx.iter().collect::<Vec<_>>();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            GridEvent::Initial {
                cell: CellState::Wall,
                size: 5
            }
        );
        assert_eq!(
            events[1],
            GridEvent::Update {
                coord: (1, 1),
                old: CellState::Wall,
                new: CellState::Passage
            }
        );
        match &events[2] {
            GridEvent::Completed(snapshot) => assert_eq!(snapshot[(1, 1)], CellState::Passage),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_ascii_round_trip() {
        let text = "\
#####
#S..#
###.#
#E..#
#####";
        let grid = text.parse::<Grid>().unwrap();
        assert_eq!(grid[(1, 1)], CellState::Start);
        assert_eq!(grid[(3, 1)], CellState::End);
        assert_eq!(grid.passage_neighbors((1, 2)), 2);
        assert_eq!(grid.to_ascii(), text);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "###\n#.#\n###".parse::<Grid>().unwrap_err(),
            MazeError::InvalidSize { size: 3 }
        );
        assert_eq!(
            "#####\n#.x.#\n#...#\n#...#\n#####"
                .parse::<Grid>()
                .unwrap_err(),
            MazeError::InvalidCell {
                ch: 'x',
                row: 1,
                col: 2
            }
        );
        assert_eq!(
            "##.##\n#...#\n#...#\n#...#\n#####"
                .parse::<Grid>()
                .unwrap_err(),
            MazeError::BorderPassage { coord: (0, 2) }
        );
    }
}
