use std::{
    fmt,
    io::{Stdout, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Receiver,
    },
    time::Duration,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::maze::{CellState, Coord, GridEvent};

/// How a render loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Every event was drawn and the event channel closed.
    Completed,
    /// The user asked to stop.
    Cancelled,
    /// The terminal cannot fit the grid.
    TooSmall { size: u16 },
}

/// Draws grid events on the terminal with crossterm.
pub struct TerminalRenderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    /// Side length of the grid being drawn, once known
    size: Option<u16>,
    /// Time to wait after each drawn cell
    refresh: Duration,
}

impl TerminalRenderer {
    /// Glyph drawn over passages on the solution path.
    const PATH_GLYPH: &'static str = "🟨";

    pub fn new(refresh: Duration) -> Self {
        Self {
            stdout: std::io::stdout(),
            size: None,
            refresh,
        }
    }

    /// Whether a `size`x`size` grid plus one status line fits in the terminal.
    fn fits(size: u16) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        Ok(term_width >= size.saturating_mul(CellState::CELL_WIDTH) && term_height > size)
    }

    fn draw_cell(&mut self, coord: Coord, content: impl fmt::Display) -> std::io::Result<()> {
        let (row, col) = coord;
        queue!(
            self.stdout,
            cursor::MoveTo(col * CellState::CELL_WIDTH, row),
            style::Print(content)
        )?;
        self.stdout.flush()
    }

    /// Draws a single grid event.
    /// Returns Ok(false) if the grid does not fit in the terminal.
    fn draw_event(&mut self, event: &GridEvent) -> std::io::Result<bool> {
        match event {
            GridEvent::Initial { cell, size } => {
                let size = *size;
                if !TerminalRenderer::fits(size)? {
                    return Ok(false);
                }
                self.size = Some(size);

                self.stdout.queue(cursor::MoveTo(0, 0))?;
                for _row in 0..size {
                    for _col in 0..size {
                        self.stdout.queue(style::Print(cell))?;
                    }
                    self.stdout.queue(style::Print("\r\n"))?;
                }
                self.stdout.flush()?;
            }
            GridEvent::Update { coord, new, .. } => {
                // Updates before the first fill have nowhere to go
                if self.size.is_some() {
                    self.draw_cell(*coord, new)?;
                    std::thread::sleep(self.refresh);
                }
            }
            GridEvent::Completed(_) => {}
        }
        Ok(true)
    }

    /// Draws events until the sending side hangs up or `cancel` is raised.
    pub fn render(
        &mut self,
        grid_event_rx: Receiver<GridEvent>,
        cancel: &AtomicBool,
    ) -> std::io::Result<RenderStatus> {
        queue!(self.stdout, terminal::Clear(ClearType::All), cursor::Hide)?;
        self.stdout.flush()?;

        for event in grid_event_rx {
            if cancel.load(Ordering::Relaxed) {
                return Ok(RenderStatus::Cancelled);
            }
            if let GridEvent::Initial { size, .. } = event {
                if !self.draw_event(&event)? {
                    tracing::warn!("[render] terminal too small for a {}x{} grid", size, size);
                    cancel.store(true, Ordering::Relaxed);
                    return Ok(RenderStatus::TooSmall { size });
                }
                continue;
            }
            self.draw_event(&event)?;
        }
        Ok(RenderStatus::Completed)
    }

    /// Traces `path` over the drawn maze, starting next to the entrance.
    /// The entrance and exit keep their own glyphs.
    pub fn draw_path(&mut self, path: &[Coord]) -> std::io::Result<()> {
        if path.len() < 3 {
            return Ok(());
        }
        for &coord in path[1..path.len() - 1].iter().rev() {
            self.draw_cell(coord, TerminalRenderer::PATH_GLYPH.with(Color::Yellow))?;
            std::thread::sleep(self.refresh);
        }
        Ok(())
    }

    /// Prints `message` on the line below the maze.
    pub fn draw_status(&mut self, message: &str) -> std::io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, self.size.unwrap_or(0)),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(message.with(Color::Green).attribute(Attribute::Bold)),
            cursor::Show
        )?;
        self.stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn test_path_glyph_matches_cell_width() {
        assert_eq!(
            TerminalRenderer::PATH_GLYPH.width(),
            CellState::CELL_WIDTH as usize
        );
    }
}
