mod renderer;

pub use renderer::{RenderStatus, TerminalRenderer};

use std::{
    collections::HashSet,
    io::{Stdout, Write},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::SyncSender,
    },
    time::Duration,
};

use crossterm::{
    cursor,
    event::{self, KeyCode},
    queue,
    terminal::{self, ClearType},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::{
    error::{AppError, MazeError},
    generators::{Algorithm, StepOutcome, build, builder, get_rng},
    maze::{CellState, Coord, Grid, GridEvent},
    solvers::solve,
};

/// Terminal driver: carves a maze on a compute thread while a render thread draws it.
pub struct App {
    /// Time to wait after each drawn cell
    refresh: Duration,
    /// Maximum number of grid events buffered between the compute and render threads
    buffer: usize,
    /// How often the input thread checks whether rendering is over
    input_poll_timeout: Duration,
}

impl Default for App {
    fn default() -> Self {
        Self {
            refresh: Duration::from_millis(10),
            buffer: 1000,
            input_poll_timeout: Duration::from_millis(100),
        }
    }
}

impl App {
    pub fn new(refresh: Duration) -> Self {
        Self {
            refresh,
            ..Self::default()
        }
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Animates carving a `size`x`size` maze, then traces its solution.
    ///
    /// Expects the terminal to be set up already. Esc stops the animation at any time;
    /// once the path is drawn, Esc exits.
    pub fn animate(
        &self,
        algorithm: Algorithm,
        size: u16,
        seed: Option<u64>,
    ) -> Result<RenderStatus, AppError> {
        // Set by the main thread once there is nothing left to watch for
        let render_done = Arc::new(AtomicBool::new(false));
        // Set by the input thread on Esc, or by the render thread if the grid cannot be shown
        let render_cancel = Arc::new(AtomicBool::new(false));

        let input_thread_handle = {
            let poll_timeout = self.input_poll_timeout;
            let done = render_done.clone();
            let cancel = render_cancel.clone();
            std::thread::spawn(move || App::listen_for_esc(poll_timeout, &done, &cancel))
        };

        let (grid_event_tx, grid_event_rx) =
            std::sync::mpsc::sync_channel::<GridEvent>(self.buffer);

        let render_thread_handle = {
            let refresh = self.refresh;
            let cancel = render_cancel.clone();
            std::thread::spawn(move || -> std::io::Result<_> {
                let mut renderer = TerminalRenderer::new(refresh);
                let status = renderer.render(grid_event_rx, &cancel)?;
                Ok((renderer, status))
            })
        };

        let compute_thread_handle = {
            let cancel = render_cancel.clone();
            std::thread::spawn(move || App::compute(algorithm, size, seed, grid_event_tx, &cancel))
        };

        let grid = compute_thread_handle
            .join()
            .map_err(|_| AppError::ThreadPanicked("compute"))?;
        let rendered = render_thread_handle
            .join()
            .map_err(|_| AppError::ThreadPanicked("render"))?;

        let outcome = match (grid, rendered) {
            (Err(e), _) => Err(e.into()),
            (_, Err(e)) => Err(e.into()),
            (Ok(Some(grid)), Ok((renderer, RenderStatus::Completed))) => {
                App::present(renderer, &grid, &render_cancel)
            }
            (Ok(_), Ok((_, RenderStatus::Completed))) => Ok(RenderStatus::Cancelled),
            (Ok(_), Ok((_, status))) => Ok(status),
        };

        render_done.store(true, Ordering::Relaxed);
        let _ = input_thread_handle.join();

        if matches!(outcome, Ok(RenderStatus::Completed)) && !render_cancel.load(Ordering::Relaxed)
        {
            App::wait_for_esc()?;
        }
        outcome
    }

    /// Solves the finished grid and draws the result below the maze.
    fn present(
        mut renderer: TerminalRenderer,
        grid: &Grid,
        cancel: &AtomicBool,
    ) -> Result<RenderStatus, AppError> {
        let path = solve(grid)?;
        renderer.draw_path(&path)?;
        if cancel.load(Ordering::Relaxed) {
            return Ok(RenderStatus::Cancelled);
        }
        renderer.draw_status(&format!(
            "Path of {} steps found. Press Esc to exit...",
            path.len() - 1
        ))?;
        Ok(RenderStatus::Completed)
    }

    /// Profiling mode: carve and solve repeatedly, discarding grid events instead of
    /// drawing them.
    pub fn profile(
        &self,
        algorithm: Algorithm,
        size: u16,
        iterations: usize,
    ) -> Result<(), AppError> {
        let (grid_event_tx, grid_event_rx) =
            std::sync::mpsc::sync_channel::<GridEvent>(self.buffer);

        let drain_thread_handle = std::thread::spawn(move || grid_event_rx.into_iter().count());

        let compute_thread_handle = std::thread::spawn(move || -> Result<(), AppError> {
            for iteration in 0..iterations {
                let grid = Grid::with_renderer(size, grid_event_tx.clone())?;
                let grid = build(algorithm, grid, get_rng(None))?;
                let path = solve(&grid)?;
                tracing::debug!(
                    "[profile] iteration {} solved in {} steps",
                    iteration,
                    path.len() - 1
                );
            }
            Ok(())
        });

        compute_thread_handle
            .join()
            .map_err(|_| AppError::ThreadPanicked("compute"))??;
        let events = drain_thread_handle
            .join()
            .map_err(|_| AppError::ThreadPanicked("drain"))?;
        tracing::info!(
            "[profile] {} iterations of {} produced {} grid events",
            iterations,
            algorithm,
            events
        );
        Ok(())
    }

    /// Runs the builder step by step, reporting every change through `grid_event_tx`.
    /// Returns `None` if cancelled before the maze was finished.
    fn compute(
        algorithm: Algorithm,
        size: u16,
        seed: Option<u64>,
        grid_event_tx: SyncSender<GridEvent>,
        cancel: &AtomicBool,
    ) -> Result<Option<Grid>, MazeError> {
        let grid = Grid::with_renderer(size, grid_event_tx)?;
        let mut builder = builder(algorithm, grid, get_rng(seed))?;
        while !cancel.load(Ordering::Relaxed) {
            if builder.step()? == StepOutcome::Done {
                let mut grid = builder.into_grid();
                // Closes the channel so the render loop can finish
                drop(grid.detach_renderer());
                return Ok(Some(grid));
            }
        }
        tracing::info!("[compute] cancelled while carving");
        Ok(None)
    }

    /// Raises `cancel` on Esc. Runs until `done` or `cancel` is set.
    fn listen_for_esc(
        poll_timeout: Duration,
        done: &AtomicBool,
        cancel: &AtomicBool,
    ) -> std::io::Result<()> {
        while !done.load(Ordering::Relaxed) && !cancel.load(Ordering::Relaxed) {
            if !event::poll(poll_timeout)? {
                continue;
            }
            if let event::Event::Key(event::KeyEvent {
                code: KeyCode::Esc,
                kind: event::KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                tracing::debug!("[input loop] Esc key pressed, cancelling");
                cancel.store(true, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Wait for the user to press the Esc key
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if code == KeyCode::Esc && kind == event::KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Plain-text notation of `grid` with the passages on `path` drawn as `*`.
pub fn ascii_solution(grid: &Grid, path: &[Coord]) -> String {
    let on_path = path.iter().copied().collect::<HashSet<_>>();
    grid.rows()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, &cell)| {
                    let coord = (row as u16, col as u16);
                    if cell == CellState::Passage && on_path.contains(&coord) {
                        '*'
                    } else {
                        cell.symbol()
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Installs a `RUST_LOG`-filtered subscriber writing to `log_file`.
///
/// The terminal is used for drawing, so logs never go to stdout. Keep the returned
/// guard alive until exit so buffered lines get flushed.
pub fn init_logging(log_file: &Path) -> std::io::Result<WorkerGuard> {
    let directory = log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = log_file.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log file path {} has no file name", log_file.display()),
        )
    })?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(std::io::Error::other)?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_rng::ZeroRng;

    #[test]
    fn test_ascii_solution_marks_path() {
        let grid = build(Algorithm::PrimSimple, Grid::new(9).unwrap(), ZeroRng).unwrap();
        let path = solve(&grid).unwrap();
        assert_eq!(
            ascii_solution(&grid, &path),
            [
                "#########",
                "##S######",
                "##*######",
                "##*....##",
                "##*######",
                "##****E##",
                "#########",
                "#########",
                "#########",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_compute_stops_when_cancelled() {
        let (tx, rx) = std::sync::mpsc::sync_channel(16);
        let cancel = AtomicBool::new(true);
        let grid = App::compute(Algorithm::IterativeDfs, 9, Some(1), tx, &cancel).unwrap();
        assert!(grid.is_none());
        // Only the grid fill made it through before the builder was dropped
        let events = rx.into_iter().collect::<Vec<_>>();
        assert!(
            events
                .iter()
                .all(|event| matches!(event, GridEvent::Initial { .. }))
        );
    }

    #[test]
    fn test_compute_finishes_and_closes_channel() {
        let (tx, rx) = std::sync::mpsc::sync_channel(10_000);
        let cancel = AtomicBool::new(false);
        let grid = App::compute(Algorithm::PrimSimple, 9, None, tx, &cancel)
            .unwrap()
            .unwrap();
        let events = rx.into_iter().collect::<Vec<_>>();
        assert_eq!(events.last(), Some(&GridEvent::Completed(grid.snapshot())));
        assert_eq!(grid.count(CellState::Start), 1);
    }

    #[test]
    fn test_profile_runs_headless() {
        let app = App::default();
        app.profile(Algorithm::PrimSingleOpen, 15, 3).unwrap();
    }
}
