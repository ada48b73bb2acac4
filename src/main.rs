use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;

use mazecarve::{
    Algorithm,
    app::{App, RenderStatus, ascii_solution, init_logging},
    generate, solve,
};

/// Carve a random maze and find its way out.
#[derive(Parser, Debug)]
#[command(name = "mazecarve", version, about)]
struct Cli {
    /// Carving algorithm: prim-simple, prim-weighted, prim-single-open or iterative-dfs
    #[arg(short, long, default_value = "prim-simple")]
    algorithm: Algorithm,
    /// Side length of the square grid, odd and at least 5
    #[arg(short, long, default_value_t = 49)]
    size: u16,
    /// Seed for reproducible mazes
    #[arg(long)]
    seed: Option<u64>,
    /// Animate carving in the terminal instead of printing the result
    #[arg(long)]
    animate: bool,
    /// Delay after each drawn cell when animating, in milliseconds
    #[arg(long, default_value_t = 10)]
    refresh_ms: u64,
    /// Where to write logs
    #[arg(long, default_value = "mazecarve.log")]
    log_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_file)
        .with_context(|| format!("failed to open log file {}", cli.log_file.display()))?;
    tracing::info!("[main] starting with {:?}", cli);

    if !cli.animate {
        let generated = generate(cli.algorithm, cli.size, cli.seed, false)
            .with_context(|| format!("failed to carve a {}x{} maze", cli.size, cli.size))?;
        let path = solve(&generated.grid).context("failed to solve the maze")?;
        println!("{}", ascii_solution(&generated.grid, &path));
        println!(
            "{}: {}x{} maze, path of {} steps",
            cli.algorithm,
            cli.size,
            cli.size,
            path.len() - 1
        );
        return Ok(());
    }

    let app = App::new(Duration::from_millis(cli.refresh_ms));
    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = app.animate(cli.algorithm, cli.size, cli.seed);
    App::restore_terminal(&mut stdout)?;

    match result.context("animation failed")? {
        RenderStatus::Completed => {}
        RenderStatus::Cancelled => tracing::info!("[main] animation cancelled by user"),
        RenderStatus::TooSmall { size } => eprintln!(
            "Terminal is too small for a {}x{} maze. Resize it or pick a smaller --size.",
            size, size
        ),
    }
    Ok(())
}
