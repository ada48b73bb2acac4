use std::path::PathBuf;

use clap::Parser;

use mazecarve::{Algorithm, app::App, app::init_logging};

/// Carve and solve mazes repeatedly without drawing, for profiling.
#[derive(Parser, Debug)]
#[command(name = "profile")]
struct Args {
    /// Number of carve-and-solve iterations
    #[arg(default_value_t = 1)]
    iterations: usize,
    #[arg(short, long, default_value = "prim-weighted")]
    algorithm: Algorithm,
    #[arg(short, long, default_value_t = 255)]
    size: u16,
    #[arg(long, default_value = "profile.log")]
    log_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_logging(&args.log_file)?;
    let app = App::default();
    app.profile(args.algorithm, args.size, args.iterations)?;
    Ok(())
}
