//! `loom`: play a Storyloom story in the terminal.

mod load;
mod shell;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;
use sl_fiction::Session;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "loom",
    about = "Storyloom: play interactive fiction written in markdown",
    version
)]
struct Cli {
    /// Story documents, read in the order given
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli.files) {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}

/// Logs go to stderr so they never interleave with the story on stdout.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(files: &[PathBuf]) -> Result<(), String> {
    let world = load::load(files)?;
    let session = Session::new(world).map_err(|e| e.to_string())?;
    shell::run(session, io::stdin().lock(), io::stdout().lock())
        .map_err(|e| format!("terminal: {e}"))
}
