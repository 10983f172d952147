use std::io::stdout;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rand::thread_rng;

mod engine;
mod error;
mod tui;
mod tuichase;

use engine::clock::SystemClock;
use engine::game::{GameEngine, Settings};
use engine::grid::GridSize;
use engine::random::RngSource;
use tui::crossterm::{Crossterm, CrosstermEvents};
use tuichase::TuiChase;

/// Two players race to catch a target that keeps jumping around the grid.
#[derive(Parser, Debug)]
#[command(name = "tuichase", version, about, long_about = None)]
struct Cli {
    /// Number of grid rows
    #[arg(long, default_value_t = 5)]
    rows: usize,

    /// Number of grid columns
    #[arg(long, default_value_t = 5)]
    columns: usize,

    /// Milliseconds between target jumps
    #[arg(long, default_value_t = 1000.0)]
    interval_ms: f64,

    /// Number of jumps after which the target has escaped
    #[arg(long, default_value_t = 10)]
    win_threshold: u32,

    /// File to write logs to; the terminal belongs to the game
    #[arg(long, default_value = "./tuichase.log")]
    log_file: PathBuf,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let grid_size = GridSize::new(self.rows, self.columns)?;
        Ok(Settings::new(
            grid_size,
            self.interval_ms,
            self.win_threshold,
        )?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message,
            ))
        })
        .level(cli.verbose.log_level_filter())
        .chain(fern::log_file(&cli.log_file)?)
        .apply()?;

    log::info!("starting with {:?}", settings);

    let engine = GameEngine::new(RngSource::new(thread_rng()), SystemClock, settings);
    let w = stdout().lock();
    let renderer = Crossterm::new(Box::new(w))?;
    let tui = TuiChase::new(engine, renderer, CrosstermEvents);

    let engine = tui.run()?;
    match engine.winner() {
        Some(player) => log::info!("last game won by {}", player),
        None => log::info!("last game ended {}", engine.phase()),
    }

    Ok(())
}
