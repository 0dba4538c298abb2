//! Command-line frontend for the Grapplefall simulation.

mod commands;
mod logging;
mod script;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gf",
    about = "Grapplefall: run, inspect and generate platformer levels headlessly",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log simulation internals at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a level headlessly and report what happened
    Run {
        /// Level file to load
        level: PathBuf,

        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// Input script: lines of `<from>[-<to>] <actions...>`
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// JSON file overriding simulation tuning
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Timestamp input with real time instead of frame time
        #[arg(long)]
        wall_clock: bool,
    },

    /// Load a level and report lines that would be skipped
    Check {
        /// Level file to check
        level: PathBuf,
    },

    /// List the entities of a level
    List {
        /// Level file to load
        level: PathBuf,

        /// Only entities carrying this tag (e.g. enemy, hookable)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Write a level in another format
    Export {
        /// Level file to load
        level: PathBuf,

        /// Output format: level, json
        #[arg(short, long, default_value = "level")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a small playable template level
    New {
        /// Where to write the level
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            level,
            ticks,
            script,
            config,
            wall_clock,
        } => commands::run::run(&commands::run::RunOptions {
            level: &level,
            ticks,
            script: script.as_deref(),
            config: config.as_deref(),
            wall_clock,
            verbose: cli.verbose,
        }),
        Commands::Check { level } => commands::check::run(&level),
        Commands::List { level, tag } => commands::list::run(&level, tag.as_deref()),
        Commands::Export {
            level,
            format,
            output,
        } => commands::export::run(&level, &format, output.as_deref()),
        Commands::New { path } => commands::new::run(&path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
