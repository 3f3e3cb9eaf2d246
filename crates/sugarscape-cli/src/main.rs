//! Sugarscape CLI - run and inspect oracle-driven grid simulations.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "sugarscape")]
#[command(author, version, about = "Sugarscape - agents competing for regenerating energy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default sugarscape.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing sugarscape.toml
        #[arg(long)]
        force: bool,
    },

    /// Run one simulation and save the artifact
    Run {
        /// Number of ticks to run (default: from config)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Random seed (default: from config, else entropy)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Directory that receives run_NN folders (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: sugarscape.toml searched upward)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// API key for the language-model backend
        #[arg(long, env = "SUGARSCAPE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model name, overriding the config
        #[arg(long)]
        model: Option<String>,

        /// Use the offline mock backend even when a key is available
        #[arg(long)]
        mock: bool,
    },

    /// Summarize a saved run artifact
    Show {
        /// Path to a run_NN.json file
        file: PathBuf,

        /// Print one line per tick
        #[arg(short, long)]
        ticks: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { path, force } => commands::init::run(path, force),
        Commands::Run {
            ticks,
            seed,
            output,
            config,
            api_key,
            model,
            mock,
        } => {
            let opts = commands::run::RunOptions {
                ticks,
                seed,
                output,
                config,
                api_key: if mock { None } else { api_key },
                model,
            };
            commands::run::run(opts, cli.verbose).await
        }
        Commands::Show { file, ticks } => commands::show::run(&file, ticks),
    }
}
