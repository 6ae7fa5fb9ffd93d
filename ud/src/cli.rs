//! CLI argument parsing for userdata

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ud")]
#[command(author, version, about = "Validate and deduplicate a batch of user-account records", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clean, validate, deduplicate and assign ids to a batch
    Run {
        /// Input CSV (default from config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for synthetic emails and names
        #[arg(short, long)]
        seed: Option<u64>,

        /// Share of fields a row must fill to survive cleaning
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Run the pipeline without writing the output file
        #[arg(long)]
        dry_run: bool,

        /// Print the diagnostic events as JSON
        #[arg(long)]
        events: bool,
    },

    /// Show row, column and missing-value counts without validating
    Inspect {
        /// Input CSV (default from config)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}
