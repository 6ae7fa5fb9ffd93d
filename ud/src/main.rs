use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, error, info};

use userdata::cli::{Cli, Command};
use userdata::config::Config;
use userdata::{IdAssigner, Pipeline, PipelineEvent, Tee, TracingSink, cleaner, csv_io};

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

/// Append the run separator and route tracing output to the run log
fn setup_logging(log_path: &Path, cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }

    let mut log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .context("Failed to open log file")?;

    let rule = "=".repeat(80);
    write!(
        log_file,
        "\n{rule}\nNew Run: {}\n{rule}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
    )
    .context("Failed to write run separator")?;

    // Priority: CLI --log-level > config file > INFO
    let level = parse_level(cli_log_level.or(config_log_level));

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(&config.log_file, cli.log_level.as_deref(), config.log_level.as_deref())
        .context("Failed to setup logging")?;

    let run_id = uuid::Uuid::now_v7();
    info!(%run_id, "userdata starting");

    match cli.command {
        Command::Run {
            input,
            output,
            seed,
            threshold,
            dry_run,
            events,
        } => {
            if let Some(input) = input {
                config.input = input;
            }
            if let Some(output) = output {
                config.output = output;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(threshold) = threshold {
                config.fill_threshold = threshold;
            }
            config.validate()?;
            debug!(?config, dry_run, "main: effective config");
            cmd_run(&config, dry_run, events)
        }
        Command::Inspect { input } => {
            if let Some(input) = input {
                config.input = input;
            }
            cmd_inspect(&config)
        }
    }
}

fn cmd_run(config: &Config, dry_run: bool, print_events: bool) -> Result<()> {
    let table = csv_io::load(&config.input)
        .inspect_err(|e| error!(error = %e, "Error reading CSV file: {}. Exiting.", config.input.display()))
        .with_context(|| format!("Error reading CSV file: {}. Exiting.", config.input.display()))?;

    let mut pipeline = Pipeline::from_options(&config.pipeline_options());
    let mut collected: Vec<PipelineEvent> = Vec::new();
    let mut logged = TracingSink;
    let mut sink = Tee {
        first: &mut logged,
        second: &mut collected,
    };

    let result = pipeline.run(table, &mut sink);
    if print_events {
        println!("{}", serde_json::to_string_pretty(&collected)?);
    }

    let output = match result {
        Ok(output) => output,
        Err(e) if e.is_data_quality() => {
            eprintln!("{} {}", "!".yellow(), "No data left after cleaning. Check data quality.".yellow());
            return Err(e).context("Pipeline aborted");
        }
        Err(e) => return Err(e).context("Pipeline failed"),
    };

    let collisions = IdAssigner::collisions(&output);
    if !collisions.is_empty() {
        eprintln!("{} duplicate ids: {}", "!".yellow(), collisions.join(", "));
    }

    let columns = output.output_columns().len();
    if dry_run {
        println!(
            "{} Validated {} rows, {} columns (dry run, nothing written)",
            "✓".green(),
            output.len(),
            columns
        );
    } else {
        csv_io::save(&config.output, &output).context("Failed to save validated data")?;
        println!(
            "{} Validated {} rows, {} columns -> {}",
            "✓".green(),
            output.len(),
            columns,
            config.output.display().to_string().cyan()
        );
    }
    Ok(())
}

fn cmd_inspect(config: &Config) -> Result<()> {
    let table = csv_io::load(&config.input)
        .with_context(|| format!("Error reading CSV file: {}", config.input.display()))?;

    println!("File: {}", config.input.display().to_string().cyan());
    println!("  Rows: {}", table.len());
    println!("  Columns: {}", table.field_count());
    println!("  Missing values:");
    for (column, missing) in cleaner::missing_values(&table) {
        let count = if missing > 0 {
            missing.to_string().yellow()
        } else {
            missing.to_string().dimmed()
        };
        println!("    {:<20} {}", column, count);
    }
    Ok(())
}
