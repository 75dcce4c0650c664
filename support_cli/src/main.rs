//! # support-cli
//!
//! Command-line front end for the masonry support optimizer.
//!
//! ```text
//! support-cli optimize --inputs job.json [--settings engine.toml] [--json] [--output result.json]
//! support-cli verify   --inputs job.json --candidate candidate.json [--trace]
//! support-cli channels [--family CPRO50]
//! support-cli settings
//! ```

mod file_io;
mod report;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use support_core::verification::{LogTrace, RecordingTrace, VerificationTrace};
use support_core::{assess_candidate, optimize_with_progress, ChannelStore, EngineSettings};

#[derive(Parser)]
#[command(name = "support-cli", version, about = "Masonry support bracket and angle optimizer")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the lightest passing design
    Optimize {
        /// Design inputs (JSON)
        #[arg(long)]
        inputs: PathBuf,
        /// Engine settings (TOML, or JSON with a .json extension)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Print the result as JSON instead of a report
        #[arg(long)]
        json: bool,
        /// Also write the JSON result to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Verify a single candidate
    Verify {
        /// Design inputs (JSON)
        #[arg(long)]
        inputs: PathBuf,
        /// Candidate parameters (JSON)
        #[arg(long)]
        candidate: PathBuf,
        /// Engine settings (TOML, or JSON with a .json extension)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Include every intermediate quantity in the report
        #[arg(long)]
        trace: bool,
        /// Print the result as JSON instead of a report
        #[arg(long)]
        json: bool,
        /// Also write the JSON result to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the anchor channel capacity table
    Channels {
        /// Show every row of one family
        #[arg(long)]
        family: Option<String>,
    },
    /// Print the default engine settings as TOML
    Settings,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Optimize {
            inputs,
            settings,
            json,
            output,
        } => {
            let design_inputs = file_io::load_inputs(&inputs)?;
            let settings = load_settings(settings.as_deref())?;
            let channels = ChannelStore::embedded()?;

            let mut last_reported = 0;
            let result = optimize_with_progress(&design_inputs, &settings, channels, &mut |p| {
                // Roughly every tenth of the space
                if p.evaluated == p.total || p.evaluated - last_reported >= p.total / 10 {
                    last_reported = p.evaluated;
                    info!(
                        evaluated = p.evaluated,
                        total = p.total,
                        best_mass = p.best_mass,
                        "search progress"
                    );
                }
            })
            .with_context(|| format!("optimizing {}", inputs.display()))?;

            emit(&result, json, output.as_deref(), || report::optimization(&result))
        }

        Commands::Verify {
            inputs,
            candidate,
            settings,
            trace,
            json,
            output,
        } => {
            let design_inputs = file_io::load_inputs(&inputs)?;
            let params = file_io::load_parameters(&candidate)?;
            let settings = load_settings(settings.as_deref())?;
            let channels = ChannelStore::embedded()?;

            let mut recording = RecordingTrace::new();
            let mut logging = LogTrace;
            let observer: &mut dyn VerificationTrace = if trace {
                &mut recording
            } else {
                &mut logging
            };
            let design = assess_candidate(&design_inputs, &params, &settings, channels, observer)
                .with_context(|| format!("verifying {}", candidate.display()))?;

            let trail = trace.then_some(&recording);
            emit(&design, json, output.as_deref(), || {
                report::verification(&design, trail)
            })
        }

        Commands::Channels { family } => {
            let channels = ChannelStore::embedded()?;
            if let Some(name) = family.as_deref() {
                if !channels.contains(name) {
                    bail!(
                        "unknown channel family '{}' (known: {})",
                        name,
                        channels.families().join(", ")
                    );
                }
            }
            print!("{}", report::channels(channels, family.as_deref()));
            Ok(())
        }

        Commands::Settings => {
            print!("{}", EngineSettings::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<EngineSettings> {
    match path {
        Some(path) => file_io::load_settings(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(EngineSettings::default()),
    }
}

/// Print as JSON or as a report, and optionally save the JSON.
fn emit<T: Serialize>(
    value: &T,
    json: bool,
    output: Option<&Path>,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    if let Some(path) = output {
        file_io::save_json(value, path)?;
        info!(path = %path.display(), "result written");
    }
    Ok(())
}
