// SPDX-License-Identifier: MIT OR Apache-2.0
//! flowfunc command line
//!
//! Compile schemas, compute fit-to-view transforms and replay editor sessions
//! without a browser.

use clap::{Parser, Subcommand};
use flowfunc_app::{replay, AppError, Script};
use flowfunc_graph::{fit_nodes, Compiler, FitOptions, NodeMap, Schema};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "flowfunc", version, about = "flowfunc node editor tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a schema (.json or .ron) and print the registry
    Compile {
        /// Schema file
        schema: PathBuf,
        /// Let every port accept every type
        #[arg(long)]
        no_type_safety: bool,
    },
    /// Print the transform that fits a node set into a viewport
    Fit {
        /// JSON object of nodes keyed by id
        nodes: PathBuf,
        /// Viewport width in pixels
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        /// Viewport height in pixels
        #[arg(long, default_value_t = 720.0)]
        height: f32,
        /// Padding around the node bounds
        #[arg(long, default_value_t = flowfunc_graph::viewport::DEFAULT_FIT_PADDING)]
        padding: f32,
        /// Lowest zoom level
        #[arg(
            long,
            default_value_t = flowfunc_graph::viewport::DEFAULT_MIN_SCALE,
            value_parser = positive_scale
        )]
        min_scale: f32,
    },
    /// Run a scripted session and print each output as a JSON line
    Replay {
        /// Script file
        script: PathBuf,
    },
}

fn positive_scale(value: &str) -> Result<f32, String> {
    let scale: f32 = value.parse().map_err(|e| format!("{e}"))?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(format!("scale must be a positive number, got {value}"))
    }
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("flowfunc=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Compile {
            schema,
            no_type_safety,
        } => {
            let schema = Schema::load(&schema)?;
            let registry = Compiler::new().compile(&schema, !no_type_safety)?;
            for skipped in registry.skipped_registrations() {
                tracing::info!("Skipped {:?} '{}'", skipped.kind, skipped.id);
            }
            println!("{}", serde_json::to_string_pretty(&registry)?);
        }
        Command::Fit {
            nodes,
            width,
            height,
            padding,
            min_scale,
        } => {
            let nodes: NodeMap = serde_json::from_str(&std::fs::read_to_string(&nodes)?)?;
            let options = FitOptions { padding, min_scale };
            match fit_nodes(nodes.values(), egui::Vec2::new(width, height), &options) {
                Some(transform) => println!("{}", serde_json::to_string(&transform)?),
                None => tracing::warn!("Nothing to fit"),
            }
        }
        Command::Replay { script } => {
            let outputs = replay::run(Script::load(&script)?, Compiler::new())?;
            for output in outputs {
                println!("{}", serde_json::to_string(&output)?);
            }
        }
    }
    Ok(())
}
