//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "floorwatch")]
#[command(about = "Floorwatch - Shop-floor event triage engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the triage engine, producers, and supervisor
    Run(commands::run::RunArgs),

    /// Triage a single event and print the result
    Triage(commands::triage::TriageArgs),

    /// Show recent action log entries
    Logs(commands::logs::LogsArgs),
}

/// Report a fatal command error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        let payload = serde_json::json!({"error": err.to_string()});
        eprintln!("{payload}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
