//! One-shot triage: run a single event through the full pipeline.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::json::{JsonActionLog, JsonSafetyRegister};
use crate::domain::models::Event;
use crate::services::{Fanout, ToolDispatcher, TriageEngine};

#[derive(Args, Debug)]
pub struct TriageArgs {
    /// Event as a JSON object (reads stdin when omitted and no --file)
    pub event: Option<String>,

    /// Read the event from a JSON file
    #[arg(short = 'F', long, conflicts_with = "event")]
    pub file: Option<PathBuf>,

    /// Configuration file (defaults to floorwatch.yaml plus env overrides)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: TriageArgs, json: bool) -> Result<()> {
    let raw = read_input(&args)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("event is not valid JSON")?;
    let event = Event::from_value(value)?;

    let config = super::run::load_config(args.config.as_deref())?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir))?;
    let data_dir = PathBuf::from(&config.data_dir);

    let action_log = Arc::new(JsonActionLog::new(data_dir.join("action_log.json")));
    let safety = Arc::new(JsonSafetyRegister::new(data_dir.join("safety_logs.json")));
    let engine = TriageEngine::new(
        ToolDispatcher::new(action_log.clone()),
        action_log,
        safety,
        Fanout::new(config.fanout.capacity),
    );

    let record = engine.process_one(event).await?;
    let output = if json {
        serde_json::to_string(&record)?
    } else {
        serde_json::to_string_pretty(&record)?
    };
    println!("{output}");
    Ok(())
}

fn read_input(args: &TriageArgs) -> Result<String> {
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    if let Some(event) = &args.event {
        return Ok(event.clone());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading event from stdin")?;
    Ok(buf)
}
