//! Inspect the durable action log.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::adapters::json::JsonActionLog;
use crate::domain::ports::ActionLogStore;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Maximum number of entries to show (newest first)
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Only show notifications at this level (info, warning, critical)
    #[arg(long)]
    pub level: Option<String>,

    /// Configuration file (defaults to floorwatch.yaml plus env overrides)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: LogsArgs, json: bool) -> Result<()> {
    let config = super::run::load_config(args.config.as_deref())?;
    let store = JsonActionLog::new(PathBuf::from(&config.data_dir).join("action_log.json"));

    let entries: Vec<_> = store
        .read_all()
        .into_iter()
        .filter(|e| match &args.level {
            Some(level) => e.level() == Some(level.as_str()),
            None => true,
        })
        .take(args.limit)
        .collect();

    if json {
        println!("{}", serde_json::to_string(&entries)?);
    } else {
        for entry in &entries {
            println!("{}", serde_json::to_string(entry)?);
        }
    }
    Ok(())
}
