//! Long-running service: engine consumer, producers, and supervisor.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Map, Value};

use crate::adapters::json::{JsonActionLog, JsonSafetyRegister, JsonStateStore};
use crate::adapters::llm::{AnthropicClassifier, AnthropicConfig};
use crate::domain::models::config::Config;
use crate::domain::ports::ActionLogStore;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{Fanout, Producers, Supervisor, ToolDispatcher, TriageEngine};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file (defaults to floorwatch.yaml plus env overrides)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print every broadcast notice to stdout as a JSON line
    #[arg(short, long)]
    pub follow: bool,
}

pub async fn execute(args: RunArgs, _json: bool) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir))?;

    let data_dir = PathBuf::from(&config.data_dir);
    let fanout = Fanout::new(config.fanout.capacity);
    let action_log: Arc<JsonActionLog> = Arc::new(
        JsonActionLog::new(data_dir.join("action_log.json")).with_emitter(Arc::new(fanout.clone())),
    );
    let safety = Arc::new(JsonSafetyRegister::new(data_dir.join("safety_logs.json")));
    let state = Arc::new(JsonStateStore::new(data_dir.join("supervisor_state.json")));
    let dispatcher = ToolDispatcher::new(action_log.clone());

    let mut engine = TriageEngine::new(
        dispatcher.clone(),
        action_log.clone(),
        safety.clone(),
        fanout.clone(),
    );
    if config.classifier.use_llm {
        let classifier = AnthropicClassifier::new(AnthropicConfig::from(&config.classifier))?;
        engine = engine.with_primary_classifier(Arc::new(classifier));
        tracing::info!(model = %config.classifier.model, "LLM classifier enabled");
    }
    let engine = Arc::new(engine);

    action_log.record(entry(json!({
        "actor": "system",
        "action": "startup",
        "data_dir": config.data_dir
    })));

    let consumer = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.run_loop().await })
    };

    let producers = Arc::new(Producers::new(
        Arc::clone(&engine),
        action_log.clone() as Arc<dyn ActionLogStore>,
        safety.clone(),
        &config.data_dir,
        config.producers.clone(),
    ));
    let mut handles = producers.spawn();
    handles.push(consumer);

    let supervisor = Supervisor::new(
        action_log.clone() as Arc<dyn ActionLogStore>,
        dispatcher,
        state,
        config.supervisor.clone(),
    );
    handles.push(tokio::spawn(async move { supervisor.run_loop().await }));

    if args.follow {
        let mut rx = fanout.subscribe();
        handles.push(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notice) => match serde_json::to_string(&notice) {
                        Ok(line) => println!("{line}"),
                        Err(e) => tracing::warn!("notice serialization failed: {e}"),
                    },
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "follow stream lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    tracing::info!("floorwatch running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;

    action_log.record(entry(json!({"actor": "system", "action": "shutdown"})));
    for handle in handles {
        handle.abort();
    }
    Ok(())
}

pub(crate) fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(p) => ConfigLoader::load_from_file(p),
        None => ConfigLoader::load(),
    }
}

fn entry(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
