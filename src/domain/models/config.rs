//! Configuration tree for floorwatch.

use serde::{Deserialize, Serialize};

/// Main configuration structure for floorwatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Directory holding the durable JSON files and inventory inputs.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Producer scan loop configuration.
    #[serde(default)]
    pub producers: ProducersConfig,

    /// Supervisor oversight configuration.
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    /// Classifier primary-path configuration.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Observer fanout configuration.
    #[serde(default)]
    pub fanout: FanoutConfig,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            producers: ProducersConfig::default(),
            supervisor: SupervisorConfig::default(),
            classifier: ClassifierConfig::default(),
            fanout: FanoutConfig::default(),
        }
    }
}

/// Intervals for the periodic producer scans, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProducersConfig {
    #[serde(default = "default_shopfloor_interval")]
    pub shopfloor_interval_secs: u64,
    #[serde(default = "default_order_interval")]
    pub order_interval_secs: u64,
    #[serde(default = "default_safety_interval")]
    pub safety_interval_secs: u64,
}

const fn default_shopfloor_interval() -> u64 {
    8
}
const fn default_order_interval() -> u64 {
    10
}
const fn default_safety_interval() -> u64 {
    6
}

impl Default for ProducersConfig {
    fn default() -> Self {
        Self {
            shopfloor_interval_secs: default_shopfloor_interval(),
            order_interval_secs: default_order_interval(),
            safety_interval_secs: default_safety_interval(),
        }
    }
}

/// Supervisor tick cadence and policy thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SupervisorConfig {
    /// Seconds between oversight ticks.
    #[serde(default = "default_supervisor_interval")]
    pub interval_secs: u64,
    /// Trailing window examined each tick, in minutes.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
    /// Critical notifications within the window that trigger escalation.
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: usize,
}

const fn default_supervisor_interval() -> u64 {
    60
}
const fn default_window_minutes() -> i64 {
    60
}
const fn default_escalation_threshold() -> usize {
    3
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_supervisor_interval(),
            window_minutes: default_window_minutes(),
            escalation_threshold: default_escalation_threshold(),
        }
    }
}

/// Primary-path classifier configuration. When `use_llm` is false the
/// deterministic rule table is the canonical decision logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassifierConfig {
    #[serde(default)]
    pub use_llm: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_model() -> String {
    "claude-sonnet-4-5".to_string()
}
const fn default_timeout_secs() -> u64 {
    30
}
const fn default_max_tokens() -> u32 {
    1024
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            use_llm: false,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Broadcast channel sizing for observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FanoutConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

const fn default_capacity() -> usize {
    256
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self { capacity: default_capacity() }
    }
}
