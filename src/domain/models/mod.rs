//! Domain models for the floorwatch triage core.

pub mod action_log;
pub mod config;
pub mod event;
pub mod memory;
pub mod oversight;
pub mod plant;
pub mod safety;

pub use action_log::ActionLogEntry;
pub use config::{ClassifierConfig, Config, FanoutConfig, ProducersConfig, SupervisorConfig};
pub use event::{Event, Severity, ToolCall, TriageOutput, TriageRecord};
pub use memory::MemoryState;
pub use oversight::SupervisorState;
pub use plant::{Machine, Order};
pub use safety::{SafetyLogEntry, SafetyStatus};
