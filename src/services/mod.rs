//! Service layer: the triage pipeline and its collaborators.

pub mod classifier;
pub mod dispatcher;
pub mod engine;
pub mod fanout;
pub mod producers;
pub mod queue;
pub mod supervisor;

pub use classifier::RuleClassifier;
pub use dispatcher::{DispatchResult, ToolDispatcher, ToolOutcome};
pub use engine::TriageEngine;
pub use fanout::{Fanout, Notice};
pub use producers::Producers;
pub use queue::EventQueue;
pub use supervisor::{Supervisor, WindowSummary};
