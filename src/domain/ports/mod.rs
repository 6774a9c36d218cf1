//! Ports (trait seams) between the triage core and its collaborators.

pub mod action_log;
pub mod classifier;
pub mod errors;
pub mod log_emitter;
pub mod safety_register;
pub mod state_store;

pub use action_log::ActionLogStore;
pub use classifier::Classifier;
pub use errors::StorageError;
pub use log_emitter::LogEmitter;
pub use safety_register::SafetyRegister;
pub use state_store::StateStore;
