//! Floorwatch: shop-floor event triage engine.
//!
//! Producers watch plant inputs and publish events into an unbounded FIFO
//! queue. A single consumer — the triage engine — classifies each event
//! (optionally via an LLM, always with a deterministic rule fallback),
//! dispatches the resulting tool calls, folds the outcome into an
//! in-memory aggregate, resolves related safety incidents, and broadcasts
//! the result to observers. A periodic supervisor reads the durable action
//! log to escalate sustained critical activity, re-push delayed orders,
//! and emit a daily digest.
//!
//! The crate is organized hexagonally:
//! - [`domain`]: models, ports (traits), and errors. No I/O.
//! - [`services`]: the pipeline — queue, classifier, dispatcher, engine,
//!   fanout, producers, supervisor.
//! - [`adapters`]: JSON file stores and the Anthropic classifier.
//! - [`infrastructure`]: configuration loading.
//! - [`cli`]: the `floorwatch` binary surface.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Event, MemoryState, Severity, TriageOutput, TriageRecord};
pub use services::{Fanout, Notice, TriageEngine};
