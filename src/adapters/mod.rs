//! Outbound adapters: concrete implementations of the domain ports.

pub mod json;
pub mod llm;
