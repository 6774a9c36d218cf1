//! LLM-backed classifier adapters.

pub mod anthropic;

pub use anthropic::{AnthropicClassifier, AnthropicConfig};
