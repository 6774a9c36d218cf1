//! Infrastructure concerns: configuration.

pub mod config;
