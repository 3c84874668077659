//! Chat-completions client for the LLM proxy that rewrites titles.

pub mod client;
pub mod config;

pub use client::{LlmClient, LlmClientError};
pub use config::LlmConfig;
