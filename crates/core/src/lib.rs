//! Domain logic for the title downgrader: request validation, prompt
//! rendering, model-output parsing, quota ledger interface and the request
//! orchestrator. No I/O lives here; storage and the completion backend are
//! reached through the [`quota::QuotaLedger`] and
//! [`backend::CompletionBackend`] traits.

pub mod backend;
pub mod downgrade;
pub mod error;
pub mod generation;
pub mod parser;
pub mod products;
pub mod prompt;
pub mod quota;
pub mod types;
