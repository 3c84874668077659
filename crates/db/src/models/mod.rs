//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and, where rows are inserted from Rust, a create DTO.

pub mod free_trial;
pub mod generation_token;
