//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod free_trial_repo;
pub mod generation_token_repo;

pub use free_trial_repo::FreeTrialRepo;
pub use generation_token_repo::GenerationTokenRepo;
