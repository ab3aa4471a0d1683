//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunStage`: the orchestrator's stage machine (searching, fetching pages,
//!   fetching sub-pages, assembled)
//! - `DomainRateState`: per-domain request timing for the rate limiter

mod domain_state;
mod run_stage;

// Re-export main types
pub use domain_state::DomainRateState;
pub use run_stage::RunStage;
