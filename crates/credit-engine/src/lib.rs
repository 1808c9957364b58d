//! Credit risk decision engine library.
//!
//! `decision` carries the scoring, gating, and orchestration logic; the
//! remaining modules are service plumbing shared with the API binary.

pub mod config;
pub mod decision;
pub mod error;
pub mod telemetry;
