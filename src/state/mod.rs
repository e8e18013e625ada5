//! State module for tracking check progress
//!
//! - `CheckPhase`: the phase a single page check is in
//! - `PhaseTracker`: enforces the legal order of phases for one page

mod check_phase;

pub use check_phase::{CheckPhase, PhaseTracker};
