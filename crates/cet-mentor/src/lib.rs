//! Prediction engine and admission workflow for the CET Mentor service.
//!
//! The crate owns the deterministic rank/probability model, the admission
//! shortlist orchestration, and the bookmark workflow. Persistence and
//! session identity are reached through the traits in
//! [`workflows::admission::repository`]; concrete stores live with the
//! binaries that embed this crate.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
