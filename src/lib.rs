//! Pipe Flow (workspace facade crate).
//!
//! Re-exports the simulation under `pipe_flow::{core, types}` while the
//! implementation lives in dedicated crates under `crates/`. The [`runner`]
//! module drives a session headlessly for the `pipe-flow` binary.

pub use pipe_flow_core as core;
pub use pipe_flow_types as types;

pub mod runner;
