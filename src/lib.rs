//! Support utilities for a compiler test-case runner.
//!
//! The load-bearing piece is [`exec::run_cmd`], a bounded command executor
//! with output capture and a wall-clock timeout. Around it sit independent
//! one-shot helpers: mapping comparison ([`diff`]), filename and artifact
//! naming glue ([`utils`]), and zip-to-YAML batch extraction ([`batch`]).

pub mod batch;
pub mod diff;
pub mod exec;
pub mod utils;
