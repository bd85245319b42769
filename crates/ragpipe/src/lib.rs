//! `ragpipe` crate (library surface).
//!
//! The primary entrypoint for end users is the `ragpipe` binary. This
//! library exposes the pipeline orchestrator and the tool-invocation
//! loop for embedding, plus a re-export of the core types so callers
//! do not need to depend on internal crate layout.

pub use ragpipe_core as core;

pub mod pipeline;
pub mod toolloop;
