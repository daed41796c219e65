//! Archive extraction.
//!
//! The container decoder feeds entries to an [`ExtractionEngine`], which
//! plans each one against the destination and then materializes it.

pub mod engine;
mod materialize;
mod plan;

pub use engine::ExtractionEngine;
