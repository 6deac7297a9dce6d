//! Pipeline module.
//!
//! This module provides the main analysis pipeline and progress reporting.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
