//! Progress reporting for the analysis pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use treatment_eda::Pipeline;
//!
//! let output = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run_from_path()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the workbook
    Loading,
    /// Descriptive statistics over the loaded table
    Profiling,
    /// Filling missing values
    Imputation,
    /// Label and one-hot encoding of text columns
    Encoding,
    /// Standard scaling of numeric columns
    Scaling,
    /// Selecting the model-ready columns
    FeatureAssembly,
    /// Writing the feature table and report
    Export,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Workbook",
            Self::Profiling => "Profiling Dataset",
            Self::Imputation => "Imputing Values",
            Self::Encoding => "Encoding Categories",
            Self::Scaling => "Scaling Numerics",
            Self::FeatureAssembly => "Assembling Features",
            Self::Export => "Exporting Results",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Profiling => 0.20,
            Self::Imputation => 0.20,
            Self::Encoding => 0.15,
            Self::Scaling => 0.10,
            Self::FeatureAssembly => 0.05,
            Self::Export => 0.15,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Profiling => 0.15,
            Self::Imputation => 0.35,
            Self::Encoding => 0.55,
            Self::Scaling => 0.70,
            Self::FeatureAssembly => 0.80,
            Self::Export => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted between and within stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Optional sub-stage description (e.g., "Column: Yas")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a new progress update with sub-stage information.
    pub fn with_sub_stage(
        stage: PipelineStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            sub_stage: None,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            sub_stage: None,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of every stage.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
