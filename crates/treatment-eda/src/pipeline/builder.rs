//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating loading, profiling, preprocessing and export.

use crate::config::{ConfigValidationError, EdaConfig};
use crate::encoders::CategoricalEncoder;
use crate::error::{Result, ResultExt};
use crate::features::FeatureAssembler;
use crate::imputers::StatisticalImputer;
use crate::loader::load_workbook;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::reporting::{ReportGenerator, ReportParams};
use crate::scaling::StandardScaler;
use crate::types::{AnalysisOutput, ProcessedData, RunSummary};
use crate::utils::total_null_count;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The main analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use treatment_eda::{EdaConfig, Pipeline};
///
/// let output = Pipeline::builder()
///     .config(EdaConfig::builder().input_path("data/cases.xlsx").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run_from_path()?;
///
/// println!("{} feature columns", output.features.width() - 1);
/// ```
pub struct Pipeline {
    config: EdaConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    reporter: ReportGenerator,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Configuration the pipeline runs with.
    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    /// Load the configured workbook and run the full analysis on it.
    pub fn run_from_path(&self) -> Result<AnalysisOutput> {
        self.with_outcome(|| {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Loading,
                0.0,
                format!("Loading {}", self.config.input_path.display()),
            ));
            let df = load_workbook(&self.config.input_path)?;
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Loading,
                1.0,
                "Workbook loaded",
            ));
            self.analyze_internal(&df)
        })
    }

    /// Run the full analysis on an already loaded table.
    ///
    /// Profiles the table, preprocesses it, assembles and exports the
    /// feature table and, unless disabled, writes the JSON report.
    pub fn analyze(&self, df: &DataFrame) -> Result<AnalysisOutput> {
        self.with_outcome(|| self.analyze_internal(df))
    }

    /// Impute, encode and scale a table.
    ///
    /// The input is not modified; row count is preserved.
    pub fn process(&self, df: &DataFrame) -> Result<ProcessedData> {
        let config = &self.config;
        let mut processing_steps = Vec::new();

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Imputation,
            0.0,
            "Filling missing values...",
        ));
        info!("Step 1: Imputing missing values...");
        let (imputed, imputation) =
            StatisticalImputer::impute(df, config).context("Imputing missing values")?;
        let total = imputation.len().max(1) as f32;
        for (idx, record) in imputation.iter().enumerate() {
            let step = format!(
                "Filled {} missing values in '{}' with {}",
                record.missing_count, record.column, record.fill
            );
            self.report_progress(ProgressUpdate::with_sub_stage(
                PipelineStage::Imputation,
                format!("Column: {}", record.column),
                (idx + 1) as f32 / total,
                step.clone(),
            ));
            processing_steps.push(step);
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Imputation,
            1.0,
            format!("Imputed {} columns", imputation.len()),
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Encoding,
            0.0,
            "Encoding categorical columns...",
        ));
        info!("Step 2: Encoding categorical columns...");
        let (encoded, encoding) =
            CategoricalEncoder::encode(&imputed, config).context("Encoding categories")?;
        for record in &encoding.label_encoded {
            processing_steps.push(format!(
                "Label encoded '{}' into '{}' ({} classes)",
                record.source,
                record.derived,
                record.classes.len()
            ));
        }
        for record in &encoding.one_hot_encoded {
            processing_steps.push(format!(
                "One-hot encoded '{}' into {} columns",
                record.source,
                record.columns.len()
            ));
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Encoding,
            1.0,
            "Encoding complete",
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Scaling,
            0.0,
            "Scaling numeric columns...",
        ));
        info!("Step 3: Scaling numeric columns...");
        let (table, scaling) =
            StandardScaler::scale(&encoded, config).context("Scaling numeric columns")?;
        let total = scaling.len().max(1) as f32;
        for (idx, record) in scaling.iter().enumerate() {
            let step = format!(
                "Standardized '{}' into '{}' (mean {:.4}, std {:.4})",
                record.source, record.derived, record.mean, record.std
            );
            self.report_progress(ProgressUpdate::with_sub_stage(
                PipelineStage::Scaling,
                format!("Column: {}", record.source),
                (idx + 1) as f32 / total,
                step.clone(),
            ));
            processing_steps.push(step);
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Scaling,
            1.0,
            "Scaling complete",
        ));

        debug!("Processed shape: {:?}", table.shape());

        Ok(ProcessedData {
            table,
            imputation,
            encoding,
            scaling,
            processing_steps,
        })
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Emit the terminal progress update for a run.
    fn with_outcome<F>(&self, run: F) -> Result<AnalysisOutput>
    where
        F: FnOnce() -> Result<AnalysisOutput>,
    {
        match run() {
            Ok(output) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(output)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn analyze_internal(&self, df: &DataFrame) -> Result<AnalysisOutput> {
        let start_time = Instant::now();
        let config = &self.config;
        info!("Starting analysis pipeline...");

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Profiling,
            0.0,
            "Profiling dataset...",
        ));
        let analysis = DataProfiler::analyze(df, config).context("Profiling dataset")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Profiling,
            1.0,
            "Profiling complete",
        ));

        let processed = self.process(df)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::FeatureAssembly,
            0.0,
            "Assembling features...",
        ));
        info!("Step 4: Assembling model-ready features...");
        let features = FeatureAssembler::assemble(&processed.table, &processed.encoding, config)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::FeatureAssembly,
            1.0,
            format!("{} columns selected", features.width()),
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Export,
            0.0,
            "Exporting results...",
        ));
        info!("Step 5: Exporting results...");
        let export_path = FeatureAssembler::export_csv(&features, &config.export_path())?;

        let mut fills_by_strategy: BTreeMap<String, usize> = BTreeMap::new();
        for record in &processed.imputation {
            *fills_by_strategy
                .entry(record.fill.strategy_name().to_string())
                .or_insert(0) += 1;
        }

        let summary = RunSummary {
            duration_ms: start_time.elapsed().as_millis() as u64,
            rows: df.height(),
            columns_before: df.width(),
            columns_processed: processed.table.width(),
            feature_count: features.width().saturating_sub(1),
            missing_before: total_null_count(df),
            missing_after_imputation: total_null_count(&processed.table),
            export_path: Some(export_path.display().to_string()),
            report_path: config
                .generate_report
                .then(|| self.reporter.report_path().display().to_string()),
            fills_by_strategy,
        };

        let report = ReportGenerator::build_report(ReportParams {
            config,
            original_shape: (df.height(), df.width()),
            analysis: &analysis,
            processed: &processed,
            features: &features,
            output_file: Some(&export_path),
            summary: &summary,
        });

        if config.generate_report {
            self.reporter.write_report(&report)?;
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Export,
            1.0,
            "Export complete",
        ));

        info!(
            "Analysis complete in {} ms: {} rows, {} features",
            summary.duration_ms, summary.rows, summary.feature_count
        );

        Ok(AnalysisOutput {
            processed,
            features,
            report,
        })
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<EdaConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Set the configuration; defaults to [`EdaConfig::default`].
    pub fn config(mut self, config: EdaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure to receive progress updates.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Validate the configuration and build the pipeline.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = ReportGenerator::new(config.output_dir.clone());

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            reporter,
        })
    }
}
