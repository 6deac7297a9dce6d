//! Configuration types for the analysis pipeline.
//!
//! Every column name the stages depend on lives here, so a dataset with a
//! different schema only needs a different [`EdaConfig`], never code changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cardinality threshold separating one-hot from label encoding.
pub const DEFAULT_CARDINALITY_THRESHOLD: usize = 10;

/// Configuration for the analysis pipeline.
///
/// Use [`EdaConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use treatment_eda::config::EdaConfig;
///
/// let config = EdaConfig::builder()
///     .input_path("data/records.xlsx")
///     .target_column("TedaviSuresi")
///     .cardinality_threshold(10)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaConfig {
    /// Path to the input workbook.
    /// Default: "data/Talent_Academy_Case_DT_2025.xlsx"
    pub input_path: PathBuf,

    /// Directory for the exported feature table and report.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// File name of the exported feature table inside `output_dir`.
    /// Default: "model_ready_dataset.csv"
    pub export_file_name: String,

    /// Row identifier column, never encoded.
    /// Default: "HastaNo"
    pub identifier_column: String,

    /// Target column, appended last and never imputed.
    /// Default: "TedaviSuresi"
    pub target_column: String,

    /// Numeric columns standardized into derived columns, in output order.
    /// Default: ["Yas", "UygulamaSuresi"]
    pub scale_columns: Vec<String>,

    /// Source columns whose one-hot indicators enter the feature table.
    /// Default: ["Cinsiyet", "KanGrubu", "Uyruk"]
    pub one_hot_sources: Vec<String>,

    /// Categorical columns described by the profiler.
    pub categorical_profile_columns: Vec<String>,

    /// Numeric columns described (and correlated) by the profiler.
    pub numeric_profile_columns: Vec<String>,

    /// Column used to group the target in the relationship summary.
    /// Default: Some("Cinsiyet")
    pub gender_column: Option<String>,

    /// Column whose most frequent values group the target in the relationship summary.
    /// Default: Some("Bolum")
    pub department_column: Option<String>,

    /// Columns with more distinct values than this are label encoded.
    /// Default: 10
    pub cardinality_threshold: usize,

    /// Suffix appended to label-encoded derived columns.
    /// Default: "_encoded"
    pub encoded_suffix: String,

    /// Suffix appended to standardized derived columns.
    /// Default: "_scaled"
    pub scaled_suffix: String,

    /// Fill value for categorical columns with no observed value.
    /// Default: "Unknown"
    pub unknown_sentinel: String,

    /// Fill value for numeric columns with no observed value.
    /// Default: 0.0
    pub numeric_fallback: f64,

    /// Whether to write the JSON analysis report.
    /// Default: true
    pub generate_report: bool,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/Talent_Academy_Case_DT_2025.xlsx"),
            output_dir: PathBuf::from("outputs"),
            export_file_name: "model_ready_dataset.csv".to_string(),
            identifier_column: "HastaNo".to_string(),
            target_column: "TedaviSuresi".to_string(),
            scale_columns: strings(&["Yas", "UygulamaSuresi"]),
            one_hot_sources: strings(&["Cinsiyet", "KanGrubu", "Uyruk"]),
            categorical_profile_columns: strings(&[
                "Cinsiyet",
                "KanGrubu",
                "Uyruk",
                "KronikHastalik",
                "Bolum",
                "Alerji",
                "Tanilar",
                "TedaviAdi",
                "UygulamaYerleri",
            ]),
            numeric_profile_columns: strings(&["Yas", "TedaviSuresi", "UygulamaSuresi"]),
            gender_column: Some("Cinsiyet".to_string()),
            department_column: Some("Bolum".to_string()),
            cardinality_threshold: DEFAULT_CARDINALITY_THRESHOLD,
            encoded_suffix: "_encoded".to_string(),
            scaled_suffix: "_scaled".to_string(),
            unknown_sentinel: "Unknown".to_string(),
            numeric_fallback: 0.0,
            generate_report: true,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl EdaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EdaConfigBuilder {
        EdaConfigBuilder::default()
    }

    /// Full path of the exported feature table.
    pub fn export_path(&self) -> PathBuf {
        self.output_dir.join(&self.export_file_name)
    }

    /// Name of the label-encoded column derived from `source`.
    pub fn encoded_name(&self, source: &str) -> String {
        format!("{}{}", source, self.encoded_suffix)
    }

    /// Name of the standardized column derived from `source`.
    pub fn scaled_name(&self, source: &str) -> String {
        format!("{}{}", source, self.scaled_suffix)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.cardinality_threshold == 0 {
            return Err(ConfigValidationError::InvalidCardinalityThreshold(
                self.cardinality_threshold,
            ));
        }

        for (field, value) in [
            ("target_column", &self.target_column),
            ("encoded_suffix", &self.encoded_suffix),
            ("scaled_suffix", &self.scaled_suffix),
            ("unknown_sentinel", &self.unknown_sentinel),
            ("export_file_name", &self.export_file_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyField(field.to_string()));
            }
        }

        if self.encoded_suffix == self.scaled_suffix {
            return Err(ConfigValidationError::ConflictingSuffixes(
                self.encoded_suffix.clone(),
            ));
        }

        if self.target_column == self.identifier_column {
            return Err(ConfigValidationError::TargetIsIdentifier(
                self.target_column.clone(),
            ));
        }

        if !self.numeric_fallback.is_finite() {
            return Err(ConfigValidationError::NonFiniteFallback(self.numeric_fallback));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid cardinality threshold: {0} (must be at least 1)")]
    InvalidCardinalityThreshold(usize),

    #[error("Configuration field '{0}' must not be empty")]
    EmptyField(String),

    #[error("Encoded and scaled suffixes must differ (both are '{0}')")]
    ConflictingSuffixes(String),

    #[error("Target column '{0}' cannot also be the identifier column")]
    TargetIsIdentifier(String),

    #[error("Numeric fallback must be finite, got {0}")]
    NonFiniteFallback(f64),
}

/// Builder for [`EdaConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EdaConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    export_file_name: Option<String>,
    identifier_column: Option<String>,
    target_column: Option<String>,
    scale_columns: Option<Vec<String>>,
    one_hot_sources: Option<Vec<String>>,
    categorical_profile_columns: Option<Vec<String>>,
    numeric_profile_columns: Option<Vec<String>>,
    gender_column: Option<Option<String>>,
    department_column: Option<Option<String>>,
    cardinality_threshold: Option<usize>,
    encoded_suffix: Option<String>,
    scaled_suffix: Option<String>,
    unknown_sentinel: Option<String>,
    numeric_fallback: Option<f64>,
    generate_report: Option<bool>,
}

impl EdaConfigBuilder {
    /// Set the input workbook path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output directory for the feature table and report.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the exported feature table's file name.
    pub fn export_file_name(mut self, name: impl Into<String>) -> Self {
        self.export_file_name = Some(name.into());
        self
    }

    /// Set the identifier column excluded from encoding.
    pub fn identifier_column(mut self, column: impl Into<String>) -> Self {
        self.identifier_column = Some(column.into());
        self
    }

    /// Set the target column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the numeric columns to standardize, in output order.
    pub fn scale_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scale_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the source columns whose one-hot indicators are kept as features.
    pub fn one_hot_sources<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_hot_sources = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the categorical columns described by the profiler.
    pub fn categorical_profile_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_profile_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the numeric columns described by the profiler.
    pub fn numeric_profile_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_profile_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set (or clear) the column used to group the target by gender.
    pub fn gender_column(mut self, column: Option<String>) -> Self {
        self.gender_column = Some(column);
        self
    }

    /// Set (or clear) the column used to group the target by department.
    pub fn department_column(mut self, column: Option<String>) -> Self {
        self.department_column = Some(column);
        self
    }

    /// Set the cardinality threshold for the encoding branch.
    pub fn cardinality_threshold(mut self, threshold: usize) -> Self {
        self.cardinality_threshold = Some(threshold);
        self
    }

    /// Set the suffix for label-encoded columns.
    pub fn encoded_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.encoded_suffix = Some(suffix.into());
        self
    }

    /// Set the suffix for standardized columns.
    pub fn scaled_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.scaled_suffix = Some(suffix.into());
        self
    }

    /// Set the fill value for fully-missing categorical columns.
    pub fn unknown_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.unknown_sentinel = Some(sentinel.into());
        self
    }

    /// Set the fill value for fully-missing numeric columns.
    pub fn numeric_fallback(mut self, value: f64) -> Self {
        self.numeric_fallback = Some(value);
        self
    }

    /// Enable or disable writing the JSON analysis report.
    pub fn generate_report(mut self, generate: bool) -> Self {
        self.generate_report = Some(generate);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `EdaConfig` or an error if validation fails.
    pub fn build(self) -> Result<EdaConfig, ConfigValidationError> {
        let defaults = EdaConfig::default();
        let config = EdaConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            export_file_name: self.export_file_name.unwrap_or(defaults.export_file_name),
            identifier_column: self.identifier_column.unwrap_or(defaults.identifier_column),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            scale_columns: self.scale_columns.unwrap_or(defaults.scale_columns),
            one_hot_sources: self.one_hot_sources.unwrap_or(defaults.one_hot_sources),
            categorical_profile_columns: self
                .categorical_profile_columns
                .unwrap_or(defaults.categorical_profile_columns),
            numeric_profile_columns: self
                .numeric_profile_columns
                .unwrap_or(defaults.numeric_profile_columns),
            gender_column: self.gender_column.unwrap_or(defaults.gender_column),
            department_column: self.department_column.unwrap_or(defaults.department_column),
            cardinality_threshold: self
                .cardinality_threshold
                .unwrap_or(defaults.cardinality_threshold),
            encoded_suffix: self.encoded_suffix.unwrap_or(defaults.encoded_suffix),
            scaled_suffix: self.scaled_suffix.unwrap_or(defaults.scaled_suffix),
            unknown_sentinel: self.unknown_sentinel.unwrap_or(defaults.unknown_sentinel),
            numeric_fallback: self.numeric_fallback.unwrap_or(defaults.numeric_fallback),
            generate_report: self.generate_report.unwrap_or(defaults.generate_report),
        };

        config.validate()?;
        Ok(config)
    }
}
