use crate::reporting::AnalysisReport;
use crate::utils::ColumnKind;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Profiling Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub unique_count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    pub sample_values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingValueEntry {
    pub column: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    /// Columns with at least one missing value, most missing first.
    pub missing_values: Vec<MissingValueEntry>,
}

/// Descriptive statistics of a numeric column over its observed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueFrequency {
    pub value: String,
    pub count: usize,
    /// Share of all rows, missing included (0 - 100).
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSummary {
    pub column: String,
    /// Present when the target is stored as numbers.
    pub statistics: Option<NumericSummary>,
    pub most_frequent: Vec<ValueFrequency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub unique_count: usize,
    pub missing_count: usize,
    pub top_values: Vec<ValueFrequency>,
}

/// Pearson correlation between numeric columns, pairwise complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where a pair has fewer than two complete rows or no variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values.get(i)?.get(j).copied().flatten()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStatistic {
    pub group: String,
    pub count: usize,
    pub target_mean: Option<f64>,
    pub target_median: Option<f64>,
}

/// Target grouped by the columns the relationship analysis looks at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipSummary {
    /// Pearson correlation between the first scale column and the target.
    pub feature_target_correlation: Option<f64>,
    pub by_gender: Vec<GroupStatistic>,
    pub by_top_departments: Vec<GroupStatistic>,
}

/// Everything the profiler reports about the loaded table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptiveAnalysis {
    pub dataset: DatasetProfile,
    pub target: Option<TargetSummary>,
    pub categorical: Vec<CategoricalSummary>,
    pub numeric: Vec<NumericSummary>,
    /// Only computed when every configured numeric column is present and numeric.
    pub correlation: Option<CorrelationMatrix>,
    pub relationships: RelationshipSummary,
}

// ============================================================================
// Preprocessing Records
// ============================================================================

/// How the missing entries of a column were filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum FillValue {
    /// Most frequent observed value.
    Mode(String),
    /// Sentinel for a categorical column with no observed value.
    Sentinel(String),
    /// Median of the observed values.
    Median(f64),
    /// Configured fallback for a numeric column with no observed value.
    NumericFallback(f64),
}

impl FillValue {
    /// Short name of the fill strategy.
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::Mode(_) => "mode",
            Self::Sentinel(_) => "sentinel",
            Self::Median(_) => "median",
            Self::NumericFallback(_) => "numeric_fallback",
        }
    }
}

impl std::fmt::Display for FillValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mode(v) => write!(f, "mode '{}'", v),
            Self::Sentinel(v) => write!(f, "sentinel '{}'", v),
            Self::Median(v) => write!(f, "median {}", v),
            Self::NumericFallback(v) => write!(f, "fallback {}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub fill: FillValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoding {
    pub source: String,
    pub derived: String,
    /// Sorted distinct values; a value's code is its index here.
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoding {
    pub source: String,
    /// Indicator column per distinct value, in value order.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingReport {
    pub label_encoded: Vec<LabelEncoding>,
    pub one_hot_encoded: Vec<OneHotEncoding>,
}

impl EncodingReport {
    /// Indicator columns created for `source`, if it was one-hot encoded.
    pub fn one_hot_columns(&self, source: &str) -> Option<&[String]> {
        self.one_hot_encoded
            .iter()
            .find(|enc| enc.source == source)
            .map(|enc| enc.columns.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRecord {
    pub source: String,
    pub derived: String,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Zero variance; every derived value was set to 0.
    pub degenerate: bool,
}

/// The working table after imputation, encoding and scaling, with the
/// decisions each stage made.
#[derive(Debug, Clone)]
pub struct ProcessedData {
    pub table: DataFrame,
    pub imputation: Vec<ImputationRecord>,
    pub encoding: EncodingReport,
    pub scaling: Vec<ScalingRecord>,
    pub processing_steps: Vec<String>,
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub processed: ProcessedData,
    /// Model-ready columns with the target last.
    pub features: DataFrame,
    pub report: AnalysisReport,
}

/// Shape and timing overview of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub duration_ms: u64,
    pub rows: usize,
    pub columns_before: usize,
    pub columns_processed: usize,
    pub feature_count: usize,
    pub missing_before: usize,
    pub missing_after_imputation: usize,
    pub export_path: Option<String>,
    pub report_path: Option<String>,
    /// Number of imputed columns per fill strategy.
    pub fills_by_strategy: BTreeMap<String, usize>,
}
