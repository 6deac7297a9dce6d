//! Data profiling module for dataset analysis.
//!
//! This module reads the loaded table and never modifies it:
//! - Per-column structure and missing-value table
//! - Target distribution
//! - Categorical frequency tables
//! - Numeric summaries and correlation
//! - Target grouped by gender and department

mod statistics;

use crate::config::EdaConfig;
use crate::error::Result;
use crate::types::{
    CategoricalSummary, ColumnProfile, CorrelationMatrix, DatasetProfile, DescriptiveAnalysis,
    MissingValueEntry, NumericSummary, RelationshipSummary, TargetSummary,
};
use crate::utils::{cardinality, column_kind, has_column, is_numeric_dtype};
use polars::prelude::*;
use rand::prelude::*;
use tracing::{debug, info};

pub(crate) use statistics::{group_statistics, numeric_summary, pearson, percentage, top_values};

/// Most frequent target values listed in the target summary.
pub const TARGET_TOP_VALUES: usize = 15;
/// Most frequent values listed per categorical column.
pub const CATEGORICAL_TOP_VALUES: usize = 10;
/// Departments included in the relationship summary.
pub const TOP_DEPARTMENTS: usize = 5;
/// Sample values kept per column profile.
const SAMPLE_SIZE: usize = 10;

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Run every descriptive analysis over the loaded table.
    pub fn analyze(df: &DataFrame, config: &EdaConfig) -> Result<DescriptiveAnalysis> {
        let dataset = Self::profile_dataset(df)?;
        info!(
            "Profiled {} rows x {} columns, {} columns with missing values",
            dataset.shape.0,
            dataset.shape.1,
            dataset.missing_values.len()
        );

        Ok(DescriptiveAnalysis {
            dataset,
            target: Self::summarize_target(df, config)?,
            categorical: Self::categorical_summaries(df, config)?,
            numeric: Self::numeric_summaries(df, config)?,
            correlation: Self::correlation_matrix(df, config)?,
            relationships: Self::relationship_summary(df, config)?,
        })
    }

    /// Profile an entire dataset to understand its structure.
    pub fn profile_dataset(df: &DataFrame) -> Result<DatasetProfile> {
        let mut column_profiles = Vec::new();
        for col_name in df.get_column_names() {
            column_profiles.push(Self::profile_column(df, col_name)?);
        }

        let mut missing_values: Vec<MissingValueEntry> = column_profiles
            .iter()
            .filter(|profile| profile.null_count > 0)
            .map(|profile| MissingValueEntry {
                column: profile.name.clone(),
                missing_count: profile.null_count,
                missing_percentage: profile.null_percentage,
            })
            .collect();
        missing_values.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));

        Ok(DatasetProfile {
            shape: (df.height(), df.width()),
            column_profiles,
            missing_values,
        })
    }

    fn profile_column(df: &DataFrame, col_name: &str) -> Result<ColumnProfile> {
        let col = df.column(col_name)?;
        let series = col.as_materialized_series();
        let dtype = format!("{:?}", series.dtype());
        let unique_count = cardinality(series)?;
        let null_count = series.null_count();
        let null_percentage = percentage(null_count, df.height());

        // Seeded so repeated runs report the same samples
        let mut sample_values = Vec::new();
        let non_null_series = series.drop_nulls();
        if !non_null_series.is_empty() {
            let sample_size = std::cmp::min(SAMPLE_SIZE, non_null_series.len());
            let mut rng = StdRng::seed_from_u64(42);
            let indices: Vec<usize> = (0..non_null_series.len()).collect();
            let sampled_indices: Vec<usize> = indices
                .choose_multiple(&mut rng, sample_size)
                .copied()
                .collect();

            for idx in sampled_indices {
                if let Ok(val) = non_null_series.get(idx) {
                    sample_values.push(match val {
                        AnyValue::String(s) => s.to_string(),
                        other => format!("{}", other),
                    });
                }
            }
        }

        debug!(
            "Column '{}': {} unique, {} missing",
            col_name, unique_count, null_count
        );

        Ok(ColumnProfile {
            name: col_name.to_string(),
            dtype,
            kind: column_kind(series.dtype()),
            unique_count,
            null_count,
            null_percentage,
            sample_values,
        })
    }

    /// Distribution of the target column, `None` if it is absent.
    pub fn summarize_target(df: &DataFrame, config: &EdaConfig) -> Result<Option<TargetSummary>> {
        if !has_column(df, &config.target_column) {
            return Ok(None);
        }

        let series = df.column(&config.target_column)?.as_materialized_series();
        let statistics = if is_numeric_dtype(series.dtype()) {
            Some(numeric_summary(series)?)
        } else {
            None
        };

        Ok(Some(TargetSummary {
            column: config.target_column.clone(),
            statistics,
            most_frequent: top_values(series, TARGET_TOP_VALUES)?,
        }))
    }

    /// Frequency tables for the configured categorical columns that exist.
    pub fn categorical_summaries(
        df: &DataFrame,
        config: &EdaConfig,
    ) -> Result<Vec<CategoricalSummary>> {
        let mut summaries = Vec::new();
        for name in &config.categorical_profile_columns {
            if !has_column(df, name) {
                continue;
            }
            let series = df.column(name)?.as_materialized_series();
            summaries.push(CategoricalSummary {
                column: name.clone(),
                unique_count: cardinality(series)?,
                missing_count: series.null_count(),
                top_values: top_values(series, CATEGORICAL_TOP_VALUES)?,
            });
        }
        Ok(summaries)
    }

    /// Summaries for the configured numeric columns that exist and are numeric.
    pub fn numeric_summaries(df: &DataFrame, config: &EdaConfig) -> Result<Vec<NumericSummary>> {
        let mut summaries = Vec::new();
        for name in Self::numeric_columns(df, config) {
            summaries.push(numeric_summary(df.column(&name)?.as_materialized_series())?);
        }
        Ok(summaries)
    }

    /// Pearson correlation across the configured numeric columns.
    ///
    /// Computed only when every configured column is present and numeric.
    pub fn correlation_matrix(
        df: &DataFrame,
        config: &EdaConfig,
    ) -> Result<Option<CorrelationMatrix>> {
        let columns = Self::numeric_columns(df, config);
        if columns.is_empty() || columns.len() != config.numeric_profile_columns.len() {
            debug!("Skipping correlation, numeric profile columns incomplete");
            return Ok(None);
        }

        let data: Vec<&Series> = columns
            .iter()
            .map(|name| df.column(name).map(Column::as_materialized_series))
            .collect::<PolarsResult<_>>()?;

        let mut values = vec![vec![None; columns.len()]; columns.len()];
        for (row, x) in values.iter_mut().zip(&data) {
            for (cell, y) in row.iter_mut().zip(&data) {
                *cell = pearson(x, y)?;
            }
        }

        Ok(Some(CorrelationMatrix { columns, values }))
    }

    /// Target grouped by gender and by the most frequent departments.
    pub fn relationship_summary(
        df: &DataFrame,
        config: &EdaConfig,
    ) -> Result<RelationshipSummary> {
        let mut summary = RelationshipSummary::default();
        if !has_column(df, &config.target_column) {
            return Ok(summary);
        }
        let target = df.column(&config.target_column)?.as_materialized_series();
        if !is_numeric_dtype(target.dtype()) {
            debug!("Target '{}' is not numeric, skipping relationships", config.target_column);
            return Ok(summary);
        }

        if let Some(feature) = config.scale_columns.first()
            && has_column(df, feature)
        {
            let series = df.column(feature)?.as_materialized_series();
            if is_numeric_dtype(series.dtype()) {
                summary.feature_target_correlation = pearson(series, target)?;
            }
        }

        if let Some(gender) = &config.gender_column
            && has_column(df, gender)
        {
            let series = df.column(gender)?.as_materialized_series();
            summary.by_gender = group_statistics(series, target, None)?;
        }

        if let Some(department) = &config.department_column
            && has_column(df, department)
        {
            let series = df.column(department)?.as_materialized_series();
            let top: Vec<String> = top_values(series, TOP_DEPARTMENTS)?
                .into_iter()
                .map(|freq| freq.value)
                .collect();
            summary.by_top_departments = group_statistics(series, target, Some(&top))?;
        }

        Ok(summary)
    }

    fn numeric_columns(df: &DataFrame, config: &EdaConfig) -> Vec<String> {
        config
            .numeric_profile_columns
            .iter()
            .filter(|name| {
                df.column(name)
                    .map(|col| is_numeric_dtype(col.dtype()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ColumnKind;
    use pretty_assertions::assert_eq;

    fn config() -> EdaConfig {
        EdaConfig::builder()
            .target_column("TedaviSuresi")
            .identifier_column("HastaNo")
            .scale_columns(["Yas"])
            .numeric_profile_columns(["Yas", "TedaviSuresi"])
            .categorical_profile_columns(["Cinsiyet", "Bolum", "Missing"])
            .build()
            .unwrap()
    }

    fn sample() -> DataFrame {
        df! {
            "HastaNo" => [1, 2, 3, 4, 5],
            "Yas" => [Some(20.0), Some(30.0), None, Some(50.0), Some(60.0)],
            "Cinsiyet" => [Some("Kadın"), Some("Erkek"), Some("Kadın"), None, Some("Erkek")],
            "Bolum" => ["A", "B", "A", "C", "A"],
            "TedaviSuresi" => [Some(5.0), Some(10.0), Some(15.0), Some(15.0), None],
        }
        .unwrap()
    }

    #[test]
    fn test_profile_dataset() {
        let df = sample();
        let profile = DataProfiler::profile_dataset(&df).unwrap();

        assert_eq!(profile.shape, (5, 5));
        assert_eq!(profile.column_profiles.len(), 5);
        assert_eq!(profile.column_profiles[1].kind, ColumnKind::Numeric);
        assert_eq!(profile.column_profiles[2].unique_count, 2);
        assert_eq!(profile.column_profiles[2].sample_values.len(), 4);

        let missing: Vec<&str> = profile
            .missing_values
            .iter()
            .map(|m| m.column.as_str())
            .collect();
        assert_eq!(missing, vec!["Yas", "Cinsiyet", "TedaviSuresi"]);
        assert_eq!(profile.missing_values[0].missing_percentage, 20.0);
    }

    #[test]
    fn test_profile_samples_are_stable() {
        let df = sample();
        let first = DataProfiler::profile_dataset(&df).unwrap();
        let second = DataProfiler::profile_dataset(&df).unwrap();
        assert_eq!(
            first.column_profiles[3].sample_values,
            second.column_profiles[3].sample_values
        );
    }

    #[test]
    fn test_summarize_target() {
        let summary = DataProfiler::summarize_target(&sample(), &config())
            .unwrap()
            .unwrap();

        let stats = summary.statistics.unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.max, Some(15.0));
        assert_eq!(summary.most_frequent[0].value, "15.0");
        assert_eq!(summary.most_frequent[0].count, 2);
    }

    #[test]
    fn test_categorical_summaries_skip_absent() {
        let summaries = DataProfiler::categorical_summaries(&sample(), &config()).unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].missing_count, 1);
        assert_eq!(summaries[1].top_values[0].value, "A");
        assert_eq!(summaries[1].top_values[0].percentage, 60.0);
    }

    #[test]
    fn test_correlation_requires_all_columns() {
        let df = sample();
        let matrix = DataProfiler::correlation_matrix(&df, &config())
            .unwrap()
            .unwrap();
        assert_eq!(matrix.columns, vec!["Yas", "TedaviSuresi"]);
        let diagonal = matrix.get("Yas", "Yas").unwrap();
        assert!((diagonal - 1.0).abs() < 1e-12);

        let partial = EdaConfig::builder()
            .numeric_profile_columns(["Yas", "UygulamaSuresi"])
            .build()
            .unwrap();
        assert!(DataProfiler::correlation_matrix(&df, &partial).unwrap().is_none());
    }

    #[test]
    fn test_relationship_summary() {
        let summary = DataProfiler::relationship_summary(&sample(), &config()).unwrap();

        assert!(summary.feature_target_correlation.is_some());
        assert_eq!(summary.by_gender.len(), 2);
        assert_eq!(summary.by_top_departments[0].group, "A");
        assert_eq!(summary.by_top_departments[0].count, 3);
        assert_eq!(summary.by_top_departments[0].target_mean, Some(10.0));
    }
}
