//! Standard scaling of numeric columns.

use crate::config::EdaConfig;
use crate::error::{Result, ResultExt};
use crate::types::ScalingRecord;
use crate::utils::{append_column, float_values, has_column, is_numeric_dtype};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Variance below this is treated as zero.
const DEGENERATE_STD: f64 = 1e-12;

/// Z-score scaling with population statistics.
pub struct StandardScaler;

impl StandardScaler {
    /// Add `<column><scaled_suffix>` for every configured scale column.
    ///
    /// Absent and non-numeric columns are skipped. Missing entries stay
    /// missing and do not count towards the statistics.
    pub fn scale(df: &DataFrame, config: &EdaConfig) -> Result<(DataFrame, Vec<ScalingRecord>)> {
        let mut result = df.clone();
        let mut records = Vec::new();

        for name in &config.scale_columns {
            if !has_column(df, name) {
                debug!("Scale column '{}' not present, skipping", name);
                continue;
            }
            let series = df.column(name)?.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                warn!(
                    "Scale column '{}' is not numeric ({}), skipping",
                    name,
                    series.dtype()
                );
                continue;
            }

            let derived = config.scaled_name(name);
            let (scaled, record) = Self::scale_series(series, &derived)?;
            append_column(&mut result, scaled)
                .context(format!("Adding scaled column '{}'", derived))?;

            info!(
                "Scaled '{}' into '{}' (mean {:.4}, std {:.4})",
                name, derived, record.mean, record.std
            );
            records.push(record);
        }

        Ok((result, records))
    }

    /// Scale one series, returning the derived series and its statistics.
    pub fn scale_series(series: &Series, derived: &str) -> Result<(Series, ScalingRecord)> {
        let values = float_values(series)?;
        let center = values.mean().unwrap_or(0.0);
        let spread = values.std(0).unwrap_or(0.0);
        let degenerate = spread < DEGENERATE_STD;

        if degenerate {
            warn!(
                "Column '{}' has zero variance, scaled values set to 0",
                series.name()
            );
        }

        let scaled = values
            .apply_values(|x| if degenerate { 0.0 } else { (x - center) / spread })
            .with_name(derived.into());

        let record = ScalingRecord {
            source: series.name().to_string(),
            derived: derived.to_string(),
            mean: center,
            std: spread,
            degenerate,
        };
        Ok((scaled.into_series(), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EdaConfig {
        EdaConfig::builder()
            .scale_columns(["age", "duration", "absent", "label"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_scaled_mean_and_std() {
        let df = df! {
            "age" => [10.0, 20.0, 30.0, 40.0, 50.0],
        }
        .unwrap();

        let (result, records) = StandardScaler::scale(&df, &config()).unwrap();

        let values: Vec<f64> = result
            .column("age_scaled")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        assert!(mean.abs() < 1e-9);
        assert!((std - 1.0).abs() < 1e-9);
        assert_eq!(records[0].mean, 30.0);
        assert!(!records[0].degenerate);
    }

    #[test]
    fn test_zero_variance_column() {
        let df = df! {
            "duration" => [5.0, 5.0, 5.0],
        }
        .unwrap();

        let (result, records) = StandardScaler::scale(&df, &config()).unwrap();

        let scaled = result.column("duration_scaled").unwrap().f64().unwrap();
        assert!(scaled.into_no_null_iter().all(|v| v == 0.0));
        assert!(records[0].degenerate);
    }

    #[test]
    fn test_absent_and_text_columns_skipped() {
        let df = df! {
            "label" => ["a", "b"],
        }
        .unwrap();

        let (result, records) = StandardScaler::scale(&df, &config()).unwrap();

        assert!(records.is_empty());
        assert_eq!(result.width(), 1);
    }

    #[test]
    fn test_missing_entries_stay_missing() {
        let df = df! {
            "age" => [Some(1.0), None, Some(3.0)],
        }
        .unwrap();

        let (result, records) = StandardScaler::scale(&df, &config()).unwrap();

        assert_eq!(result.column("age_scaled").unwrap().null_count(), 1);
        assert_eq!(records[0].mean, 2.0);
        assert_eq!(records[0].std, 1.0);
    }

    #[test]
    fn test_scaled_name_taken_by_existing_column() {
        let df = df! {
            "age" => [1.0, 2.0, 3.0],
            "age_scaled" => ["low", "mid", "high"],
        }
        .unwrap();

        let err = StandardScaler::scale(&df, &config()).unwrap_err();

        assert_eq!(err.error_code(), "COLUMN_COLLISION");
    }
}
