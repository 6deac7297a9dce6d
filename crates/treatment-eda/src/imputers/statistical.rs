//! Statistical imputation methods.
//!
//! Numeric columns are filled with the median of their observed values,
//! everything else with the most frequent observed value.

use crate::config::EdaConfig;
use crate::error::{Result, ResultExt};
use crate::types::{FillValue, ImputationRecord};
use crate::utils::{
    ColumnKind, column_kind, column_names, fill_numeric_nulls, fill_string_nulls, float_values,
    string_mode,
};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Statistical imputation for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill every missing value outside the target column.
    ///
    /// The input table is left untouched; the filled copy is returned along
    /// with one record per column that had something to fill.
    pub fn impute(
        df: &DataFrame,
        config: &EdaConfig,
    ) -> Result<(DataFrame, Vec<ImputationRecord>)> {
        let mut result = df.clone();
        let mut records = Vec::new();

        for name in column_names(df) {
            if name == config.target_column {
                debug!("Leaving target column '{}' unimputed", name);
                continue;
            }

            let column = df.column(&name)?;
            let missing_count = column.null_count();
            if missing_count == 0 {
                continue;
            }

            let series = column.as_materialized_series();
            let kind = column_kind(series.dtype());
            let (filled, fill) = match kind {
                ColumnKind::Numeric => Self::fill_numeric(series, config)?,
                ColumnKind::Categorical => Self::fill_categorical(series, config)?,
            };

            result
                .with_column(filled)
                .context(format!("Replacing column '{}'", name))?;

            info!("Filled {} missing values in '{}' with {}", missing_count, name, fill);
            records.push(ImputationRecord {
                column: name,
                kind,
                missing_count,
                fill,
            });
        }

        Ok((result, records))
    }

    /// Median of observed values, or the configured fallback when none exist.
    fn fill_numeric(series: &Series, config: &EdaConfig) -> Result<(Series, FillValue)> {
        let (fill_value, fill) = match float_values(series)?.median() {
            Some(value) => (value, FillValue::Median(value)),
            None => {
                warn!(
                    "Column '{}' has no observed values, using fallback {}",
                    series.name(),
                    config.numeric_fallback
                );
                (
                    config.numeric_fallback,
                    FillValue::NumericFallback(config.numeric_fallback),
                )
            }
        };
        Ok((fill_numeric_nulls(series, fill_value)?, fill))
    }

    /// Mode of observed values, or the sentinel when none exist.
    fn fill_categorical(series: &Series, config: &EdaConfig) -> Result<(Series, FillValue)> {
        let (filled, fill) = match string_mode(series) {
            Some(mode) => (fill_string_nulls(series, &mode)?, FillValue::Mode(mode)),
            None => (
                fill_string_nulls(series, &config.unknown_sentinel)?,
                FillValue::Sentinel(config.unknown_sentinel.clone()),
            ),
        };
        Ok((filled, fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::total_null_count;

    fn config() -> EdaConfig {
        EdaConfig::builder()
            .target_column("target")
            .identifier_column("id")
            .build()
            .unwrap()
    }

    #[test]
    fn test_categorical_mode_fill() {
        let df = df! {
            "id" => [1, 2, 3, 4],
            "blood" => [Some("A"), Some("A"), Some("B"), None],
            "target" => [1.0, 2.0, 3.0, 4.0],
        }
        .unwrap();

        let (result, records) = StatisticalImputer::impute(&df, &config()).unwrap();

        let blood = result.column("blood").unwrap();
        assert_eq!(blood.str().unwrap().get(3), Some("A"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fill, FillValue::Mode("A".to_string()));
        assert_eq!(records[0].missing_count, 1);
        assert_eq!(records[0].kind, ColumnKind::Categorical);
    }

    #[test]
    fn test_numeric_median_fill() {
        let df = df! {
            "age" => [Some(1.0), Some(3.0), None, Some(7.0)],
            "target" => [1.0, 2.0, 3.0, 4.0],
        }
        .unwrap();

        let (result, records) = StatisticalImputer::impute(&df, &config()).unwrap();

        let age = result.column("age").unwrap().f64().unwrap();
        assert_eq!(age.get(2), Some(3.0));
        assert_eq!(records[0].fill, FillValue::Median(3.0));
    }

    #[test]
    fn test_fully_missing_columns() {
        let df = df! {
            "empty_num" => [Option::<f64>::None, None],
            "empty_text" => [Option::<&str>::None, None],
            "target" => [1.0, 2.0],
        }
        .unwrap();

        let (result, records) = StatisticalImputer::impute(&df, &config()).unwrap();

        assert_eq!(total_null_count(&result), 0);
        assert_eq!(records[0].fill, FillValue::NumericFallback(0.0));
        assert_eq!(records[1].fill, FillValue::Sentinel("Unknown".to_string()));
        let text = result.column("empty_text").unwrap();
        assert_eq!(text.str().unwrap().get(0), Some("Unknown"));
    }

    #[test]
    fn test_target_is_not_imputed() {
        let df = df! {
            "age" => [Some(10.0), None],
            "target" => [Some(5.0), None],
        }
        .unwrap();

        let (result, records) = StatisticalImputer::impute(&df, &config()).unwrap();

        assert_eq!(result.column("target").unwrap().null_count(), 1);
        assert_eq!(result.column("age").unwrap().null_count(), 0);
        assert!(records.iter().all(|r| r.column != "target"));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let df = df! {
            "blood" => [Some("A"), None],
            "target" => [1.0, 2.0],
        }
        .unwrap();

        let (result, _) = StatisticalImputer::impute(&df, &config()).unwrap();

        assert_eq!(df.column("blood").unwrap().null_count(), 1);
        assert_eq!(result.height(), df.height());
    }

    #[test]
    fn test_complete_columns_are_skipped() {
        let df = df! {
            "age" => [1.0, 2.0],
            "target" => [1.0, 2.0],
        }
        .unwrap();

        let (_, records) = StatisticalImputer::impute(&df, &config()).unwrap();
        assert!(records.is_empty());
    }
}
