//! Shared utilities for the analysis pipeline.
//!
//! Column classification, value extraction and the small statistics the
//! imputer, encoder, scaler and profiler all rely on.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Logical kind of a column for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point storage
    Numeric,
    /// Any other storage (text, boolean, temporal, null)
    Categorical,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType stores text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Get the kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Names of all columns, owned, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Check if a column exists in the DataFrame.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Append `series` as a new column, refusing to replace an existing one.
pub fn append_column(df: &mut DataFrame, series: Series) -> crate::error::Result<()> {
    if has_column(df, series.name()) {
        return Err(crate::error::EdaError::ColumnCollision(
            series.name().to_string(),
        ));
    }
    df.with_column(series)?;
    Ok(())
}

/// Total number of missing cells in the DataFrame.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Values of a Series rendered as optional text.
///
/// Non-text storage is reinterpreted through a cast to `String`, so every
/// value has a textual form that can be counted or encoded.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Sorted distinct non-missing text values of a Series.
pub fn distinct_text_values(series: &Series) -> PolarsResult<Vec<String>> {
    let distinct: BTreeSet<String> = text_values(series)?.into_iter().flatten().collect();
    Ok(distinct.into_iter().collect())
}

/// Number of distinct non-missing values in a Series.
pub fn cardinality(series: &Series) -> PolarsResult<usize> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(0);
    }
    non_null.n_unique()
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Values of a Series cast to `Float64`.
pub fn float_values(series: &Series) -> PolarsResult<Float64Chunked> {
    Ok(series.cast(&DataType::Float64)?.f64()?.clone())
}

/// Frequency of each non-missing value rendered as text, most frequent first.
///
/// Equal counts are ordered by value so the listing, and the mode taken
/// from it, do not depend on hash iteration order.
pub fn value_counts(series: &Series) -> PolarsResult<Vec<(String, usize)>> {
    let non_null = series.cast(&DataType::String)?.drop_nulls();
    if non_null.is_empty() {
        return Ok(Vec::new());
    }

    let counts_df = non_null.value_counts(false, false, "count".into(), false)?;
    let values = counts_df.column(non_null.name())?.str()?;
    let counts = counts_df.column("count")?.cast(&DataType::UInt64)?;

    let mut pairs: Vec<(String, usize)> = values
        .into_iter()
        .zip(counts.u64()?.into_iter())
        .filter_map(|(value, count)| Some((value?.to_string(), count? as usize)))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(pairs)
}

/// Calculate the mode (most frequent value) of a Series rendered as text.
///
/// Ties resolve to the smallest value in lexicographic order.
pub fn string_mode(series: &Series) -> Option<String> {
    value_counts(series)
        .ok()?
        .into_iter()
        .next()
        .map(|(value, _)| value)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    Ok(float_values(series)?
        .fill_null_with_values(fill_value)?
        .into_series())
}

/// Fill null values in a Series with a text value, producing a `String` Series.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = text_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
