//! Statistical helpers for descriptive profiling.

use crate::error::Result;
use crate::types::{GroupStatistic, NumericSummary, ValueFrequency};
use crate::utils::{float_values, value_counts};
use polars::prelude::cov::pearson_corr;
use polars::prelude::*;

/// Descriptive statistics of a numeric series.
pub(crate) fn numeric_summary(series: &Series) -> Result<NumericSummary> {
    let values = float_values(series)?;
    let missing = values.null_count();

    Ok(NumericSummary {
        column: series.name().to_string(),
        count: values.len() - missing,
        missing,
        mean: values.mean(),
        median: values.median(),
        std: values.std(1),
        min: values.min(),
        max: values.max(),
    })
}

/// The `limit` most frequent values, with their share of all rows.
pub(crate) fn top_values(series: &Series, limit: usize) -> Result<Vec<ValueFrequency>> {
    let total = series.len();
    Ok(value_counts(series)?
        .into_iter()
        .take(limit)
        .map(|(value, count)| ValueFrequency {
            value,
            count,
            percentage: percentage(count, total),
        })
        .collect())
}

/// `part` as a percentage of `total`, 0 for an empty total.
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Pearson correlation over rows where both values are present.
///
/// `None` with fewer than two complete rows or when either side is constant.
pub(crate) fn pearson(x: &Series, y: &Series) -> Result<Option<f64>> {
    let x = float_values(x)?;
    let y = float_values(y)?;
    let complete = x.is_not_null() & y.is_not_null();
    let x = x.filter(&complete)?;
    let y = y.filter(&complete)?;
    if x.len() < 2 {
        return Ok(None);
    }
    Ok(pearson_corr(&x, &y).filter(|r| r.is_finite()))
}

/// Target statistics per distinct value of `group`, missing groups skipped.
///
/// Groups come out in value order; when `only` is given, just those groups
/// are kept, in the order listed.
pub(crate) fn group_statistics(
    group: &Series,
    target: &Series,
    only: Option<&[String]>,
) -> Result<Vec<GroupStatistic>> {
    let frame = DataFrame::new(vec![
        group
            .cast(&DataType::String)?
            .with_name("group".into())
            .into_column(),
        target
            .cast(&DataType::Float64)?
            .with_name("target".into())
            .into_column(),
    ])?;

    let grouped = frame
        .lazy()
        .filter(col("group").is_not_null())
        .group_by([col("group")])
        .agg([
            len().alias("count"),
            col("target").mean().alias("target_mean"),
            col("target").median().alias("target_median"),
        ])
        .sort(["group"], SortMultipleOptions::default())
        .collect()?;

    let names = grouped.column("group")?.str()?;
    let counts = grouped.column("count")?.cast(&DataType::UInt64)?;
    let means = grouped.column("target_mean")?.f64()?;
    let medians = grouped.column("target_median")?.f64()?;

    let stats: Vec<GroupStatistic> = names
        .into_iter()
        .zip(counts.u64()?.into_iter())
        .zip(means.into_iter().zip(medians.into_iter()))
        .filter_map(|((name, count), (target_mean, target_median))| {
            Some(GroupStatistic {
                group: name?.to_string(),
                count: count.unwrap_or(0) as usize,
                target_mean,
                target_median,
            })
        })
        .collect();

    Ok(match only {
        Some(selection) => selection
            .iter()
            .filter_map(|name| stats.iter().find(|stat| &stat.group == name).cloned())
            .collect(),
        None => stats,
    })
}
