//! Categorical encoding.
//!
//! Text columns are split by cardinality: columns with more distinct values
//! than the configured threshold get a single label-encoded column, the rest
//! get one indicator column per value. Source columns are always kept.

mod label;
mod one_hot;

pub use label::label_encode;
pub use one_hot::one_hot_encode;

use crate::config::EdaConfig;
use crate::error::{Result, ResultExt};
use crate::types::EncodingReport;
use crate::utils::{append_column, cardinality, column_names, is_text_dtype};
use polars::prelude::*;
use tracing::{debug, info};

/// Encodes text columns of a table.
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    /// Text columns eligible for encoding, in table order.
    pub fn encodable_columns(df: &DataFrame, config: &EdaConfig) -> Vec<String> {
        column_names(df)
            .into_iter()
            .filter(|name| name != &config.identifier_column)
            .filter(|name| {
                df.column(name)
                    .map(|col| is_text_dtype(col.dtype()))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Split encodable columns into (label-encoded, one-hot) by cardinality.
    pub fn partition(df: &DataFrame, config: &EdaConfig) -> Result<(Vec<String>, Vec<String>)> {
        let mut high = Vec::new();
        let mut low = Vec::new();

        for name in Self::encodable_columns(df, config) {
            let unique = cardinality(df.column(&name)?.as_materialized_series())?;
            debug!("Column '{}' has {} distinct values", name, unique);
            if unique > config.cardinality_threshold {
                high.push(name);
            } else {
                low.push(name);
            }
        }

        Ok((high, low))
    }

    /// Append label-encoded and one-hot indicator columns to a copy of `df`.
    pub fn encode(df: &DataFrame, config: &EdaConfig) -> Result<(DataFrame, EncodingReport)> {
        let mut result = df.clone();
        let mut report = EncodingReport::default();
        let (high, low) = Self::partition(df, config)?;

        for name in &high {
            let series = df.column(name)?.as_materialized_series();
            let (encoded, record) = label_encode(series, &config.encoded_name(name))?;
            append_column(&mut result, encoded)
                .context(format!("Adding label codes for '{}'", name))?;
            info!(
                "Label encoded '{}' ({} classes) into '{}'",
                name,
                record.classes.len(),
                record.derived
            );
            report.label_encoded.push(record);
        }

        for name in &low {
            let series = df.column(name)?.as_materialized_series();
            if cardinality(series)? > config.cardinality_threshold {
                continue;
            }
            let (indicators, record) = one_hot_encode(series)?;
            for indicator in indicators {
                append_column(&mut result, indicator)
                    .context(format!("Adding indicators for '{}'", name))?;
            }
            info!(
                "One-hot encoded '{}' into {} columns",
                name,
                record.columns.len()
            );
            report.one_hot_encoded.push(record);
        }

        Ok((result, report))
    }
}
