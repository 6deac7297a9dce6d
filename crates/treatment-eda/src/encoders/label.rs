//! Label encoding for high-cardinality text columns.

use crate::error::Result;
use crate::types::LabelEncoding;
use crate::utils::{distinct_text_values, text_values};
use polars::prelude::*;
use std::collections::HashMap;

/// Encode `series` as integer codes in a new column named `derived`.
///
/// Codes are indices into the sorted distinct values, so the mapping does
/// not depend on row order. Missing values stay missing.
pub fn label_encode(series: &Series, derived: &str) -> Result<(Series, LabelEncoding)> {
    let classes = distinct_text_values(series)?;
    let mapping: HashMap<&str, i64> = classes
        .iter()
        .enumerate()
        .map(|(code, class)| (class.as_str(), code as i64))
        .collect();

    let codes: Vec<Option<i64>> = text_values(series)?
        .iter()
        .map(|v| v.as_deref().and_then(|s| mapping.get(s).copied()))
        .collect();

    let encoded = Series::new(derived.into(), codes);
    let record = LabelEncoding {
        source: series.name().to_string(),
        derived: derived.to_string(),
        classes,
    };
    Ok((encoded, record))
}
