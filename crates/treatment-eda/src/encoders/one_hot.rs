//! One-hot encoding for low-cardinality text columns.

use crate::error::Result;
use crate::types::OneHotEncoding;
use crate::utils::{distinct_text_values, text_values};
use polars::prelude::*;

/// One `Int32` indicator column per distinct value of `series`.
///
/// Indicators are ordered by value and named `<source>_<value>`. A missing
/// source value is 0 in every indicator.
pub fn one_hot_encode(series: &Series) -> Result<(Vec<Series>, OneHotEncoding)> {
    let source = series.name().to_string();
    let values = text_values(series)?;
    let categories = distinct_text_values(series)?;

    let mut indicators = Vec::with_capacity(categories.len());
    let mut columns = Vec::with_capacity(categories.len());
    for category in &categories {
        let name = format!("{}_{}", source, category);
        let flags: Vec<i32> = values
            .iter()
            .map(|v| i32::from(v.as_deref() == Some(category.as_str())))
            .collect();

        indicators.push(Series::new(name.as_str().into(), flags));
        columns.push(name);
    }

    Ok((indicators, OneHotEncoding { source, columns }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicators_per_value() {
        let series = Series::new("KanGrubu".into(), &["A Rh+", "0 Rh-", "A Rh+"]);
        let (indicators, record) = one_hot_encode(&series).unwrap();

        assert_eq!(record.columns, vec!["KanGrubu_0 Rh-", "KanGrubu_A Rh+"]);
        assert_eq!(indicators.len(), 2);
        let first: Vec<Option<i32>> = indicators[0].i32().unwrap().into_iter().collect();
        assert_eq!(first, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_every_row_has_exactly_one_flag() {
        let series = Series::new("Cinsiyet".into(), &["Kadın", "Erkek", "Kadın", "Erkek"]);
        let (indicators, _) = one_hot_encode(&series).unwrap();

        for row in 0..series.len() {
            let total: i32 = indicators
                .iter()
                .map(|s| s.i32().unwrap().get(row).unwrap())
                .sum();
            assert_eq!(total, 1);
        }
    }

    #[test]
    fn test_missing_value_has_no_flag() {
        let series = Series::new("Uyruk".into(), &[Some("Türkiye"), None]);
        let (indicators, _) = one_hot_encode(&series).unwrap();

        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators[0].i32().unwrap().get(1), Some(0));
    }
}
