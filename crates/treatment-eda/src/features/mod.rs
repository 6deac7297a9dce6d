//! Feature assembly and export of the model-ready table.

use crate::config::EdaConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::types::EncodingReport;
use crate::utils::{column_names, has_column};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Builds the feature table from a processed table.
pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Feature column names in output order, target last.
    ///
    /// Order: scaled columns as configured, then label-encoded columns and
    /// indicators of the configured one-hot sources, both in table order.
    pub fn feature_columns(
        df: &DataFrame,
        encoding: &EncodingReport,
        config: &EdaConfig,
    ) -> Result<Vec<String>> {
        if !has_column(df, &config.target_column) {
            return Err(EdaError::ColumnNotFound(config.target_column.clone()));
        }

        let table_order = column_names(df);
        let mut selected: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(config.target_column.clone());

        let mut push = |name: &str, selected: &mut Vec<String>| {
            if seen.insert(name.to_string()) {
                selected.push(name.to_string());
            }
        };

        for source in &config.scale_columns {
            let scaled = config.scaled_name(source);
            if has_column(df, &scaled) {
                push(&scaled, &mut selected);
            }
        }

        for name in table_order
            .iter()
            .filter(|name| name.ends_with(&config.encoded_suffix))
        {
            push(name, &mut selected);
        }

        let indicators: HashSet<&str> = config
            .one_hot_sources
            .iter()
            .filter_map(|source| encoding.one_hot_columns(source))
            .flatten()
            .map(String::as_str)
            .collect();
        for name in table_order
            .iter()
            .filter(|name| indicators.contains(name.as_str()))
        {
            push(name, &mut selected);
        }

        selected.push(config.target_column.clone());
        Ok(selected)
    }

    /// Select the feature columns into a new table.
    pub fn assemble(
        df: &DataFrame,
        encoding: &EncodingReport,
        config: &EdaConfig,
    ) -> Result<DataFrame> {
        let columns = Self::feature_columns(df, encoding, config)?;
        debug!("Feature columns: {:?}", columns);

        let features = df
            .select(columns)
            .context("Selecting feature columns")?;

        info!(
            "Assembled {} features plus target '{}' over {} rows",
            features.width() - 1,
            config.target_column,
            features.height()
        );
        Ok(features)
    }

    /// Write `features` as CSV with a header row, creating parent directories.
    pub fn export_csv(features: &DataFrame, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut out = features.clone();
        {
            let mut file = File::create(path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(&mut out)
                .context(format!("Writing {}", path.display()))?;
        }

        info!("Dataset saved: {}", path.display());
        Ok(path.to_path_buf())
    }
}
