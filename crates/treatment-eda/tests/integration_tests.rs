//! Integration tests for the treatment records analysis.
//!
//! These tests run the whole pipeline over small in-memory tables and check
//! the properties the exported feature table must hold.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use treatment_eda::{EdaConfig, Pipeline, PipelineStage, run};

// ============================================================================
// Helper Functions
// ============================================================================

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "treatment_eda_it_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn records() -> DataFrame {
    df! {
        "HastaNo" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        "Yas" => [Some(30.0), None, Some(50.0), Some(40.0), Some(60.0), Some(20.0)],
        "Cinsiyet" => [
            Some("Kadin"), Some("Erkek"), None, Some("Kadin"), Some("Erkek"), Some("Kadin"),
        ],
        "KanGrubu" => [
            Some("A Rh+"), Some("0 Rh+"), Some("A Rh+"), Some("B Rh-"), None, Some("A Rh+"),
        ],
        "Uyruk" => ["Turkiye", "Turkiye", "Turkiye", "Turkiye", "Turkiye", "Turkiye"],
        "Bolum" => [
            Some("Ortopedi"), Some("Ortopedi"), Some("Dahiliye"), None, Some("Ortopedi"),
            Some("Dahiliye"),
        ],
        "Alerji" => [None::<&str>, None, None, None, None, None],
        "UygulamaSuresi" => [5.0, 10.0, 15.0, 20.0, 25.0, 30.0],
        "TedaviSuresi" => [Some(15.0), Some(10.0), None, Some(20.0), Some(5.0), Some(15.0)],
    }
    .unwrap()
}

fn config_in(dir: &PathBuf) -> EdaConfig {
    EdaConfig::builder()
        .output_dir(dir)
        .generate_report(false)
        .build()
        .unwrap()
}

fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn diagnoses(distinct: usize) -> DataFrame {
    let labels: Vec<String> = (0..11).map(|i| format!("Tani{}", i % distinct)).collect();
    let target: Vec<f64> = (0..11).map(|i| i as f64).collect();
    DataFrame::new(vec![
        Series::new("Tanilar".into(), labels).into_column(),
        Series::new("TedaviSuresi".into(), target).into_column(),
    ])
    .unwrap()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_feature_columns_in_order() {
    let dir = scratch_dir("order");
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();

    let output = pipeline.analyze(&records()).unwrap();

    let columns: Vec<String> = output
        .features
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(
        columns,
        vec![
            "Yas_scaled",
            "UygulamaSuresi_scaled",
            "Cinsiyet_Erkek",
            "Cinsiyet_Kadin",
            "KanGrubu_0 Rh+",
            "KanGrubu_A Rh+",
            "KanGrubu_B Rh-",
            "Uyruk_Turkiye",
            "TedaviSuresi",
        ]
    );
    assert_eq!(output.report.feature_columns, columns);
    assert!(dir.join("model_ready_dataset.csv").exists());
}

#[test]
fn test_five_row_table_end_to_end() {
    let dir = scratch_dir("five_rows");
    let df = df! {
        "KanGrubu" => [Some("A Rh+"), Some("0 Rh+"), None, Some("B Rh-"), Some("A Rh+")],
        "Yas" => [Some(25.0), Some(35.0), Some(45.0), None, Some(65.0)],
        "TedaviSuresi" => [10.0, 15.0, 5.0, 20.0, 15.0],
    }
    .unwrap();
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();

    let output = pipeline.analyze(&df).unwrap();

    assert_eq!(output.features.height(), 5);
    assert_eq!(output.processed.table.height(), 5);
    assert_eq!(treatment_eda::utils::total_null_count(&output.processed.table), 0);
    assert_eq!(
        values(&output.features, "TedaviSuresi"),
        values(&df, "TedaviSuresi")
    );
    assert_eq!(
        output.report.feature_columns,
        vec![
            "Yas_scaled",
            "KanGrubu_0 Rh+",
            "KanGrubu_A Rh+",
            "KanGrubu_B Rh-",
            "TedaviSuresi",
        ]
    );

    let kan = output.processed.table.column("KanGrubu").unwrap();
    assert_eq!(kan.str().unwrap().get(2), Some("A Rh+"));
    let yas = output.processed.table.column("Yas").unwrap();
    assert_eq!(yas.f64().unwrap().get(3), Some(40.0));
}

#[test]
fn test_row_count_preserved() {
    let dir = scratch_dir("rows");
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();

    let output = pipeline.analyze(&records()).unwrap();

    assert_eq!(output.processed.table.height(), 6);
    assert_eq!(output.features.height(), 6);
    assert_eq!(output.report.original_shape, (6, 9));
}

#[test]
fn test_target_left_untouched() {
    let dir = scratch_dir("target");
    let df = records();
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();

    let output = pipeline.analyze(&df).unwrap();

    assert_eq!(
        values(&output.features, "TedaviSuresi"),
        values(&df, "TedaviSuresi")
    );
    assert_eq!(output.report.summary.missing_before, 11);
    assert_eq!(output.report.summary.missing_after_imputation, 1);
}

#[test]
fn test_no_missing_values_outside_target() {
    let dir = scratch_dir("missing");
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();

    let output = pipeline.analyze(&records()).unwrap();

    for column in output.processed.table.get_columns() {
        if column.name().as_str() == "TedaviSuresi" {
            continue;
        }
        assert_eq!(column.null_count(), 0, "column {}", column.name());
    }

    // Fully missing text column falls back to the sentinel
    let alerji = output.processed.table.column("Alerji").unwrap();
    assert_eq!(alerji.str().unwrap().get(0), Some("Unknown"));
}

#[test]
fn test_one_hot_rows_have_single_indicator() {
    let dir = scratch_dir("onehot");
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();

    let output = pipeline.analyze(&records()).unwrap();

    for source in ["Cinsiyet", "KanGrubu", "Uyruk"] {
        let indicators = output
            .processed
            .encoding
            .one_hot_columns(source)
            .unwrap()
            .to_vec();
        let mut totals = vec![0.0; output.features.height()];
        for name in &indicators {
            for (row, value) in values(&output.features, name).into_iter().enumerate() {
                totals[row] += value.unwrap();
            }
        }
        assert!(totals.iter().all(|&total| total == 1.0), "source {}", source);
    }
}

#[test]
fn test_scaled_columns_are_standardized() {
    let dir = scratch_dir("scaled");
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();

    let output = pipeline.analyze(&records()).unwrap();

    for name in ["Yas_scaled", "UygulamaSuresi_scaled"] {
        let scaled: Vec<f64> = values(&output.features, name)
            .into_iter()
            .map(Option::unwrap)
            .collect();
        let n = scaled.len() as f64;
        let mean = scaled.iter().sum::<f64>() / n;
        let variance = scaled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-9, "{} mean {}", name, mean);
        assert!((variance.sqrt() - 1.0).abs() < 1e-9, "{} std", name);
    }

    // Median of the observed ages is used before scaling
    let yas = output.processed.table.column("Yas").unwrap();
    assert_eq!(yas.f64().unwrap().get(1), Some(40.0));
}

#[test]
fn test_runs_are_deterministic() {
    let dir = scratch_dir("determinism");
    let pipeline = Pipeline::builder().config(config_in(&dir)).build().unwrap();
    let df = records();

    let first = pipeline.analyze(&df).unwrap();
    let second = pipeline.analyze(&df).unwrap();

    assert!(first.features.equals_missing(&second.features));
    assert_eq!(
        serde_json::to_value(&first.report.analysis).unwrap(),
        serde_json::to_value(&second.report.analysis).unwrap()
    );
}

#[test]
fn test_cardinality_threshold_boundary() {
    let dir = scratch_dir("cardinality");
    let config = EdaConfig::builder()
        .output_dir(&dir)
        .one_hot_sources(["Tanilar"])
        .generate_report(false)
        .build()
        .unwrap();
    let pipeline = Pipeline::builder().config(config).build().unwrap();

    // Exactly at the threshold stays one-hot
    let processed = pipeline.process(&diagnoses(10)).unwrap();
    assert!(processed.encoding.label_encoded.is_empty());
    assert_eq!(processed.encoding.one_hot_encoded[0].columns.len(), 10);
    assert!(processed.table.column("Tanilar_encoded").is_err());

    // One above the threshold is label encoded
    let processed = pipeline.process(&diagnoses(11)).unwrap();
    assert!(processed.encoding.one_hot_encoded.is_empty());
    assert_eq!(processed.encoding.label_encoded[0].classes.len(), 11);
    assert!(processed.table.column("Tanilar_encoded").is_ok());
}

#[test]
fn test_report_written_to_output_dir() {
    let dir = scratch_dir("report");
    let config = EdaConfig::builder().output_dir(&dir).build().unwrap();
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);
    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(move |update| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap();

    let output = pipeline.analyze(&records()).unwrap();

    let report_path = dir.join("analysis_report.json");
    assert!(report_path.exists());
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["target_column"], "TedaviSuresi");
    assert_eq!(
        output.report.summary.report_path.as_deref(),
        Some(report_path.display().to_string().as_str())
    );
    assert_eq!(
        stages.lock().unwrap().last(),
        Some(&PipelineStage::Complete)
    );
}

// ============================================================================
// Entry Point Tests
// ============================================================================

#[test]
fn test_run_missing_input_returns_none() {
    let dir = scratch_dir("run_missing");
    let config = EdaConfig::builder()
        .input_path(dir.join("absent.xlsx"))
        .output_dir(&dir)
        .build()
        .unwrap();

    assert!(run(&config).is_none());
    assert!(!dir.join("model_ready_dataset.csv").exists());
}

#[test]
fn test_run_unsupported_format_returns_none() {
    let dir = scratch_dir("run_csv");
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("records.csv");
    fs::write(&input, "HastaNo,TedaviSuresi\n1,15\n").unwrap();
    let config = EdaConfig::builder()
        .input_path(&input)
        .output_dir(&dir)
        .build()
        .unwrap();

    assert!(run(&config).is_none());
}
