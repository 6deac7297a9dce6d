//! Report generation module.
//!
//! Builds the [`AnalysisReport`] for a run and writes it as JSON next to
//! the exported feature table.
//!
//! # Example
//!
//! ```rust,ignore
//! use treatment_eda::reporting::{ReportGenerator, ReportParams};
//!
//! let report = ReportGenerator::build_report(params);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new("outputs");
//! generator.write_report(&report)?;
//! ```

mod generator;

pub use generator::{AnalysisReport, REPORT_FILE_NAME, ReportGenerator, ReportParams};
