//! Imputation module for handling missing values.
//!
//! Median imputation for numeric columns and mode imputation for everything
//! else, with fallbacks for columns that have no observed value at all.

mod statistical;

pub use statistical::StatisticalImputer;
