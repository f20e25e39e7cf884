//! Storage Layer
//!
//! Writes one row per detection to a tabular report.

mod report;

pub use report::{DetectionRecord, ReportWriter, REPORT_HEADER};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Report encoding error: {0}")]
    Encoding(#[from] csv::Error),
}
