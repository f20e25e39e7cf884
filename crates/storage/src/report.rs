//! Detection Report Writer

use crate::StorageError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Report column names, in order
pub const REPORT_HEADER: [&str; 10] = [
    "Image",
    "Class",
    "Confidence",
    "x1",
    "y1",
    "x2",
    "y2",
    "Position",
    "Distance (m)",
    "Description",
];

/// One report row per detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    #[serde(rename = "Image")]
    pub image_name: String,
    #[serde(rename = "Class")]
    pub label: String,
    #[serde(rename = "Confidence")]
    pub confidence: f32,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(rename = "Position")]
    pub position: String,
    /// Distance with two decimals, e.g. "3.40"
    #[serde(rename = "Distance (m)")]
    pub distance: String,
    #[serde(rename = "Description")]
    pub description: String,
}

/// Streams detection rows to a CSV sink
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl ReportWriter<File> {
    /// Create (or truncate) a report file, creating parent directories
    pub fn create(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        info!("Writing detection report to {}", path.display());
        Self::new(File::create(path)?)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wrap a sink and write the header row
    pub fn new(sink: W) -> Result<Self, StorageError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        writer.write_record(REPORT_HEADER)?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append one detection row
    pub fn write_record(&mut self, record: &DetectionRecord) -> Result<(), StorageError> {
        self.writer.serialize(record)?;
        self.rows_written += 1;
        debug!("Report row {}: {} in {}", self.rows_written, record.label, record.image_name);
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of detection rows written (header excluded)
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying sink
    pub fn into_inner(self) -> Result<W, StorageError> {
        self.writer
            .into_inner()
            .map_err(|e| StorageError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
    }
}
