//! Export contract
//!
//! The dashboard hands a snapshot of its in-memory dataset to an
//! [`Exporter`]; producing the actual CSV/Excel/PDF bytes is the
//! implementation's concern, not the core's.

use async_trait::async_trait;
use shared::models::{AttendanceLog, AttendanceStats, Employee};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "Excel",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// The dataset handed to an exporter: whatever the dashboard currently
/// holds, cloned so the export can outlive later refreshes.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub employees: Vec<Employee>,
    pub logs: Vec<AttendanceLog>,
    pub stats: Option<AttendanceStats>,
    /// Unix millis at snapshot time
    pub generated_at: i64,
}

/// A produced file representation
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export failed: {0}")]
    Failed(String),

    #[error("format not supported: {0}")]
    Unsupported(&'static str),
}

/// Produce a file representation of a dashboard snapshot in the given
/// format
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(
        &self,
        dataset: &DashboardSnapshot,
        format: ExportFormat,
    ) -> Result<ExportFile, ExportError>;
}
