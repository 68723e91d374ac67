// src/report/mod.rs
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::process::ScanReport;

pub mod summary;
pub mod xlsx;

pub use summary::render_summary;
pub use xlsx::write_workbook;

/// Where a run's outputs go, named after the snapshot and the search tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub workbook: PathBuf,
    pub summary: PathBuf,
}

impl ReportPaths {
    pub fn new(output_dir: &Path, snapshot: &str, tag: &str) -> Self {
        Self {
            workbook: output_dir.join(format!("{}_{}.xlsx", snapshot, tag)),
            summary: output_dir.join(format!("{}_{}_data.txt", snapshot, tag)),
        }
    }
}

/// Files actually produced by `write_reports`.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub paths: ReportPaths,
    pub workbook_written: bool,
    pub summary_text: String,
}

/// Write the workbook (when something matched) and the summary.
pub fn write_reports(
    paths: ReportPaths,
    report: &ScanReport,
    keyword: &str,
) -> Result<WrittenReport> {
    if let Some(dir) = paths.summary.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let workbook_written = write_workbook(&paths.workbook, &report.sheets)?;
    let summary_text = render_summary(&report.stats, &report.matches, keyword);
    summary::write_summary(&paths.summary, &summary_text)?;
    info!(summary = %paths.summary.display(), "summary written");

    Ok(WrittenReport {
        paths,
        workbook_written,
        summary_text,
    })
}
