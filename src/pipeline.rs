// src/pipeline.rs
use anyhow::Result;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::info;

use crate::{
    config::{Lookup, Settings},
    fetch::{self, catalog, FetchOutcome},
    process::{self, ScanReport},
    progress::Progress,
    report::{self, ReportPaths, WrittenReport},
    snapshot::{self, Snapshot},
};

/// Everything one run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub snapshot: Snapshot,
    pub fetch: FetchOutcome,
    /// Name of the extracted folder that was scanned.
    pub scanned: String,
    pub scan: ScanReport,
    pub written: WrittenReport,
}

/// Locate, fetch, scan, report. Any error aborts before reports are written.
pub async fn run(
    client: &Client,
    settings: &Settings,
    lookup: &Lookup,
    today: NaiveDate,
    download_progress: &dyn Progress,
    scan_progress: &dyn Progress,
) -> Result<RunOutcome> {
    // ─── 1) newest snapshot on the catalog ──────────────────────────
    let snap = catalog::locate_snapshot(client, settings, today).await?;

    // ─── 2) download + extract unless already there ─────────────────
    let fetched =
        fetch::ensure_snapshot(client, &snap, &settings.data_dir, download_progress).await?;

    // ─── 3) newest extracted folder on disk ─────────────────────────
    let dir = snapshot::latest_local_dir(&settings.data_dir)?;
    let scanned = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| snap.stem().to_string());
    info!(dir = %dir.display(), "scanning snapshot");

    // ─── 4) scan every region file ──────────────────────────────────
    let scan = process::scan_snapshot(&dir, settings, lookup, scan_progress)?;

    // ─── 5) workbook + summary ──────────────────────────────────────
    let paths = ReportPaths::new(&settings.output_dir, &scanned, &settings.output_tag());
    let written = report::write_reports(paths, &scan, &settings.keyword)?;

    Ok(RunOutcome {
        snapshot: snap,
        fetch: fetched,
        scanned,
        scan,
        written,
    })
}
