use anyhow::{Context, Result};
use encoding_rs::Encoding;
use rayon::prelude::*;
use std::{fs, path::Path, sync::Mutex, time::Instant};
use tracing::{debug, info, instrument, warn};

use super::{
    encoding::{decode_lossy, detect_encoding},
    matcher::Matcher,
    region::{list_region_files, smallest, RegionFile},
    stats::{MatchRecord, RegionOutcome, ScanStats},
    table::{normalize_missing, parse_delimited, RegionTable},
};
use crate::{
    config::{Lookup, Settings},
    error::RnaError,
    progress::Progress,
};

/// Longest sheet name a workbook accepts.
const MAX_SHEET_NAME: usize = 31;

/// Matching rows of one region, bound for its own sheet.
#[derive(Debug, Clone)]
pub struct RegionSheet {
    pub code: String,
    /// `dpt_<code>`, suffixed when another file already claimed it.
    pub name: String,
    pub table: RegionTable,
}

impl RegionSheet {
    pub fn new(code: &str, table: RegionTable) -> Self {
        Self {
            code: code.to_string(),
            name: clip(&format!("dpt_{}", code), MAX_SHEET_NAME),
            table,
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.name
    }
}

fn clip(name: &str, max: usize) -> String {
    name.chars().take(max).collect()
}

/// Result of a full snapshot scan. `matches` and `sheets` follow file-name
/// order.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub stats: ScanStats,
    pub matches: Vec<MatchRecord>,
    pub sheets: Vec<RegionSheet>,
}

impl ScanReport {
    /// Fold one region outcome in; regions without matches only move counters.
    pub fn absorb(mut self, outcome: RegionOutcome) -> Self {
        self.stats = self.stats.absorb(&outcome);
        if !outcome.matches.is_empty() {
            self.matches.push(MatchRecord {
                code: outcome.code.clone(),
                name: outcome.name,
                count: outcome.matches.len(),
            });
            let mut sheet = RegionSheet::new(&outcome.code, outcome.matches);
            if self.sheet_taken(&sheet.name) {
                sheet.name = self.free_sheet_name(&sheet.name);
                warn!(
                    code = %sheet.code,
                    sheet = %sheet.name,
                    "region code seen twice, renaming sheet"
                );
            }
            self.sheets.push(sheet);
        }
        self
    }

    /// Sheet names compare case-insensitively in a workbook.
    fn sheet_taken(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn free_sheet_name(&self, base: &str) -> String {
        (2..)
            .map(|n| {
                let suffix = format!("_{}", n);
                let head = clip(base, MAX_SHEET_NAME - suffix.len());
                format!("{}{}", head, suffix)
            })
            .find(|candidate| !self.sheet_taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Per-file scanning with everything fixed for the run.
pub struct Scanner<'a> {
    pub encoding: &'static Encoding,
    pub matcher: Matcher,
    pub delimiter: u8,
    pub lookup: &'a Lookup,
}

impl Scanner<'_> {
    #[instrument(level = "debug", skip(self, file), fields(file = %file.name))]
    pub fn scan_file(&self, file: &RegionFile) -> Result<RegionOutcome> {
        let bytes = fs::read(&file.path).with_context(|| format!("reading {}", file.path.display()))?;
        let (text, decode_errors) = decode_lossy(&bytes, self.encoding);
        if decode_errors {
            warn!(
                file = %file.name,
                encoding = self.encoding.name(),
                "malformed bytes replaced with U+FFFD"
            );
        }

        let (table, skipped) = parse_delimited(&text, self.delimiter, &file.name);
        let records = table.len();
        let matches = RegionTable {
            rows: table
                .rows
                .into_iter()
                .filter(|row| self.matcher.row_matches(row))
                .map(normalize_missing)
                .collect(),
            headers: table.headers,
        };

        let name = match self.lookup.region_name(&file.code) {
            Some(n) => n.to_string(),
            None => {
                if !matches.is_empty() {
                    warn!(code = %file.code, "unknown region code, using the code as its name");
                }
                file.code.clone()
            }
        };
        debug!(records, matched = matches.len(), skipped, "scanned");

        Ok(RegionOutcome {
            code: file.code.clone(),
            name,
            size_bytes: file.size,
            records,
            skipped,
            decode_errors,
            matches,
        })
    }
}

/// Scan every region file of `dir` and aggregate the matches.
///
/// The encoding is sniffed once from the smallest file and applied to all of
/// them. Files are scanned in name order, or on the rayon pool when
/// `parallel_scan` is set; the result is the same either way.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub fn scan_snapshot(
    dir: &Path,
    settings: &Settings,
    lookup: &Lookup,
    progress: &dyn Progress,
) -> Result<ScanReport> {
    let start = Instant::now();
    let files = list_region_files(dir)?;
    let sample = smallest(&files)
        .ok_or_else(|| RnaError::MissingData(format!("no region files in {}", dir.display())))?;

    let scanner = Scanner {
        encoding: detect_encoding(&sample.path)?,
        matcher: Matcher::from_settings(settings, lookup)?,
        delimiter: settings.delimiter_byte()?,
        lookup,
    };
    progress.set_total(files.len() as u64);
    info!(files = files.len(), parallel = settings.parallel_scan, "scanning regions");

    let report = if settings.parallel_scan {
        let running = Mutex::new(ScanStats::default());
        let outcomes = files
            .par_iter()
            .map(|f| -> Result<RegionOutcome> {
                let outcome = scanner.scan_file(f)?;
                progress.inc(1);
                // message set under the lock so the last one carries the totals
                if let Ok(mut stats) = running.lock() {
                    *stats = stats.absorb(&outcome);
                    progress.set_message(running_message(&stats));
                }
                Ok(outcome)
            })
            .collect::<Result<Vec<_>>>()?;
        outcomes.into_iter().fold(ScanReport::default(), ScanReport::absorb)
    } else {
        let mut report = ScanReport::default();
        for f in &files {
            report = report.absorb(scanner.scan_file(f)?);
            progress.inc(1);
            progress.set_message(running_message(&report.stats));
        }
        report
    };

    progress.finish(running_message(&report.stats));
    info!(
        regions = report.stats.regions_processed,
        regions_found = report.stats.regions_found,
        rows_found = report.stats.rows_found,
        records = report.stats.records_scanned,
        rows_skipped = report.stats.rows_skipped,
        elapsed = ?start.elapsed(),
        "scan complete"
    );
    Ok(report)
}

fn running_message(stats: &ScanStats) -> String {
    format!(
        "{} associations dans {} départements\n{} déjà analysées",
        stats.rows_found, stats.regions_found, stats.records_scanned
    )
}
