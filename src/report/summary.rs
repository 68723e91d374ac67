use anyhow::{Context, Result};
use std::{fmt::Write as _, fs, path::Path};

use crate::process::{MatchRecord, ScanStats};

/// Plain-text run summary: totals, then one line per matching region in
/// scan order.
pub fn render_summary(stats: &ScanStats, matches: &[MatchRecord], keyword: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} départements analysés", stats.regions_processed);
    let _ = writeln!(out, "{} associations analysées", stats.records_scanned);
    let _ = writeln!(out, "{:.1} Mo de données analysées", stats.megabytes());
    out.push('\n');
    let _ = writeln!(
        out,
        "{} association(s) mentionnant l'{}",
        stats.rows_found, keyword
    );
    let _ = writeln!(
        out,
        "{} département(s) regroupant ces association(s)",
        stats.regions_found
    );
    out.push('\n');
    out.push_str("Répartition des départements :\n");
    for m in matches {
        let _ = writeln!(out, "{}  ({}) : {} association(s)", m.name, m.code, m.count);
    }
    out
}

pub fn write_summary(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("writing summary {}", path.display()))
}
