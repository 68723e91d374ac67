use super::table::RegionTable;

/// Per-region summary destined for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub code: String,
    pub name: String,
    pub count: usize,
}

/// Everything scanning one region file produced.
#[derive(Debug, Clone)]
pub struct RegionOutcome {
    pub code: String,
    pub name: String,
    pub size_bytes: u64,
    /// Well-formed data rows in the file.
    pub records: usize,
    /// Rows dropped for a bad field count.
    pub skipped: usize,
    pub decode_errors: bool,
    /// Matching rows, null markers already blanked.
    pub matches: RegionTable,
}

/// Run-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub regions_processed: usize,
    pub regions_found: usize,
    pub rows_found: usize,
    pub records_scanned: usize,
    pub bytes_scanned: u64,
    pub rows_skipped: usize,
    pub files_with_decode_errors: usize,
}

impl ScanStats {
    /// Count one region file, whether or not it matched.
    pub fn absorb(mut self, outcome: &RegionOutcome) -> Self {
        self.regions_processed += 1;
        self.bytes_scanned = self.bytes_scanned.saturating_add(outcome.size_bytes);
        self.records_scanned += outcome.records;
        self.rows_skipped += outcome.skipped;
        if outcome.decode_errors {
            self.files_with_decode_errors += 1;
        }
        if !outcome.matches.is_empty() {
            self.regions_found += 1;
            self.rows_found += outcome.matches.len();
        }
        self
    }

    pub fn megabytes(&self) -> f64 {
        self.bytes_scanned as f64 / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(code: &str, records: usize, matched: usize, size: u64) -> RegionOutcome {
        RegionOutcome {
            code: code.to_string(),
            name: code.to_string(),
            size_bytes: size,
            records,
            skipped: 1,
            decode_errors: code == "02",
            matches: RegionTable {
                headers: vec!["a".to_string()],
                rows: vec![vec!["x".to_string()]; matched],
            },
        }
    }

    #[test]
    fn every_file_counts_only_matches_add_findings() {
        let stats = [
            outcome("01", 10, 0, 1_000),
            outcome("02", 20, 3, 2_500_000),
            outcome("03", 5, 1, 500),
        ]
        .iter()
        .fold(ScanStats::default(), ScanStats::absorb);

        assert_eq!(stats.regions_processed, 3);
        assert_eq!(stats.regions_found, 2);
        assert_eq!(stats.rows_found, 4);
        assert_eq!(stats.records_scanned, 35);
        assert_eq!(stats.bytes_scanned, 2_501_500);
        assert_eq!(stats.rows_skipped, 3);
        assert_eq!(stats.files_with_decode_errors, 1);
        assert!((stats.megabytes() - 2.5015).abs() < 1e-9);
    }
}
