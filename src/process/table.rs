use csv::ReaderBuilder;
use tracing::warn;

/// Textual null markers replaced by an empty cell in reports.
pub const MISSING_MARKERS: &[&str] = &[
    "nan", "NaN", "NULL", "null", "NA", "N/A", "#N/A", "<NA>", "None",
];

/// A region file as text: header row plus every well-formed data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RegionTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Parse delimited `text` whose first record is the header.
///
/// Records with a field count different from the header, or that the reader
/// rejects, are dropped with a warning. Returns the table and the number of
/// records dropped.
pub fn parse_delimited(text: &str, delimiter: u8, file_name: &str) -> (RegionTable, usize) {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(str::to_string).collect(),
        Err(e) => {
            warn!(file = file_name, error = %e, "unreadable header row");
            return (RegionTable::default(), 0);
        }
    };

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(file = file_name, line, error = %e, "skipping unparsable row");
                skipped += 1;
                continue;
            }
        };
        if record.len() != headers.len() {
            warn!(
                file = file_name,
                line = record.position().map_or(line as u64, |p| p.line()),
                expected = headers.len(),
                found = record.len(),
                "skipping row with wrong field count"
            );
            skipped += 1;
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    (RegionTable { headers, rows }, skipped)
}

/// Blank out cells that only hold a null marker; everything else is kept
/// byte for byte.
pub fn normalize_missing(row: Vec<String>) -> Vec<String> {
    row.into_iter()
        .map(|cell| {
            let trimmed = cell.trim();
            if MISSING_MARKERS.iter().any(|m| *m == trimmed) {
                String::new()
            } else {
                cell
            }
        })
        .collect()
}
