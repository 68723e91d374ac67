// src/process/mod.rs
pub mod encoding;
pub mod matcher;
pub mod region;
pub mod scan;
pub mod stats;
pub mod table;

pub use matcher::Matcher;
pub use region::{list_region_files, RegionFile};
pub use scan::{scan_snapshot, RegionSheet, ScanReport, Scanner};
pub use stats::{MatchRecord, RegionOutcome, ScanStats};
pub use table::RegionTable;
