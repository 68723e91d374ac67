use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::RnaError;

/// One per-region data file of an extracted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFile {
    pub path: PathBuf,
    pub name: String,
    /// Trailing `_<code>` token of the file name.
    pub code: String,
    pub size: u64,
}

/// `rna_waldec_20240501_dpt_2A.csv` -> `2A`: the part after the last
/// underscore, cut at the first dot.
pub fn region_code(file_name: &str) -> &str {
    let tail = file_name.rsplit('_').next().unwrap_or(file_name);
    tail.split('.').next().unwrap_or(tail)
}

/// Regular, non-hidden files of `dir`, sorted by name.
///
/// A missing or unreadable directory, or one with no region files, is a
/// configuration error.
pub fn list_region_files(dir: &Path) -> Result<Vec<RegionFile>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        RnaError::MissingData(format!("cannot read {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            debug!(%name, "skipping hidden file");
            continue;
        }
        let meta = entry
            .metadata()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if !meta.is_file() {
            continue;
        }
        files.push(RegionFile {
            path: entry.path(),
            code: region_code(&name).to_string(),
            name,
            size: meta.len(),
        });
    }

    if files.is_empty() {
        return Err(RnaError::MissingData(format!("no region files in {}", dir.display())).into());
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Cheapest file to sniff; ties go to the first name.
pub fn smallest(files: &[RegionFile]) -> Option<&RegionFile> {
    files.iter().min_by_key(|f| f.size)
}
