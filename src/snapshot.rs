// src/snapshot.rs
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::RnaError;

/// Every snapshot archive and extracted folder starts with this.
pub const SNAPSHOT_PREFIX: &str = "rna_waldec_";

/// One dated export of the registry, resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub year: i32,
    pub month: u32,
    pub url: String,
    /// Last path segment of `url`, e.g. `rna_waldec_20240501.zip`.
    pub filename: String,
}

impl Snapshot {
    pub fn new(month: NaiveDate, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).with_context(|| format!("parsing snapshot URL {}", url))?;
        let filename = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .with_context(|| format!("no file name in {}", url))?
            .to_string();
        Ok(Self {
            year: month.year(),
            month: month.month(),
            url: url.to_string(),
            filename,
        })
    }

    /// `YYYYMM` stamp embedded in the URL.
    pub fn stamp(&self) -> String {
        month_stamp(self.year, self.month)
    }

    /// File name without its archive extension; also the extracted folder name.
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(".zip")
            .unwrap_or(&self.filename)
    }
}

pub fn month_stamp(year: i32, month: u32) -> String {
    format!("{:04}{:02}", year, month)
}

/// The newest extracted snapshot folder in `data_dir` (greatest name wins).
pub fn latest_local_dir(data_dir: &Path) -> Result<PathBuf> {
    let pattern = format!(
        "{}/{}*",
        Pattern::escape(&data_dir.to_string_lossy()),
        SNAPSHOT_PREFIX
    );
    let mut dirs: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("bad glob pattern {}", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs.pop().ok_or_else(|| {
        RnaError::MissingData(format!(
            "no {}* directory in {}",
            SNAPSHOT_PREFIX,
            data_dir.display()
        ))
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn snapshot_derives_filename_and_stem() -> Result<()> {
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let snap = Snapshot::new(
            month,
            "https://media.interieur.gouv.fr/rna/rna_waldec_20240501.zip",
        )?;
        assert_eq!(snap.filename, "rna_waldec_20240501.zip");
        assert_eq!(snap.stem(), "rna_waldec_20240501");
        assert_eq!(snap.stamp(), "202405");
        Ok(())
    }

    #[test]
    fn latest_local_dir_picks_greatest_name() -> Result<()> {
        let tmp = tempdir()?;
        fs::create_dir(tmp.path().join("rna_waldec_20240101"))?;
        fs::create_dir(tmp.path().join("rna_waldec_20240501"))?;
        // archives and unrelated folders are ignored
        fs::write(tmp.path().join("rna_waldec_20991231.zip"), b"")?;
        fs::create_dir(tmp.path().join("other"))?;

        let latest = latest_local_dir(tmp.path())?;
        assert_eq!(latest.file_name().unwrap(), "rna_waldec_20240501");
        Ok(())
    }

    #[test]
    fn glob_characters_in_data_dir_are_literal() -> Result<()> {
        let tmp = tempdir()?;
        let data_dir = tmp.path().join("data[1]");
        fs::create_dir_all(data_dir.join("rna_waldec_20240501"))?;

        let latest = latest_local_dir(&data_dir)?;
        assert_eq!(latest, data_dir.join("rna_waldec_20240501"));
        Ok(())
    }

    #[test]
    fn latest_local_dir_missing_is_missing_data() {
        let tmp = tempdir().unwrap();
        let err = latest_local_dir(tmp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RnaError>(),
            Some(RnaError::MissingData(_))
        ));
    }
}
