// src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub mod lookup;

pub use lookup::Lookup;

/// Settings file looked up in the working directory. Optional.
pub const SETTINGS_FILE: &str = "rnascan.yaml";

/// How a cell is tested against the search terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Single configured keyword.
    #[default]
    Keyword,
    /// Any entry of the dictionary table.
    Dictionary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where archives are downloaded and extracted.
    pub data_dir: PathBuf,
    /// Where the workbook and summary land.
    pub output_dir: PathBuf,
    /// Dataset landing page scanned for the download link.
    pub catalog_url: String,
    /// Prefix every snapshot download URL starts with.
    pub download_base: String,
    pub keyword: String,
    pub match_mode: MatchMode,
    pub delimiter: char,
    /// Months probed before giving up, current month included.
    pub max_lookback_months: u32,
    pub parallel_scan: bool,
    /// Overrides for the embedded lookup tables.
    pub regions_path: Option<PathBuf>,
    pub dictionary_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            catalog_url:
                "https://www.data.gouv.fr/fr/datasets/repertoire-national-des-associations/"
                    .to_string(),
            download_base: "https://media.interieur.gouv.fr/rna/".to_string(),
            keyword: "ESIEA".to_string(),
            match_mode: MatchMode::Keyword,
            delimiter: ';',
            max_lookback_months: 24,
            parallel_scan: false,
            regions_path: None,
            dictionary_path: None,
        }
    }
}

impl Settings {
    /// Read settings from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Delimiter as the single byte the CSV reader wants.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("delimiter {:?} is not a single ASCII byte", self.delimiter))
    }

    /// Lowercased keyword used to name output files.
    pub fn output_tag(&self) -> String {
        self.keyword.to_lowercase()
    }
}
