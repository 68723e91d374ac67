// src/config/lookup.rs
use anyhow::{Context, Result};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::debug;

use super::Settings;

static EMBEDDED_REGIONS: &str = include_str!("../../config/regions.yaml");
static EMBEDDED_DICTIONARY: &str = include_str!("../../config/dictionary.yaml");

/// Read-only tables loaded once at startup and handed to the scanner and the
/// report writer.
#[derive(Debug, Clone)]
pub struct Lookup {
    regions: BTreeMap<String, String>,
    dictionary: Vec<String>,
}

impl Lookup {
    pub fn new(regions: BTreeMap<String, String>, dictionary: Vec<String>) -> Self {
        Self {
            regions,
            dictionary,
        }
    }

    /// The tables compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(EMBEDDED_REGIONS, EMBEDDED_DICTIONARY)
    }

    /// Embedded tables, with either one replaced by a file when configured.
    pub fn load(settings: &Settings) -> Result<Self> {
        let regions = match &settings.regions_path {
            Some(p) => read_file(p)?,
            None => EMBEDDED_REGIONS.to_string(),
        };
        let dictionary = match &settings.dictionary_path {
            Some(p) => read_file(p)?,
            None => EMBEDDED_DICTIONARY.to_string(),
        };
        let lookup = Self::from_yaml(&regions, &dictionary)?;
        debug!(
            regions = lookup.regions.len(),
            terms = lookup.dictionary.len(),
            "lookup tables ready"
        );
        Ok(lookup)
    }

    fn from_yaml(regions: &str, dictionary: &str) -> Result<Self> {
        let regions: BTreeMap<String, String> =
            serde_yaml::from_str(regions).context("parsing region table")?;
        let dictionary: Vec<String> =
            serde_yaml::from_str(dictionary).context("parsing keyword dictionary")?;
        Ok(Self::new(regions, dictionary))
    }

    /// Display name for a region code, if known.
    pub fn region_name(&self, code: &str) -> Option<&str> {
        self.regions.get(code).map(String::as_str)
    }

    pub fn dictionary(&self) -> &[String] {
        &self.dictionary
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading lookup table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn embedded_tables_parse() -> Result<()> {
        let lookup = Lookup::embedded()?;
        assert_eq!(lookup.region_name("01"), Some("Ain"));
        assert_eq!(lookup.region_name("2A"), Some("Corse-du-Sud"));
        assert_eq!(lookup.region_name("974"), Some("La Réunion"));
        assert_eq!(lookup.region_name("20"), None);
        assert!(lookup.dictionary().iter().any(|t| t == "ESIEA"));
        Ok(())
    }

    #[test]
    fn region_table_can_be_overridden() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "\"X1\": \"Somewhere\"")?;
        let settings = Settings {
            regions_path: Some(tmp.path().to_path_buf()),
            ..Settings::default()
        };

        let lookup = Lookup::load(&settings)?;
        assert_eq!(lookup.region_name("X1"), Some("Somewhere"));
        assert_eq!(lookup.region_name("01"), None);
        assert!(!lookup.dictionary().is_empty());
        Ok(())
    }
}
