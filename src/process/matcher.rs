use anyhow::{bail, Result};

use crate::config::{Lookup, MatchMode, Settings};

/// Case-insensitive substring search over cells. No tokenising: `esiea`
/// matches inside `fooESIEA2bar`.
#[derive(Debug, Clone)]
pub struct Matcher {
    needles: Vec<String>,
}

impl Matcher {
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if needles.is_empty() {
            bail!("no search term configured");
        }
        Ok(Self { needles })
    }

    pub fn from_settings(settings: &Settings, lookup: &Lookup) -> Result<Self> {
        match settings.match_mode {
            MatchMode::Keyword => Self::new([&settings.keyword]),
            MatchMode::Dictionary => Self::new(lookup.dictionary()),
        }
    }

    pub fn cell_matches(&self, cell: &str) -> bool {
        let cell = cell.to_lowercase();
        self.needles.iter().any(|n| cell.contains(n.as_str()))
    }

    /// True when any cell of the row matches.
    pub fn row_matches(&self, row: &[String]) -> bool {
        row.iter().any(|c| self.cell_matches(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn substring_any_case_any_column() -> Result<()> {
        let m = Matcher::new(["ESIEA"])?;
        assert!(m.cell_matches("Association ESIEA Paris"));
        assert!(m.cell_matches("fooesiea2bar"));
        assert!(!m.cell_matches("E S I E A"));
        assert!(m.row_matches(&row(&["W751", "", "anciens de l'Esiea"])));
        assert!(!m.row_matches(&row(&["W751", "Club", "Paris"])));
        Ok(())
    }

    #[test]
    fn blank_terms_are_rejected() {
        assert!(Matcher::new(["  "]).is_err());
        assert!(Matcher::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn dictionary_mode_uses_every_term() -> Result<()> {
        let lookup = Lookup::new(
            BTreeMap::new(),
            vec!["ESIEA".to_string(), "Grande École".to_string()],
        );
        let settings = Settings {
            match_mode: MatchMode::Dictionary,
            ..Settings::default()
        };
        let m = Matcher::from_settings(&settings, &lookup)?;
        assert!(m.cell_matches("amis de la GRANDE ÉCOLE"));
        assert!(m.cell_matches("esiea"));
        assert!(!m.cell_matches("grande ecole"));
        Ok(())
    }
}
