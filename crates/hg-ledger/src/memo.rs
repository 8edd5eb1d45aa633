use super::*;
use hg_core::*;

/// Where a game was played. Trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

/// Operator's explanation of a chip discrepancy. Trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Notes(String);

impl Location {
    /// Blank input means "no location".
    pub fn parse(raw: &str) -> Result<Option<Self>, LedgerError> {
        bounded(raw, "location", MAX_LOCATION_LEN).map(|s| s.map(Self))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Notes {
    /// Blank input means "no notes".
    pub fn parse(raw: &str) -> Result<Option<Self>, LedgerError> {
        bounded(raw, "notes", MAX_NOTES_LEN).map(|s| s.map(Self))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn bounded(raw: &str, field: &'static str, max: usize) -> Result<Option<String>, LedgerError> {
    let trimmed = raw.trim();
    match trimmed.chars().count() {
        0 => Ok(None),
        n if n > max => Err(LedgerError::invalid(
            field,
            format!("at most {} characters", max),
        )),
        _ => Ok(Some(trimmed.to_string())),
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for Notes {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
