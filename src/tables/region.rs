use crate::error::AuditError;
use crate::tables::loader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Coarse destination classification used to select the tariff row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionTag {
    /// Capital / metro region.
    #[serde(rename = "CAPITAL")]
    Capital,
    #[serde(rename = "INTERIOR")]
    Interior,
}

impl RegionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionTag::Capital => "CAPITAL",
            RegionTag::Interior => "INTERIOR",
        }
    }

    /// Parses a table cell; anything other than the two known tags fails
    /// the load.
    pub(crate) fn parse(raw: &str, path: &Path) -> Result<Self, AuditError> {
        match raw.trim().to_uppercase().as_str() {
            "CAPITAL" => Ok(RegionTag::Capital),
            "INTERIOR" => Ok(RegionTag::Interior),
            other => Err(AuditError::MalformedConfiguration(format!(
                "tabela {}: região desconhecida `{}`",
                path.display(),
                other
            ))),
        }
    }
}

impl fmt::Display for RegionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Static (state, city) → region reference table.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    entries: HashMap<(String, String), RegionTag>,
}

impl RegionTable {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String, RegionTag)>,
    {
        let entries = entries
            .into_iter()
            .map(|(uf, city, tag)| ((normalize(&uf), normalize(&city)), tag))
            .collect();
        Self { entries }
    }

    /// Loads the shared region table (columns: uf, municipio, regiao).
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let mut reader = loader::open_table(path)?;
        let headers = reader.headers()?.clone();
        let uf = loader::column_index(&headers, path, "uf")?;
        let city = loader::column_index(&headers, path, "municipio")?;
        let region = loader::column_index(&headers, path, "regiao")?;

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let tag = RegionTag::parse(loader::cell(&record, region), path)?;
            entries.insert(
                (
                    normalize(loader::cell(&record, uf)),
                    normalize(loader::cell(&record, city)),
                ),
                tag,
            );
        }
        Ok(Self { entries })
    }

    /// Exact lookup on (state, uppercase-trimmed city); no fuzzy matching.
    /// Unknown destinations classify as INTERIOR.
    pub fn classify(&self, state: &str, city: &str) -> RegionTag {
        self.entries
            .get(&(normalize(state), normalize(city)))
            .copied()
            .unwrap_or(RegionTag::Interior)
    }
}
