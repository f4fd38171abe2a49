use crate::error::AuditError;
use crate::tables::loader;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One (origin state, destination state) → ICMS divisor entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxDivisorRow {
    pub origin_state: String,
    pub destination_state: String,
    pub divisor: f64,
}

/// Client-specific interstate tax-divisor table.
#[derive(Debug, Clone, Default)]
pub struct TaxTable {
    rows: Vec<TaxDivisorRow>,
}

impl TaxTable {
    pub fn from_rows(rows: Vec<TaxDivisorRow>) -> Self {
        Self { rows }
    }

    /// Loads a divisor table CSV (columns: uf_origem, uf_destino, divisor).
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let mut reader = loader::open_table(path)?;
        let headers = reader.headers()?.clone();
        let origin = loader::column_index(&headers, path, "uf_origem")?;
        let destination = loader::column_index(&headers, path, "uf_destino")?;
        let divisor = loader::column_index(&headers, path, "divisor")?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(TaxDivisorRow {
                origin_state: loader::cell(&record, origin).to_uppercase(),
                destination_state: loader::cell(&record, destination).to_uppercase(),
                divisor: loader::numeric_cell(&record, divisor, path, "divisor")?,
            });
        }
        Ok(Self { rows })
    }

    /// Divisor for the route, 1.0 (identity) when no row matches.
    pub fn divisor_for(&self, origin_state: &str, destination_state: &str) -> f64 {
        self.rows
            .iter()
            .find(|row| {
                row.origin_state.eq_ignore_ascii_case(origin_state.trim())
                    && row
                        .destination_state
                        .eq_ignore_ascii_case(destination_state.trim())
            })
            .map(|row| row.divisor)
            .unwrap_or(1.0)
    }
}
