use crate::error::AuditError;
use crate::tables::loader;
use crate::tables::region::RegionTag;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One tariff row of a client's rate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRow {
    /// Destination state code (uf_destino).
    pub uf: String,
    pub region: RegionTag,
    /// Volume band, inclusive on both ends (m³).
    pub volume_min: f64,
    pub volume_max: f64,
    /// valor_m3.
    pub rate_per_m3: f64,
    /// frete_minimo: floor applied to the volume charge.
    pub minimum_charge: f64,
    /// ad_valorem: insurance rate over the declared cargo value.
    pub insurance_rate: f64,
    /// taxa_fixa.
    pub fixed_fee: f64,
    /// pedagio_100kg: toll per started 100 kg band.
    pub toll_per_band: f64,
}

/// Client-specific rate table; row order is the load order.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rows: Vec<RateRow>,
}

impl RateTable {
    pub fn from_rows(rows: Vec<RateRow>) -> Self {
        Self { rows }
    }

    /// Loads a rate table CSV (columns: uf_destino, regiao, volume_min,
    /// volume_max, valor_m3, frete_minimo, ad_valorem, taxa_fixa,
    /// pedagio_100kg). Row order is preserved.
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let mut reader = loader::open_table(path)?;
        let headers = reader.headers()?.clone();
        let uf = loader::column_index(&headers, path, "uf_destino")?;
        let region = loader::column_index(&headers, path, "regiao")?;
        let volume_min = loader::column_index(&headers, path, "volume_min")?;
        let volume_max = loader::column_index(&headers, path, "volume_max")?;
        let rate_per_m3 = loader::column_index(&headers, path, "valor_m3")?;
        let minimum_charge = loader::column_index(&headers, path, "frete_minimo")?;
        let insurance_rate = loader::column_index(&headers, path, "ad_valorem")?;
        let fixed_fee = loader::column_index(&headers, path, "taxa_fixa")?;
        let toll_per_band = loader::column_index(&headers, path, "pedagio_100kg")?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let tag = RegionTag::parse(loader::cell(&record, region), path)?;
            rows.push(RateRow {
                uf: loader::cell(&record, uf).to_uppercase(),
                region: tag,
                volume_min: loader::numeric_cell(&record, volume_min, path, "volume_min")?,
                volume_max: loader::numeric_cell(&record, volume_max, path, "volume_max")?,
                rate_per_m3: loader::numeric_cell(&record, rate_per_m3, path, "valor_m3")?,
                minimum_charge: loader::numeric_cell(&record, minimum_charge, path, "frete_minimo")?,
                insurance_rate: loader::numeric_cell(&record, insurance_rate, path, "ad_valorem")?,
                fixed_fee: loader::numeric_cell(&record, fixed_fee, path, "taxa_fixa")?,
                toll_per_band: loader::numeric_cell(&record, toll_per_band, path, "pedagio_100kg")?,
            });
        }
        Ok(Self { rows })
    }

    /// Finds the applicable tariff row: exact (state, region) match plus
    /// inclusive volume-band containment. With overlapping bands the first
    /// row in table order wins; callers rely on load order as the tie-break.
    pub fn resolve(&self, state: &str, region: RegionTag, volume: f64) -> Option<&RateRow> {
        let state = state.trim();
        self.rows.iter().find(|row| {
            row.uf.eq_ignore_ascii_case(state)
                && row.region == region
                && row.volume_min <= volume
                && volume <= row.volume_max
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
