use serde::{Deserialize, Serialize};

/// One normalized CT-e shipment record.
///
/// Built once by the extractor (origin fields stamped from the client
/// profile) and never mutated for the rest of the reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentInvoice {
    /// CT-e number (nCT); empty when the element is absent.
    pub cte: String,
    pub origin: String,
    pub origin_state: String,
    pub destination_city: String,
    pub destination_state: String,
    /// kg, from the "PESO DECLARADO" measure entry.
    pub declared_weight: f64,
    /// kg, from the "PESO BASE DE CALCULO" measure entry.
    pub calculation_weight: f64,
    /// m³, from the "PESO CUBADO" measure entry.
    pub cubed_volume: f64,
    /// Declared cargo value (vCarga); zero when absent.
    pub cargo_value: f64,
    /// Total billed by the carrier (vTPrest).
    pub billed_total: f64,
}

impl ShipmentInvoice {
    /// "CITY/UF" label used in results and the exported sheet.
    pub fn destination_label(&self) -> String {
        if self.destination_state.is_empty() {
            self.destination_city.clone()
        } else {
            format!("{}/{}", self.destination_city, self.destination_state)
        }
    }
}
