use serde::{Deserialize, Serialize};

/// One entry of the client registry file.
///
/// Table paths are relative to the configured data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    pub name: String,
    /// Origin label stamped onto every invoice of this client's batches.
    pub origin_label: String,
    pub origin_state: String,
    pub rate_table: String,
    pub tax_table: String,
}

/// Client listing entry for the API.
#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    pub origin: String,
}
