use crate::error::AuditError;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Directory holding the client registry and every reference table.
    pub data_dir: String,
    /// Registry file, relative to `data_dir`.
    pub clients_file: String,
    /// Shared region table, relative to `data_dir`.
    pub region_table: String,
    /// Reconciliation tolerance band (±, in currency units).
    pub tolerance: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            clients_file: "clients.json".to_string(),
            region_table: "municipios.csv".to_string(),
            tolerance: 0.01,
        }
    }
}

impl AppConfig {
    /// Loads an optional `audit.toml`, then `AUDIT__`-prefixed environment
    /// variables (e.g. `AUDIT__SERVER__PORT=9090`), over the defaults.
    pub fn load() -> Result<Self, AuditError> {
        config::Config::builder()
            .add_source(config::File::with_name("audit").required(false))
            .add_source(config::Environment::with_prefix("AUDIT").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AuditError::MalformedConfiguration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.audit.data_dir, "data");
        assert_eq!(config.audit.tolerance, 0.01);
    }
}
