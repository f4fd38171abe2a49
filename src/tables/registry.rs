use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::models::{ClientProfile, ClientSummary};
use crate::tables::{RateTable, RegionTable, TaxTable};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// One client's reference data, resolved and loaded.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub profile: ClientProfile,
    pub rates: RateTable,
    pub divisors: TaxTable,
}

/// All reference data for the process lifetime.
///
/// Loaded once at startup and read-only afterwards; any load failure aborts
/// startup, since there is no meaningful service without valid tables.
/// Client iteration order follows the registry file.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: IndexMap<String, ClientContext>,
    regions: RegionTable,
}

impl ClientRegistry {
    pub fn from_parts(clients: IndexMap<String, ClientContext>, regions: RegionTable) -> Self {
        Self { clients, regions }
    }

    /// Loads the registry file plus every client's rate and divisor tables
    /// from the configured data directory.
    pub fn load(config: &AuditConfig) -> Result<Self, AuditError> {
        let dir = Path::new(&config.data_dir);

        let clients_path = dir.join(&config.clients_file);
        let raw = fs::read_to_string(&clients_path).map_err(|e| {
            AuditError::MalformedConfiguration(format!("{}: {}", clients_path.display(), e))
        })?;
        let profiles: IndexMap<String, ClientProfile> =
            serde_json::from_str(&raw).map_err(|e| {
                AuditError::MalformedConfiguration(format!("{}: {}", clients_path.display(), e))
            })?;

        let regions = RegionTable::load(&dir.join(&config.region_table))?;

        let mut clients = IndexMap::with_capacity(profiles.len());
        for (id, profile) in profiles {
            let rates = RateTable::load(&dir.join(&profile.rate_table))?;
            let divisors = TaxTable::load(&dir.join(&profile.tax_table))?;
            tracing::info!(
                "Client {} loaded: {} rate rows ({})",
                id,
                rates.len(),
                profile.rate_table
            );
            clients.insert(id, ClientContext { profile, rates, divisors });
        }

        Ok(Self { clients, regions })
    }

    pub fn client(&self, id: &str) -> Result<&ClientContext, AuditError> {
        self.clients
            .get(id)
            .ok_or_else(|| AuditError::UnknownClient(id.to_string()))
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Clients in registry-file order, for the listing endpoint.
    pub fn summaries(&self) -> Vec<ClientSummary> {
        self.clients
            .iter()
            .map(|(id, ctx)| ClientSummary {
                id: id.clone(),
                name: ctx.profile.name.clone(),
                origin: ctx.profile.origin_label.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn seed_data_dir(dir: &Path) {
        write_file(
            dir,
            "clients.json",
            r#"{
  "acme": {
    "name": "Acme Transportes",
    "origin_label": "JOINVILLE",
    "origin_state": "SC",
    "rate_table": "acme_frete.csv",
    "tax_table": "acme_icms.csv"
  }
}"#,
        );
        write_file(
            dir,
            "acme_frete.csv",
            "UF_DESTINO,REGIAO,VOLUME_MIN,VOLUME_MAX,VALOR_M3,FRETE_MINIMO,AD_VALOREM,TAXA_FIXA,PEDAGIO_100KG\n\
             SP,CAPITAL,0,5,\"50,00\",80,\"0,01\",10,5\n",
        );
        write_file(dir, "acme_icms.csv", "uf_origem,uf_destino,divisor\nSC,SP,0.88\n");
        write_file(dir, "municipios.csv", "uf,municipio,regiao\nSP,SAO PAULO,CAPITAL\n");
    }

    fn config_for(dir: &Path) -> AuditConfig {
        AuditConfig {
            data_dir: dir.to_string_lossy().into_owned(),
            clients_file: "clients.json".to_string(),
            region_table: "municipios.csv".to_string(),
            tolerance: 0.01,
        }
    }

    #[test]
    fn loads_registry_and_tables_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        seed_data_dir(dir.path());

        let registry = ClientRegistry::load(&config_for(dir.path())).unwrap();
        assert_eq!(registry.len(), 1);

        let ctx = registry.client("acme").unwrap();
        assert_eq!(ctx.profile.origin_state, "SC");
        // headers are matched case-insensitively, cells accept decimal comma
        let row = ctx
            .rates
            .resolve("SP", crate::tables::RegionTag::Capital, 2.0)
            .unwrap();
        assert_eq!(row.rate_per_m3, 50.0);
        assert_eq!(ctx.divisors.divisor_for("SC", "SP"), 0.88);
    }

    #[test]
    fn unknown_client_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        seed_data_dir(dir.path());

        let registry = ClientRegistry::load(&config_for(dir.path())).unwrap();
        assert!(matches!(
            registry.client("globex"),
            Err(AuditError::UnknownClient(_))
        ));
    }

    #[test]
    fn missing_rate_column_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        seed_data_dir(dir.path());
        // drop the pedagio_100kg column
        write_file(
            dir.path(),
            "acme_frete.csv",
            "uf_destino,regiao,volume_min,volume_max,valor_m3,frete_minimo,ad_valorem,taxa_fixa\n\
             SP,CAPITAL,0,5,50,80,0.01,10\n",
        );

        let err = ClientRegistry::load(&config_for(dir.path())).unwrap_err();
        match err {
            AuditError::MalformedConfiguration(msg) => assert!(msg.contains("pedagio_100kg")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_registry_file_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientRegistry::load(&config_for(dir.path())).unwrap_err();
        assert!(matches!(err, AuditError::MalformedConfiguration(_)));
    }
}
