use thiserror::Error;

/// Audit error taxonomy.
///
/// Per-document failures (`MalformedDocument`, `RateUnavailable`) are
/// contained at the document boundary and recorded as skipped entries;
/// configuration failures abort startup.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The uploaded document is not parseable CT-e XML.
    #[error("documento CT-e malformado: {0}")]
    MalformedDocument(String),

    /// No rate row covers this (state, region, volume) combination.
    #[error("tarifa indisponível para {uf}/{region} com volume {volume} m³")]
    RateUnavailable {
        uf: String,
        region: String,
        volume: f64,
    },

    /// Audit requested for a client id not present in the registry.
    #[error("cliente não configurado: {0}")]
    UnknownClient(String),

    /// Reference table or client registry failed load-time validation.
    #[error("configuração inválida: {0}")]
    MalformedConfiguration(String),

    /// Export requested but no batch exists under the given handle.
    #[error("nenhum resultado para exportar")]
    NoPriorResult,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
