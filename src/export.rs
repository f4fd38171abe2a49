use crate::error::AuditError;
use crate::models::BatchOutcome;
use chrono::Local;

/// Audit sheet column set.
const HEADERS: [&str; 7] = [
    "CT-e",
    "Origem",
    "Destino",
    "Valor Esperado",
    "Valor Cobrado",
    "Diferença",
    "Status",
];

/// Renders a batch outcome as CSV bytes, amounts to two decimal places.
pub fn render_csv(outcome: &BatchOutcome) -> Result<Vec<u8>, AuditError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for r in &outcome.results {
        let expected = format!("{:.2}", r.expected);
        let billed = format!("{:.2}", r.billed);
        let difference = format!("{:.2}", r.difference);
        writer.write_record([
            r.cte.as_str(),
            r.origin.as_str(),
            r.destination.as_str(),
            expected.as_str(),
            billed.as_str(),
            difference.as_str(),
            r.status.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AuditError::Io(e.into_error()))
}

/// Timestamped download name for the audit sheet.
pub fn export_filename() -> String {
    format!(
        "conferencia_frete_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    )
}
