use crate::error::AuditError;
use csv::StringRecord;
use std::fs::File;
use std::path::Path;

/// Opens a reference table for reading, with cell trimming enabled.
pub(crate) fn open_table(path: &Path) -> Result<csv::Reader<File>, AuditError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            AuditError::MalformedConfiguration(format!("tabela {}: {}", path.display(), e))
        })
}

/// Resolves a required column by name, case-insensitively.
///
/// Reference files come from client spreadsheets, so header casing varies;
/// a missing column fails the whole load.
pub(crate) fn column_index(
    headers: &StringRecord,
    path: &Path,
    name: &str,
) -> Result<usize, AuditError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            AuditError::MalformedConfiguration(format!(
                "tabela {}: coluna obrigatória `{}` ausente",
                path.display(),
                name
            ))
        })
}

pub(crate) fn cell<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("")
}

/// Strict decimal parse for table cells; accepts decimal comma, fails the
/// load on anything unparseable (unlike document parsing, which zeroes).
pub(crate) fn numeric_cell(
    record: &StringRecord,
    index: usize,
    path: &Path,
    name: &str,
) -> Result<f64, AuditError> {
    let raw = cell(record, index);
    raw.trim().replace(',', ".").parse().map_err(|_| {
        AuditError::MalformedConfiguration(format!(
            "tabela {}: valor inválido `{}` na coluna `{}`",
            path.display(),
            raw,
            name
        ))
    })
}
