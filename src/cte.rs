use crate::error::AuditError;
use crate::models::ShipmentInvoice;
use roxmltree::Document;

/// CT-e document namespace.
pub const CTE_NS: &str = "http://www.portalfiscal.inf.br/cte";

const MEASURE_DECLARED: &str = "PESO DECLARADO";
const MEASURE_CALCULATION: &str = "PESO BASE DE CALCULO";
const MEASURE_CUBED: &str = "PESO CUBADO";

/// Normalizes a decimal-comma value and parses it, zero on failure.
///
/// Only "," is swapped for "."; a thousands separator as in "1.500,50"
/// produces an unparseable "1.500.50" and therefore 0.0.
pub fn parse_decimal(raw: &str) -> f64 {
    raw.trim().replace(',', ".").parse().unwrap_or(0.0)
}

/// Parses one CT-e document into a [`ShipmentInvoice`].
///
/// Missing elements yield empty strings / zeros; only a document that is
/// not parseable XML at all fails, with [`AuditError::MalformedDocument`].
/// The client's origin label/state is stamped onto the record here so the
/// invoice is immutable afterwards.
pub fn extract_invoice(
    xml: &str,
    origin_label: &str,
    origin_state: &str,
) -> Result<ShipmentInvoice, AuditError> {
    let doc = Document::parse(xml).map_err(|e| AuditError::MalformedDocument(e.to_string()))?;

    let text = |name: &str| -> String {
        doc.descendants()
            .find(|n| n.has_tag_name((CTE_NS, name)))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    };

    let mut declared_weight = 0.0;
    let mut calculation_weight = 0.0;
    let mut cubed_volume = 0.0;

    // Each infQ entry carries a measure-type label (tpMed) and a quantity
    // (qCarga); entries with unrecognized labels are ignored.
    for entry in doc
        .descendants()
        .filter(|n| n.has_tag_name((CTE_NS, "infQ")))
    {
        let label = entry
            .children()
            .find(|c| c.has_tag_name((CTE_NS, "tpMed")))
            .and_then(|c| c.text())
            .map(|t| t.trim().to_uppercase())
            .unwrap_or_default();
        let quantity = entry
            .children()
            .find(|c| c.has_tag_name((CTE_NS, "qCarga")))
            .and_then(|c| c.text())
            .map(parse_decimal)
            .unwrap_or(0.0);

        match label.as_str() {
            MEASURE_DECLARED => declared_weight = quantity,
            MEASURE_CALCULATION => calculation_weight = quantity,
            MEASURE_CUBED => cubed_volume = quantity,
            _ => {}
        }
    }

    Ok(ShipmentInvoice {
        cte: text("nCT"),
        origin: origin_label.to_string(),
        origin_state: origin_state.to_string(),
        destination_city: text("xMunFim"),
        destination_state: text("UFFim"),
        declared_weight,
        calculation_weight,
        cubed_volume,
        cargo_value: parse_decimal(&text("vCarga")),
        billed_total: parse_decimal(&text("vTPrest")),
    })
}
