use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reconciliation verdict for one invoice.
///
/// Wire labels keep the display values of the audit sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationStatus {
    #[serde(rename = "OK")]
    Ok,
    /// Carrier billed more than the table allows.
    #[serde(rename = "A MAIOR")]
    Overbilled,
    /// Carrier billed less than the table allows.
    #[serde(rename = "A MENOR")]
    Underbilled,
}

impl ReconciliationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationStatus::Ok => "OK",
            ReconciliationStatus::Overbilled => "A MAIOR",
            ReconciliationStatus::Underbilled => "A MENOR",
        }
    }
}

/// Itemized sub-amounts behind an expected charge.
///
/// Summing `base_charge + insurance + fixed_fee + toll` gives `subtotal`,
/// the value before the tax-divisor adjustment. Required audit output, not
/// debug data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    /// cubed_volume × valor_m3, before the minimum-charge floor.
    pub volume_charge: f64,
    /// max(volume_charge, frete_minimo).
    pub base_charge: f64,
    /// cargo_value × ad_valorem.
    pub insurance: f64,
    pub fixed_fee: f64,
    /// ceil(declared_weight / 100); a started band counts whole.
    pub toll_bands: u32,
    pub toll: f64,
    pub subtotal: f64,
    /// ICMS divisor applied to the subtotal (1.0 = no adjustment).
    pub divisor: f64,
}

/// One reconciled invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub cte: String,
    pub origin: String,
    pub destination: String,
    pub expected: f64,
    pub billed: f64,
    /// billed − expected; positive = overbilled.
    pub difference: f64,
    pub status: ReconciliationStatus,
    pub breakdown: ChargeBreakdown,
}

/// Arithmetic sums over a batch.
///
/// `expected` sums the unrounded per-row charges (subtotal ÷ divisor);
/// `difference` is `billed − expected` over those sums, not the sum of
/// per-row rounded differences, from which it may drift by sub-cent
/// amounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchTotals {
    pub expected: f64,
    pub billed: f64,
    pub difference: f64,
}

/// Document that produced no result, with the reason it was set aside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDocument {
    /// Position in the uploaded batch.
    pub index: usize,
    /// CT-e number when the document parsed far enough to have one.
    pub cte: String,
    pub reason: String,
}

/// Result handle for one processed batch.
///
/// Returned by the orchestrator and passed explicitly to the export step;
/// immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub id: Uuid,
    pub client: String,
    pub results: Vec<ReconciliationResult>,
    pub totals: BatchTotals,
    pub skipped: Vec<SkippedDocument>,
}
