use crate::models::{ChargeBreakdown, ReconciliationResult, ReconciliationStatus, ShipmentInvoice};
use crate::tables::RateRow;

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Started 100 kg bands: any remainder, even 1 kg, counts a whole band.
pub fn toll_bands(declared_weight: f64) -> u32 {
    (declared_weight / 100.0).ceil() as u32
}

/// Expected charge plus its itemized breakdown.
#[derive(Debug, Clone)]
pub struct ChargeQuote {
    pub expected: f64,
    pub breakdown: ChargeBreakdown,
}

/// Prices one shipment against its tariff row. Pure; fixed step order, no
/// branching on magnitude.
pub fn quote(invoice: &ShipmentInvoice, rate: &RateRow, divisor: f64) -> ChargeQuote {
    let volume_charge = invoice.cubed_volume * rate.rate_per_m3;
    let base_charge = volume_charge.max(rate.minimum_charge);
    let insurance = invoice.cargo_value * rate.insurance_rate;
    let bands = toll_bands(invoice.declared_weight);
    let toll = f64::from(bands) * rate.toll_per_band;
    let subtotal = base_charge + insurance + rate.fixed_fee + toll;
    let expected = round2(subtotal / divisor);

    ChargeQuote {
        expected,
        breakdown: ChargeBreakdown {
            volume_charge,
            base_charge,
            insurance,
            fixed_fee: rate.fixed_fee,
            toll_bands: bands,
            toll,
            subtotal,
            divisor,
        },
    }
}

/// Verdict for a signed difference against the tolerance band.
pub fn classify(difference: f64, tolerance: f64) -> ReconciliationStatus {
    if difference.abs() <= tolerance {
        ReconciliationStatus::Ok
    } else if difference > 0.0 {
        ReconciliationStatus::Overbilled
    } else {
        ReconciliationStatus::Underbilled
    }
}

/// Full reconciliation of one invoice: expected charge, signed difference
/// (positive = overbilled) and status, with the audit breakdown attached.
pub fn reconcile(
    invoice: &ShipmentInvoice,
    rate: &RateRow,
    divisor: f64,
    tolerance: f64,
) -> ReconciliationResult {
    let ChargeQuote { expected, breakdown } = quote(invoice, rate, divisor);
    let difference = round2(invoice.billed_total - expected);

    ReconciliationResult {
        cte: invoice.cte.clone(),
        origin: invoice.origin.clone(),
        destination: invoice.destination_label(),
        expected,
        billed: invoice.billed_total,
        difference,
        status: classify(difference, tolerance),
        breakdown,
    }
}
