use crate::cte;
use crate::error::AuditError;
use crate::models::{BatchOutcome, BatchTotals, SkippedDocument};
use crate::service::calculator;
use crate::tables::ClientRegistry;
use uuid::Uuid;

/// Reconciliation orchestrator.
///
/// Owns the read-only reference data for the process lifetime and runs
/// batches synchronously, one document at a time, in input order.
pub struct ReconcilerService {
    registry: ClientRegistry,
    tolerance: f64,
}

impl ReconcilerService {
    pub fn new(registry: ClientRegistry, tolerance: f64) -> Self {
        Self { registry, tolerance }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Audits a batch of CT-e documents for one client.
    ///
    /// Results keep the input order. A document that cannot be parsed or
    /// priced is recorded under `skipped` and never aborts the batch; only
    /// an unknown client rejects the request as a whole.
    pub fn audit_batch(
        &self,
        client_id: &str,
        documents: &[String],
    ) -> Result<BatchOutcome, AuditError> {
        let ctx = self.registry.client(client_id)?;
        tracing::info!(
            "Audit batch for client {}: {} documents",
            client_id,
            documents.len()
        );

        let mut results = Vec::with_capacity(documents.len());
        let mut skipped: Vec<SkippedDocument> = Vec::new();

        for (index, xml) in documents.iter().enumerate() {
            // 1. Extract the invoice, stamping the client origin
            let invoice = match cte::extract_invoice(
                xml,
                &ctx.profile.origin_label,
                &ctx.profile.origin_state,
            ) {
                Ok(invoice) => invoice,
                Err(e) => {
                    tracing::warn!("Document {} skipped: {}", index, e);
                    skipped.push(SkippedDocument {
                        index,
                        cte: String::new(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            // 2. Classify the destination (unknown city means INTERIOR)
            let region = self
                .registry
                .regions()
                .classify(&invoice.destination_state, &invoice.destination_city);

            // 3. Resolve the tariff row; without one the invoice cannot be
            //    priced and is set aside
            let Some(rate) =
                ctx.rates
                    .resolve(&invoice.destination_state, region, invoice.cubed_volume)
            else {
                let reason = AuditError::RateUnavailable {
                    uf: invoice.destination_state.clone(),
                    region: region.as_str().to_string(),
                    volume: invoice.cubed_volume,
                };
                tracing::warn!("CT-e {} skipped: {}", invoice.cte, reason);
                skipped.push(SkippedDocument {
                    index,
                    cte: invoice.cte.clone(),
                    reason: reason.to_string(),
                });
                continue;
            };

            // 4. Resolve the interstate divisor (1.0 = no adjustment)
            let divisor = ctx
                .divisors
                .divisor_for(&invoice.origin_state, &invoice.destination_state);

            // 5. Price and classify
            results.push(calculator::reconcile(&invoice, rate, divisor, self.tolerance));
        }

        // Totals accumulate the unrounded per-row charges (subtotal ÷
        // divisor), not the rounded display values, so they can drift from
        // the sum of per-row differences by sub-cent amounts.
        let mut totals = BatchTotals::default();
        for r in &results {
            totals.expected += r.breakdown.subtotal / r.breakdown.divisor;
            totals.billed += r.billed;
        }
        totals.difference = totals.billed - totals.expected;

        let outcome = BatchOutcome {
            id: Uuid::new_v4(),
            client: client_id.to_string(),
            results,
            totals,
            skipped,
        };
        tracing::info!(
            "Batch {} done: {} audited, {} skipped, difference {:.2}",
            outcome.id,
            outcome.results.len(),
            outcome.skipped.len(),
            outcome.totals.difference
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReconciliationStatus;
    use crate::tables::{
        ClientContext, RateRow, RateTable, RegionTable, RegionTag, TaxDivisorRow, TaxTable,
    };
    use crate::models::ClientProfile;
    use indexmap::IndexMap;

    fn cte_doc(n: &str, city: &str, uf: &str, volume: &str, weight: &str, billed: &str) -> String {
        format!(
            r#"<cteProc xmlns="{}">
  <CTe><infCte>
    <ide><nCT>{n}</nCT><UFFim>{uf}</UFFim><xMunFim>{city}</xMunFim></ide>
    <infCTeNorm><infCarga>
      <vCarga>1000.00</vCarga>
      <infQ><tpMed>PESO DECLARADO</tpMed><qCarga>{weight}</qCarga></infQ>
      <infQ><tpMed>PESO CUBADO</tpMed><qCarga>{volume}</qCarga></infQ>
    </infCarga></infCTeNorm>
    <vPrest><vTPrest>{billed}</vTPrest></vPrest>
  </infCte></CTe>
</cteProc>"#,
            crate::cte::CTE_NS
        )
    }

    fn service() -> ReconcilerService {
        let rates = RateTable::from_rows(vec![RateRow {
            uf: "SP".to_string(),
            region: RegionTag::Capital,
            volume_min: 0.0,
            volume_max: 5.0,
            rate_per_m3: 50.0,
            minimum_charge: 80.0,
            insurance_rate: 0.01,
            fixed_fee: 10.0,
            toll_per_band: 5.0,
        }]);
        let divisors = TaxTable::from_rows(vec![TaxDivisorRow {
            origin_state: "SC".to_string(),
            destination_state: "SP".to_string(),
            divisor: 2.0,
        }]);
        let regions = RegionTable::from_entries([(
            "SP".to_string(),
            "SAO PAULO".to_string(),
            RegionTag::Capital,
        )]);

        let mut clients = IndexMap::new();
        clients.insert(
            "acme".to_string(),
            ClientContext {
                profile: ClientProfile {
                    name: "Acme Transportes".to_string(),
                    origin_label: "JOINVILLE".to_string(),
                    origin_state: "SC".to_string(),
                    rate_table: "acme_frete.csv".to_string(),
                    tax_table: "acme_icms.csv".to_string(),
                },
                rates,
                divisors,
            },
        );
        ReconcilerService::new(ClientRegistry::from_parts(clients, regions), 0.01)
    }

    #[test]
    fn audits_a_document_end_to_end() {
        let svc = service();
        let docs = vec![cte_doc("1", "SAO PAULO", "SP", "2,0000", "250.00", "60.00")];

        let outcome = svc.audit_batch("acme", &docs).unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.skipped.is_empty());

        let r = &outcome.results[0];
        assert_eq!(r.expected, 67.5);
        assert_eq!(r.difference, -7.5);
        assert_eq!(r.status, ReconciliationStatus::Underbilled);
        assert_eq!(r.origin, "JOINVILLE");
    }

    #[test]
    fn unknown_client_rejects_the_batch() {
        let svc = service();
        let err = svc.audit_batch("globex", &[]).unwrap_err();
        assert!(matches!(err, AuditError::UnknownClient(_)));
    }

    #[test]
    fn results_keep_input_order() {
        let svc = service();
        let docs = vec![
            cte_doc("3", "SAO PAULO", "SP", "1", "100", "50"),
            cte_doc("1", "SAO PAULO", "SP", "2", "100", "50"),
            cte_doc("2", "SAO PAULO", "SP", "3", "100", "50"),
        ];

        let outcome = svc.audit_batch("acme", &docs).unwrap();
        let order: Vec<&str> = outcome.results.iter().map(|r| r.cte.as_str()).collect();
        assert_eq!(order, ["3", "1", "2"]);
    }

    #[test]
    fn malformed_document_is_contained() {
        let svc = service();
        let docs = vec![
            cte_doc("1", "SAO PAULO", "SP", "2", "250", "60"),
            "<broken".to_string(),
            cte_doc("2", "SAO PAULO", "SP", "2", "250", "60"),
        ];

        let outcome = svc.audit_batch("acme", &docs).unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 1);
        assert!(outcome.skipped[0].cte.is_empty());
    }

    #[test]
    fn rate_gap_skips_invoice_but_not_batch() {
        let svc = service();
        // volume 7 falls outside the single 0–5 band
        let docs = vec![
            cte_doc("1", "SAO PAULO", "SP", "7", "250", "60"),
            cte_doc("2", "SAO PAULO", "SP", "2", "250", "60"),
        ];

        let outcome = svc.audit_batch("acme", &docs).unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].cte, "2");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].cte, "1");
        assert!(outcome.skipped[0].reason.contains("tarifa"));
    }

    #[test]
    fn unknown_destination_classifies_interior_and_finds_no_rate() {
        let svc = service();
        // city missing from the region table classifies INTERIOR, so no CAPITAL row fits
        let docs = vec![cte_doc("9", "SMALLTOWN", "SP", "2", "100", "50")];

        let outcome = svc.audit_batch("acme", &docs).unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].reason.contains("INTERIOR"));
    }

    #[test]
    fn totals_sum_unrounded_charges_not_rounded_differences() {
        // three destinations with distinct divisors; every subtotal is 135
        let row = |uf: &str| RateRow {
            uf: uf.to_string(),
            region: RegionTag::Capital,
            volume_min: 0.0,
            volume_max: 5.0,
            rate_per_m3: 50.0,
            minimum_charge: 80.0,
            insurance_rate: 0.01,
            fixed_fee: 10.0,
            toll_per_band: 5.0,
        };
        let divisor = |uf: &str, d: f64| TaxDivisorRow {
            origin_state: "SC".to_string(),
            destination_state: uf.to_string(),
            divisor: d,
        };
        let rates = RateTable::from_rows(vec![row("SP"), row("RJ"), row("PR")]);
        let divisors = TaxTable::from_rows(vec![
            divisor("SP", 1.13),
            divisor("RJ", 1.17),
            divisor("PR", 1.06),
        ]);
        let regions = RegionTable::from_entries([
            ("SP".to_string(), "SAO PAULO".to_string(), RegionTag::Capital),
            ("RJ".to_string(), "RIO DE JANEIRO".to_string(), RegionTag::Capital),
            ("PR".to_string(), "CURITIBA".to_string(), RegionTag::Capital),
        ]);
        let mut clients = IndexMap::new();
        clients.insert(
            "acme".to_string(),
            ClientContext {
                profile: ClientProfile {
                    name: "Acme Transportes".to_string(),
                    origin_label: "JOINVILLE".to_string(),
                    origin_state: "SC".to_string(),
                    rate_table: "acme_frete.csv".to_string(),
                    tax_table: "acme_icms.csv".to_string(),
                },
                rates,
                divisors,
            },
        );
        let svc = ReconcilerService::new(ClientRegistry::from_parts(clients, regions), 0.01);

        // each carrier bill matches the rounded expected charge exactly
        let docs = vec![
            cte_doc("1", "SAO PAULO", "SP", "2", "250", "119.47"), // 135/1.13 = 119.4690...
            cte_doc("2", "RIO DE JANEIRO", "RJ", "2", "250", "115.38"), // 135/1.17 = 115.3846...
            cte_doc("3", "CURITIBA", "PR", "2", "250", "127.36"), // 135/1.06 = 127.3584...
        ];

        let outcome = svc.audit_batch("acme", &docs).unwrap();
        assert_eq!(outcome.results.len(), 3);

        let rounded_sum: f64 = outcome.results.iter().map(|r| r.difference).sum();
        assert_eq!(rounded_sum, 0.0); // every row reconciles to OK

        // totals carry the unrounded charges, so the batch difference
        // drifts below zero by a fraction of a cent
        let unrounded = 135.0 / 1.13 + 135.0 / 1.17 + 135.0 / 1.06;
        assert!((outcome.totals.expected - unrounded).abs() < 1e-9);
        assert!((outcome.totals.billed - 362.21).abs() < 1e-9);
        assert!((outcome.totals.difference - (362.21 - unrounded)).abs() < 1e-9);
        assert!(outcome.totals.difference != rounded_sum);
        assert!(outcome.totals.difference.abs() < 0.01);
    }
}
