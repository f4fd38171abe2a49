pub mod client;
pub mod invoice;
pub mod result;

pub use client::{ClientProfile, ClientSummary};
pub use invoice::ShipmentInvoice;
pub use result::{
    BatchOutcome, BatchTotals, ChargeBreakdown, ReconciliationResult, ReconciliationStatus,
    SkippedDocument,
};
