pub mod handlers;

pub use handlers::*;

use crate::service::{BatchStore, ReconcilerService};
use std::sync::Arc;

/// Shared state: the orchestrator plus the store of completed batches.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<ReconcilerService>,
    pub batches: Arc<BatchStore>,
}
