pub mod api;
pub mod config;
pub mod cte;
pub mod error;
pub mod export;
pub mod models;
pub mod service;
pub mod tables;

pub use config::AppConfig;
pub use error::AuditError;
pub use service::{BatchStore, ReconcilerService};
pub use tables::ClientRegistry;
