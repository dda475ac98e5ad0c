//! RawMat Portal Common Library
//!
//! Shared code for the portal service including:
//! - Lead model and CSV-backed lead store
//! - Dashboard report computation
//! - Error types and handling
//! - Configuration management
//! - Admin session utilities
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod errors;
pub mod leads;
pub mod metrics;
pub mod reports;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use leads::{Lead, LeadStatus, MaterialCategory};
pub use store::LeadStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timestamp format used for the `Date` column (local submission time)
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
