//! # Outlook - agricultural outlook data service
//!
//! Accepts per-year agricultural indicators (area, yield, production,
//! balance sheet items, prices) as JSON or CSV, validates them against a
//! fixed indicator schema and keeps the current dataset as `outlook.json`
//! and `outlook.csv`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  CSV upload │────▶│    Codec    │────▶│  Validator  │────▶│    Store     │
//! │ (col-major) │     │ (transpose) │     │  (schema)   │     │ (.json+.csv) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────────────┘
//!                     JSON upload ───────────────▲
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use outlook::{OutlookStore, UploadBody};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = OutlookStore::new("data", 2);
//!     let csv = std::fs::read_to_string("upload.csv").unwrap();
//!     let summary = store.upload(UploadBody::Csv(csv)).await.unwrap();
//!     println!("Stored {} years", summary.years);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`schema`] - The fixed indicator schema
//! - [`models`] - Records and datasets
//! - [`codec`] - CSV decoding and encoding
//! - [`validation`] - Schema validation
//! - [`store`] - Persistence of the current dataset
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;
pub mod schema;

// Conversion
pub mod codec;

// Validation
pub mod validation;

// Persistence
pub mod store;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CodecError, PersistError, ReadError, ServerError, ValidationError};

// =============================================================================
// Re-exports - Schema and models
// =============================================================================

pub use models::{Dataset, Record};
pub use schema::{Indicator, ValueKind, INDICATORS};

// =============================================================================
// Re-exports - Codec and validation
// =============================================================================

pub use codec::{decode_csv, decode_upload_bytes, encode_csv};
pub use validation::{validate, validate_owned};

// =============================================================================
// Re-exports - Store and server
// =============================================================================

pub use api::types::{ApiResponse, Outcome};
pub use config::ServerConfig;
pub use store::{Format, OutlookStore, UploadBody, UploadSummary};

// Server
pub mod server {
    pub use crate::api::server::{build_router, serve, start_server};
}
