//! HTTP API module.
//!
//! This module provides the HTTP server, response types and the service log
//! for the outlook backend.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{build_router, serve, start_server, AppState};
pub use types::*;
