//! Xulambis Library Catalog
//!
//! A Rust implementation of the Xulambis library catalog server, providing
//! a REST JSON API for managing books, copies, users, and loans.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod lending;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    /// Summary page visit counter, incremented per request
    pub visits: Arc<AtomicU64>,
}
