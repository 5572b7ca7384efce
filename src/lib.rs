//! Local Library catalog server
//!
//! REST JSON API over a library catalog: public browsing of books and
//! authors, borrowed-copy lists, due-date renewal for librarians, and a
//! staff console driven by declarative per-model admin configuration.

use std::sync::Arc;

pub mod admin;
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod forms;
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
}
