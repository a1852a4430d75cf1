//! Biblio Library Management System Client
//!
//! A Rust client for the Biblio library-management REST API: persistent
//! session storage, authenticated request dispatch with normalized errors,
//! typed resource repositories, and view-state reconciliation for the
//! borrow/return and admin flows.

use std::sync::Arc;

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod session;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};

/// Application state shared across all views
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub repository: Arc<repository::Repository>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire the whole client together from loaded configuration.
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let client = ApiClient::from_config(&config, session)?;
        let repository = repository::Repository::new(client);
        let services = services::Services::new(repository.clone(), config.search.clone());
        Ok(Self {
            config: Arc::new(config),
            repository: Arc::new(repository),
            services: Arc::new(services),
        })
    }
}
