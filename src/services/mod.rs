//! View-facing services over the repositories

pub mod catalog;
pub mod search;
pub mod view_state;

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::SearchConfig;
use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    repository: Repository,
    search: SearchConfig,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, search: SearchConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            repository,
            search,
        }
    }

    /// Build a debounced search coordinator for one view, using the
    /// configured quiet window.
    pub fn search_coordinator(
        &self,
    ) -> (
        search::SearchCoordinator,
        UnboundedReceiver<search::SearchUpdate>,
    ) {
        search::SearchCoordinator::new(
            self.repository.books.clone(),
            Duration::from_millis(self.search.debounce_ms),
        )
    }
}
