//! Debounced, sequence-guarded catalog search.
//!
//! Two races are handled explicitly:
//!
//! - **Debounce race**: each keystroke aborts the previously scheduled timer
//!   outright before scheduling a fresh one, so a burst of keystrokes within
//!   the quiet window issues exactly one request, for the last query.
//! - **Stale-response race**: every issued request takes a monotonically
//!   increasing sequence number; a response is delivered only while its
//!   number is still the latest issued. In-flight losers are allowed to
//!   complete and are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ApiResult;
use crate::models::book::Book;
use crate::repository::books::BooksRepository;

/// Outcome of a search that survived both races
#[derive(Debug)]
pub struct SearchUpdate {
    pub query: String,
    pub result: ApiResult<Vec<Book>>,
}

/// Coordinates keystroke-driven searches for one view.
///
/// Must be used inside a tokio runtime; `on_input` spawns the timer task.
pub struct SearchCoordinator {
    books: BooksRepository,
    delay: Duration,
    issued: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    updates: UnboundedSender<SearchUpdate>,
}

impl SearchCoordinator {
    /// Create a coordinator and the receiving end for surviving results.
    pub fn new(
        books: BooksRepository,
        delay: Duration,
    ) -> (Self, UnboundedReceiver<SearchUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        (
            Self {
                books,
                delay,
                issued: Arc::new(AtomicU64::new(0)),
                pending: Mutex::new(None),
                updates,
            },
            receiver,
        )
    }

    /// Register a keystroke. Supersedes any not-yet-fired timer.
    pub fn on_input(&self, query: &str) {
        // Cancel the previous timer outright rather than letting it fire
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            previous.abort();
        }

        let books = self.books.clone();
        let issued = Arc::clone(&self.issued);
        let updates = self.updates.clone();
        let delay = self.delay;
        let query = query.to_string();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // The sequence number is taken when the request is issued, after
            // the quiet period, so aborted timers never consume one.
            let ticket = issued.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Issuing search #{} for {:?}", ticket, query);
            let result = books.search(&query).await;

            if issued.load(Ordering::SeqCst) == ticket {
                let _ = updates.send(SearchUpdate { query, result });
            } else {
                debug!("Discarding stale search #{} for {:?}", ticket, query);
            }
        });

        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }

    /// Abort any scheduled-but-unfired search
    pub fn cancel_pending(&self) {
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            previous.abort();
        }
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
