//! Incremental paginated search.
//!
//! [`PaginatedSearchController`] walks a query page by page through a
//! [`SearchProvider`], appending each page to the accumulated results and
//! publishing every transition on a `watch` channel. Search-as-you-type and
//! infinite scroll share one trigger: callers pair [`set_query`] with
//! [`load_next_page`], and `load_next_page` alone is also what fetches more
//! when the end of the list is reached.
//!
//! [`set_query`]: PaginatedSearchController::set_query
//! [`load_next_page`]: PaginatedSearchController::load_next_page

mod state;

pub use state::{normalize_query, LoadOutcome, PaginationCursor, ResultState, UNBOUNDED_PAGE};

use crate::search::{Identified, SearchError, SearchProvider};
use crate::session::SessionSink;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

/// Mutable paging state shared with the fetch task
struct Inner {
    cursor: PaginationCursor,
    /// Bumped whenever the accumulated results are reset; a fetch only
    /// applies its page if the generation it started with is still current.
    generation: u64,
    /// Present while a fetch is in flight
    fetch: Option<JoinHandle<()>>,
    disposed: bool,
}

impl Inner {
    fn cancel_fetch(&mut self) {
        if let Some(handle) = self.fetch.take() {
            handle.abort();
            tracing::debug!(
                query = %self.cursor.query,
                page = self.cursor.current_page,
                "cancelled in-flight fetch"
            );
        }
        self.generation += 1;
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.cancel_fetch();
        tracing::debug!("search controller disposed");
    }
}

/// Completion side of one fetch.
///
/// A slot dropped while still pending means the task died before the
/// provider answered (it panicked); the in-flight flag is freed and an error
/// is published so the caller can fetch again.
struct FetchSlot<T> {
    shared: Arc<Mutex<Inner>>,
    result_tx: Arc<watch::Sender<ResultState<T>>>,
    generation: u64,
    query: String,
    page: u32,
    pending: bool,
}

impl<T> FetchSlot<T> {
    /// Aborted or superseded fetches must not touch the state.
    fn is_current(&self, inner: &Inner) -> bool {
        !inner.disposed && inner.generation == self.generation
    }

    fn finish(mut self, outcome: Result<Vec<T>, SearchError>) {
        self.pending = false;
        let (query, page) = (&self.query, self.page);

        let mut inner = lock(&self.shared);
        if !self.is_current(&inner) {
            tracing::debug!(query = %query, page, "discarding stale page");
            return;
        }
        inner.fetch = None;

        match outcome {
            Ok(page_items) => {
                if page_items.is_empty() {
                    inner.cursor.max_page = page;
                    tracing::debug!(query = %query, max_page = page, "reached last page");
                } else {
                    tracing::debug!(
                        query = %query,
                        page,
                        count = page_items.len(),
                        "page loaded"
                    );
                }

                self.result_tx.send_modify(|state| {
                    let mut items = std::mem::take(state).into_items();
                    items.extend(page_items);
                    *state = ResultState::Success { items };
                });
            }
            Err(e) => {
                tracing::warn!(query = %query, page, error = %e, "failed to load page");
                self.fail(e.to_string());
            }
        }
    }

    fn fail(&self, message: String) {
        self.result_tx.send_modify(|state| {
            let items = std::mem::take(state).into_items();
            *state = ResultState::Error { items, message };
        });
    }
}

impl<T> Drop for FetchSlot<T> {
    fn drop(&mut self) {
        if !self.pending {
            return;
        }

        let mut inner = lock(&self.shared);
        if !self.is_current(&inner) {
            return;
        }
        inner.fetch = None;

        tracing::warn!(
            query = %self.query,
            page = self.page,
            "search task ended without a result"
        );
        self.fail("search was interrupted".to_string());
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives page-by-page search for one screen visit.
///
/// Fetches run on the Tokio runtime, so `start` and `load_next_page` must be
/// called from within one. At most one fetch is in flight at a time.
/// Dropping the controller disposes it.
pub struct PaginatedSearchController<T> {
    provider: Arc<dyn SearchProvider<T>>,
    sink: Arc<dyn SessionSink>,
    inner: Arc<Mutex<Inner>>,
    result_tx: Arc<watch::Sender<ResultState<T>>>,
    selected_tx: watch::Sender<bool>,
}

impl<T> PaginatedSearchController<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(provider: Arc<dyn SearchProvider<T>>, sink: Arc<dyn SessionSink>) -> Self {
        let (result_tx, _) = watch::channel(ResultState::Idle);
        let (selected_tx, _) = watch::channel(false);

        Self {
            provider,
            sink,
            inner: Arc::new(Mutex::new(Inner {
                cursor: PaginationCursor::default(),
                generation: 0,
                fetch: None,
                disposed: false,
            })),
            result_tx: Arc::new(result_tx),
            selected_tx,
        }
    }

    /// Reset everything to an empty query and fetch its first page.
    pub fn start(&self) -> LoadOutcome {
        {
            let mut inner = lock(&self.inner);
            if inner.disposed {
                return LoadOutcome::Disposed;
            }

            inner.cancel_fetch();
            inner.cursor = PaginationCursor::default();
            self.result_tx.send_replace(ResultState::Success { items: Vec::new() });
            self.selected_tx.send_replace(false);
        }

        tracing::debug!("search controller started");
        self.load_next_page()
    }

    /// Switch to a new query, clearing accumulated results.
    ///
    /// Queries are compared case-insensitively; an equivalent query changes
    /// nothing. Does not fetch. Returns whether a reset happened.
    pub fn set_query(&self, query: &str) -> bool {
        let normalized = normalize_query(query);

        let mut inner = lock(&self.inner);
        if inner.disposed || normalized == inner.cursor.query {
            return false;
        }

        inner.cancel_fetch();
        tracing::debug!(from = %inner.cursor.query, to = %normalized, "query changed");
        inner.cursor = PaginationCursor::new(normalized);
        self.result_tx.send_replace(ResultState::Success { items: Vec::new() });

        true
    }

    /// Fetch the page after `current_page` for the current query.
    ///
    /// Silently does nothing when the last page was already reached, while
    /// another fetch is in flight, or after disposal. A failed page is not
    /// retried: the next call asks for the page after it.
    pub fn load_next_page(&self) -> LoadOutcome {
        let mut inner = lock(&self.inner);

        if inner.disposed {
            return LoadOutcome::Disposed;
        }
        if inner.cursor.is_exhausted() {
            tracing::trace!(
                query = %inner.cursor.query,
                max_page = inner.cursor.max_page,
                "no more pages"
            );
            return LoadOutcome::EndOfResults;
        }
        if inner.fetch.is_some() {
            tracing::trace!(query = %inner.cursor.query, "fetch already in flight");
            return LoadOutcome::InFlight;
        }

        self.result_tx.send_modify(|state| {
            let items = std::mem::take(state).into_items();
            *state = ResultState::Loading { items };
        });

        inner.cursor.current_page += 1;
        let page = inner.cursor.current_page;
        tracing::debug!(query = %inner.cursor.query, page, "loading page");

        // Resolved before the slot exists: its drop would relock `inner`.
        let runtime = tokio::runtime::Handle::current();
        let provider = Arc::clone(&self.provider);
        let slot = FetchSlot {
            shared: Arc::clone(&self.inner),
            result_tx: Arc::clone(&self.result_tx),
            generation: inner.generation,
            query: inner.cursor.query.clone(),
            page,
            pending: true,
        };

        inner.fetch = Some(runtime.spawn(async move {
            let outcome = provider.search(&slot.query, page).await;
            slot.finish(outcome);
        }));

        LoadOutcome::Started { page }
    }

    /// Record `item` as the session's current selection.
    ///
    /// Every call reaches the sink; guarding against repeated selection is
    /// up to the caller. Returns false, without touching the sink, once
    /// disposed.
    pub fn select(&self, item: &T) -> bool
    where
        T: Identified,
    {
        let inner = lock(&self.inner);
        if inner.disposed {
            return false;
        }

        tracing::info!(id = item.id(), name = %item.name(), "item selected");
        self.sink.record_selection(item.id(), item.name());
        self.selected_tx.send_replace(true);

        true
    }

    /// Cancel any in-flight fetch and stop reacting to further calls.
    pub fn dispose(&self) {
        lock(&self.inner).dispose();
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.inner).disposed
    }

    pub fn is_fetching(&self) -> bool {
        lock(&self.inner).fetch.is_some()
    }

    pub fn is_selected(&self) -> bool {
        *self.selected_tx.borrow()
    }

    /// Snapshot of the paging position
    pub fn cursor(&self) -> PaginationCursor {
        lock(&self.inner).cursor.clone()
    }

    /// Receiver that always holds the latest state
    pub fn subscribe(&self) -> watch::Receiver<ResultState<T>> {
        self.result_tx.subscribe()
    }

    pub fn selection(&self) -> watch::Receiver<bool> {
        self.selected_tx.subscribe()
    }
}

impl<T> PaginatedSearchController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Copy of the current state
    pub fn result(&self) -> ResultState<T> {
        self.result_tx.borrow().clone()
    }

    /// The result states as a stream, starting with the current one
    pub fn stream(&self) -> WatchStream<ResultState<T>> {
        WatchStream::new(self.subscribe())
    }
}

impl<T> Drop for PaginatedSearchController<T> {
    fn drop(&mut self) {
        lock(&self.inner).dispose();
    }
}
