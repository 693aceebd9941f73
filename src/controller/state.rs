/// `max_page` value meaning no last page is known yet
pub const UNBOUNDED_PAGE: u32 = u32::MAX;

/// What the presentation layer sees: the accumulated items plus a status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState<T> {
    /// Not started
    Idle,
    /// A page is being fetched; `items` are the ones already shown
    Loading { items: Vec<T> },
    Success { items: Vec<T> },
    /// The last fetch failed; previously accumulated items are kept
    Error { items: Vec<T>, message: String },
}

impl<T> ResultState<T> {
    /// Accumulated items in arrival order
    pub fn items(&self) -> &[T] {
        match self {
            ResultState::Idle => &[],
            ResultState::Loading { items }
            | ResultState::Success { items }
            | ResultState::Error { items, .. } => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ResultState::Idle => Vec::new(),
            ResultState::Loading { items }
            | ResultState::Success { items }
            | ResultState::Error { items, .. } => items,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ResultState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResultState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl<T> Default for ResultState<T> {
    fn default() -> Self {
        ResultState::Idle
    }
}

/// Paging position for the current query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    /// Last page requested; 0 before the first request
    pub current_page: u32,
    /// First empty page seen, or `UNBOUNDED_PAGE`
    pub max_page: u32,
    /// Normalized query
    pub query: String,
}

impl PaginationCursor {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            current_page: 0,
            max_page: UNBOUNDED_PAGE,
            query: query.into(),
        }
    }

    /// True once the last page of the query has been reached
    pub fn is_exhausted(&self) -> bool {
        self.current_page == self.max_page
    }
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Why `load_next_page` did or did not issue a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fetch for `page` is now in flight
    Started { page: u32 },
    /// The last page for this query was already reached
    EndOfResults,
    /// Another fetch has not resolved yet
    InFlight,
    /// The controller was disposed
    Disposed,
}

impl LoadOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, LoadOutcome::Started { .. })
    }
}

/// Case-fold a query for comparison.
///
/// `str::to_lowercase` applies the Unicode default mapping, which does not
/// depend on the runtime locale.
pub fn normalize_query(query: &str) -> String {
    query.to_lowercase()
}
