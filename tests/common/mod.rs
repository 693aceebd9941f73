//! Common test utilities: scripted providers, recording sinks and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use projsel::controller::{PaginatedSearchController, ResultState};
use projsel::search::{Identified, SearchError, SearchProvider};
use projsel::session::SessionSink;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Minimal searchable item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

impl Item {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

impl Identified for Item {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build a page of items named after the given strings
pub fn page(names: &[&str]) -> Vec<Item> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| Item::new(idx as u64 + 1, name))
        .collect()
}

pub fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

/// One scripted provider response
pub enum Reply {
    Page(Vec<Item>),
    Fail(String),
}

/// Provider that answers from a script and records every call.
///
/// Once the script runs out it answers with empty pages.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider<Item> for ScriptedProvider {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<Item>, SearchError> {
        self.calls.lock().unwrap().push((query.to_string(), page));
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Page(items)) => Ok(items),
            Some(Reply::Fail(message)) => Err(SearchError::ApiError(message)),
            None => Ok(Vec::new()),
        }
    }
}

/// Provider whose calls never resolve
#[derive(Default)]
pub struct PendingProvider {
    calls: AtomicUsize,
}

impl PendingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider<Item> for PendingProvider {
    async fn search(&self, _query: &str, _page: u32) -> Result<Vec<Item>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Provider that holds each call until the test releases it
pub struct GatedProvider {
    gate: tokio::sync::Semaphore,
    inner: Arc<ScriptedProvider>,
}

impl GatedProvider {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            gate: tokio::sync::Semaphore::new(0),
            inner: ScriptedProvider::new(replies),
        })
    }

    /// Let one pending call complete
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.inner.calls()
    }
}

#[async_trait]
impl SearchProvider<Item> for GatedProvider {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<Item>, SearchError> {
        self.inner.calls.lock().unwrap().push((query.to_string(), page));
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        let reply = self.inner.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Page(items)) => Ok(items),
            Some(Reply::Fail(message)) => Err(SearchError::ApiError(message)),
            None => Ok(Vec::new()),
        }
    }
}

/// Sink that remembers every selection it receives
#[derive(Default)]
pub struct RecordingSink {
    selections: Mutex<Vec<(u64, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn selections(&self) -> Vec<(u64, String)> {
        self.selections.lock().unwrap().clone()
    }
}

impl SessionSink for RecordingSink {
    fn record_selection(&self, id: u64, name: &str) {
        self.selections.lock().unwrap().push((id, name.to_string()));
    }
}

/// Wait until the controller is no longer loading and return the state
pub async fn settle<T>(controller: &PaginatedSearchController<T>) -> ResultState<T>
where
    T: Clone + Send + Sync + 'static,
{
    let mut rx = controller.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.is_loading()))
        .await
        .expect("controller did not settle in time")
        .expect("controller dropped")
        .clone();
    state
}

/// Let spawned tasks run without waiting on any particular state
pub async fn yield_a_few() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Temporary directory for file-backed tests
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        if let Some(parent) = filepath.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read test file")
    }
}
