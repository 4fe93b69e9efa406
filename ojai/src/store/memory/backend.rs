use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::connection::Endpoint;
use crate::document::Document;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use crate::query::Query;
use crate::store::memory::{InMemoryBackendBuilder, InMemoryConfig, InMemoryCursor};
use crate::store::{CursorProvider, StoreBackendProvider};
use crate::stream::{FilteredStream, ProjectedStream, RawStream};
use dashmap::DashMap;
use im::OrdMap;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A [StoreBackendProvider] keeping every store in process memory.
///
/// # Characteristics
/// - **Buffered writes**: upserts land in a per-store pending buffer and
///   become durable on `flush` (or when the auto-flush threshold is hit).
/// - **Read your writes**: queries and lookups see pending writes of the
///   same backend, flushed or not.
/// - **Ordered results**: streams return documents in ascending `_id` order.
/// - **Snapshot cursors**: a cursor iterates the state at the time it was
///   opened; later writes do not affect it.
/// - **Fault injection**: streams can be made to fail after a number of
///   documents, and the endpoint can be made unreachable.
///
/// Cloning is cheap; clones share the same stores.
#[derive(Clone)]
pub struct InMemoryBackend {
    inner: Arc<InMemoryBackendInner>,
}

impl InMemoryBackend {
    pub fn new(config: InMemoryConfig) -> InMemoryBackend {
        InMemoryBackend {
            inner: Arc::new(InMemoryBackendInner::new(config)),
        }
    }

    pub fn builder() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder::new()
    }

    pub fn config(&self) -> &InMemoryConfig {
        &self.inner.config
    }

    /// Creates an empty store at `path`. Existing stores are left untouched.
    pub fn create_store(&self, path: &str) {
        self.inner.create_store(path)
    }

    pub fn has_store(&self, path: &str) -> bool {
        self.inner.stores.contains_key(path)
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Number of cursors opened by `find` and not yet released.
    pub fn open_cursors(&self) -> usize {
        self.inner.open_cursors.load(Ordering::Acquire)
    }

    /// Number of buffered writes of `path` not yet flushed.
    pub fn pending_writes(&self, path: &str) -> usize {
        self.inner
            .stores
            .get(path)
            .map(|store| store.pending.len())
            .unwrap_or(0)
    }

    /// Number of flushed documents of `path`.
    pub fn flushed_documents(&self, path: &str) -> usize {
        self.inner
            .stores
            .get(path)
            .map(|store| store.flushed.len())
            .unwrap_or(0)
    }

    /// Changes the stream fault injection at runtime. `None` disables it.
    pub fn set_fail_after(&self, documents: Option<usize>) {
        self.inner.fail_after.write_with(|it| *it = documents);
    }
}

impl StoreBackendProvider for InMemoryBackend {
    fn driver_name(&self) -> &str {
        self.inner.config.driver_name()
    }

    fn connect(&self, endpoint: &Endpoint) -> OjaiResult<()> {
        self.inner.connect(endpoint)
    }

    fn disconnect(&self) -> OjaiResult<()> {
        self.inner.disconnect()
    }

    fn store_exists(&self, path: &str) -> OjaiResult<bool> {
        self.inner.check_connected()?;
        Ok(self.inner.stores.contains_key(path))
    }

    fn upsert(&self, path: &str, document: &Document) -> OjaiResult<()> {
        self.inner.upsert(path, document)
    }

    fn flush(&self, path: &str) -> OjaiResult<()> {
        self.inner.flush(path)
    }

    fn find(&self, path: &str, query: &Query) -> OjaiResult<Box<dyn CursorProvider>> {
        self.inner.find(path, query)
    }

    fn find_by_id(&self, path: &str, id: &str) -> OjaiResult<Option<Document>> {
        self.inner.find_by_id(path, id)
    }
}

#[derive(Default)]
struct MemoryStore {
    flushed: OrdMap<String, Document>,
    pending: IndexMap<String, Document>,
}

impl MemoryStore {
    fn merge_pending(&mut self) -> usize {
        let count = self.pending.len();
        for (id, document) in self.pending.drain(..) {
            self.flushed.insert(id, document);
        }
        count
    }

    fn snapshot(&self) -> OrdMap<String, Document> {
        let mut snapshot = self.flushed.clone();
        for (id, document) in self.pending.iter() {
            snapshot.insert(id.clone(), document.clone());
        }
        snapshot
    }
}

struct InMemoryBackendInner {
    config: InMemoryConfig,
    connected: AtomicBool,
    stores: DashMap<String, MemoryStore>,
    fail_after: Atomic<Option<usize>>,
    open_cursors: Arc<AtomicUsize>,
}

impl InMemoryBackendInner {
    fn new(config: InMemoryConfig) -> InMemoryBackendInner {
        let stores = DashMap::new();
        for path in config.initial_stores() {
            stores.insert(path.clone(), MemoryStore::default());
        }
        let fail_after = atomic(config.fail_after());

        InMemoryBackendInner {
            config,
            connected: AtomicBool::new(false),
            stores,
            fail_after,
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn create_store(&self, path: &str) {
        self.stores.entry(path.to_string()).or_default();
    }

    fn connect(&self, endpoint: &Endpoint) -> OjaiResult<()> {
        if self.config.is_unreachable() {
            log::error!("Endpoint {} is unreachable", endpoint);
            return Err(OjaiError::new(
                &format!("Endpoint {} is unreachable", endpoint),
                ErrorKind::ConnectionError,
            ));
        }

        self.connected.store(true, Ordering::Release);
        log::debug!("In-memory backend connected to {}", endpoint);
        Ok(())
    }

    fn disconnect(&self) -> OjaiResult<()> {
        if self.connected.swap(false, Ordering::AcqRel) {
            log::debug!("In-memory backend disconnected");
        }
        Ok(())
    }

    fn check_connected(&self) -> OjaiResult<()> {
        if !self.connected.load(Ordering::Acquire) {
            log::error!("In-memory backend is not connected");
            return Err(OjaiError::new(
                "In-memory backend is not connected",
                ErrorKind::BackendError,
            ));
        }
        Ok(())
    }

    fn store_not_found(path: &str) -> OjaiError {
        log::error!("Store {} not found", path);
        OjaiError::new(&format!("Store {} not found", path), ErrorKind::StoreNotFound)
    }

    fn upsert(&self, path: &str, document: &Document) -> OjaiResult<()> {
        self.check_connected()?;

        let id = match document.id() {
            Some(id) => id.to_string(),
            None => {
                log::error!("Document without id cannot be written to {}", path);
                return Err(OjaiError::new(
                    &format!("Document without id cannot be written to {}", path),
                    ErrorKind::WriteError,
                ));
            }
        };

        let mut store = self
            .stores
            .get_mut(path)
            .ok_or_else(|| Self::store_not_found(path))?;
        store.pending.insert(id, document.clone());

        if let Some(threshold) = self.config.auto_flush_threshold() {
            if store.pending.len() >= threshold {
                let count = store.merge_pending();
                log::debug!("Auto-flushed {} writes into {}", count, path);
            }
        }
        Ok(())
    }

    fn flush(&self, path: &str) -> OjaiResult<()> {
        self.check_connected()?;

        let mut store = self
            .stores
            .get_mut(path)
            .ok_or_else(|| Self::store_not_found(path))?;
        let count = store.merge_pending();
        log::debug!("Flushed {} writes into {}", count, path);
        Ok(())
    }

    fn find(&self, path: &str, query: &Query) -> OjaiResult<Box<dyn CursorProvider>> {
        self.check_connected()?;

        let snapshot = self
            .stores
            .get(path)
            .map(|store| store.snapshot())
            .ok_or_else(|| Self::store_not_found(path))?;

        let raw: RawStream = Box::new(
            snapshot
                .into_iter()
                .map(|(_, document)| -> OjaiResult<Document> { Ok(document) }),
        );
        let filtered: RawStream = Box::new(FilteredStream::new(raw, query.condition().clone()));
        let projected: RawStream = Box::new(ProjectedStream::new(filtered, query.clone()));

        let fail_after = self.fail_after.read_with(|it| *it);
        Ok(Box::new(InMemoryCursor::new(
            path,
            projected,
            fail_after,
            self.open_cursors.clone(),
        )))
    }

    fn find_by_id(&self, path: &str, id: &str) -> OjaiResult<Option<Document>> {
        self.check_connected()?;

        let store = self
            .stores
            .get(path)
            .ok_or_else(|| Self::store_not_found(path))?;
        let document = store
            .pending
            .get(id)
            .or_else(|| store.flushed.get(id))
            .cloned();
        Ok(document)
    }
}
