use crate::connection::Endpoint;
use crate::document::Document;
use crate::errors::OjaiResult;
use crate::query::Query;
use std::ops::Deref;
use std::sync::Arc;

/// Contract every document store backend implements.
///
/// A backend owns the session to the underlying store. The client facade
/// calls [connect](Self::connect) once when a connection opens and
/// [disconnect](Self::disconnect) once when it closes; every other call
/// happens in between.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`: a connection and all the stores
/// derived from it share one backend.
pub trait StoreBackendProvider: Send + Sync {
    /// Driver name matched against the `ojai:<driver>:` endpoint prefix.
    fn driver_name(&self) -> &str;

    /// Establishes the session.
    ///
    /// # Errors
    /// `ConnectionError` if the endpoint is unreachable or rejects the session.
    fn connect(&self, endpoint: &Endpoint) -> OjaiResult<()>;

    /// Terminates the session and releases every backend resource.
    fn disconnect(&self) -> OjaiResult<()>;

    fn store_exists(&self, path: &str) -> OjaiResult<bool>;

    /// Inserts `document`, or replaces the document with the same id.
    /// The document always carries an id.
    fn upsert(&self, path: &str, document: &Document) -> OjaiResult<()>;

    /// Makes every buffered write to `path` durable before returning.
    fn flush(&self, path: &str) -> OjaiResult<()>;

    /// Opens a cursor over the documents of `path` matching `query`, with
    /// the query projection applied.
    fn find(&self, path: &str, query: &Query) -> OjaiResult<Box<dyn CursorProvider>>;

    fn find_by_id(&self, path: &str, id: &str) -> OjaiResult<Option<Document>>;
}

/// A server-side cursor opened by [StoreBackendProvider::find].
pub trait CursorProvider: Send {
    /// Returns the next document, or `Ok(None)` once the cursor is exhausted.
    fn next_document(&mut self) -> OjaiResult<Option<Document>>;

    /// Releases the cursor. Calling it more than once is harmless.
    fn release(&mut self) -> OjaiResult<()>;
}

/// Shared handle to a [StoreBackendProvider].
#[derive(Clone)]
pub struct StoreBackend {
    inner: Arc<dyn StoreBackendProvider>,
}

impl StoreBackend {
    pub fn new<T: StoreBackendProvider + 'static>(inner: T) -> Self {
        StoreBackend {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreBackend {
    type Target = Arc<dyn StoreBackendProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBackend")
            .field("driver", &self.inner.driver_name())
            .finish()
    }
}
