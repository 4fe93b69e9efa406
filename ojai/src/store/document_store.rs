use crate::common::CloseFlag;
use crate::connection_config::ConnectionConfig;
use crate::document::Document;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use crate::query::Query;
use crate::store::StoreBackend;
use crate::stream::{DocumentStream, FindOptions};
use std::cell::Cell;
use std::marker::PhantomData;

/// Handle to one named document collection reachable through a
/// [Connection](crate::connection::Connection).
///
/// A store handle references the connection's backend session but never
/// owns it: closing the store releases only the store's own resources and
/// closing the connection invalidates every store derived from it.
///
/// ## Thread Safety
///
/// `DocumentStore` is `Send` but not `Sync`. A handle can be
/// moved to another thread, but concurrent insert / flush / query calls on
/// the same handle are not supported; each thread obtains its own handle
/// with [Connection::get_store](crate::connection::Connection::get_store).
///
/// ```rust
/// use ojai::connection::Connection;
/// use ojai::store::memory::InMemoryBackend;
/// use ojai::doc;
///
/// let backend = InMemoryBackend::builder().with_store("/apps/user").build();
/// let connection = Connection::open("ojai:mem:", backend).unwrap();
/// let mut store = connection.get_store("/apps/user").unwrap();
///
/// store.insert_or_replace(&doc! { _id: "u1", name: "fredDoe" }).unwrap();
/// store.flush().unwrap();
/// assert_eq!(store.find_by_id("u1").unwrap().unwrap().get_string("name"), Some("fredDoe".to_string()));
///
/// store.close().unwrap();
/// connection.close().unwrap();
/// ```
pub struct DocumentStore {
    path: String,
    backend: StoreBackend,
    config: ConnectionConfig,
    connection_flag: CloseFlag,
    closed: CloseFlag,
    _not_sync: PhantomData<Cell<()>>,
}

impl DocumentStore {
    pub(crate) fn new(
        path: &str,
        backend: StoreBackend,
        config: ConnectionConfig,
        connection_flag: CloseFlag,
    ) -> DocumentStore {
        DocumentStore {
            path: path.to_string(),
            backend,
            config,
            connection_flag,
            closed: CloseFlag::new(),
            _not_sync: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Inserts `document`, or replaces the stored document with the same id.
    ///
    /// Upserting the same document twice leaves exactly one document with
    /// that id; the last write wins. Durability is only guaranteed after
    /// [flush](Self::flush).
    ///
    /// # Errors
    ///
    /// - [ErrorKind::WriteError] if the document has no id or the backend
    ///   rejected the write.
    /// - [ErrorKind::ClosedResource] if the store or its connection is closed.
    pub fn insert_or_replace(&mut self, document: &Document) -> OjaiResult<()> {
        self.check_open()?;

        if !document.has_id() {
            log::error!("Cannot insert a document without id into {}", self.path);
            return Err(OjaiError::new(
                &format!("Cannot insert a document without id into {}", self.path),
                ErrorKind::WriteError,
            ));
        }

        self.backend.upsert(&self.path, document).map_err(|e| {
            if e.kind() == &ErrorKind::WriteError {
                e
            } else {
                log::error!("Failed to write document into {}: {}", self.path, e);
                OjaiError::new_with_cause(
                    &format!("Failed to write document into {}", self.path),
                    ErrorKind::WriteError,
                    e,
                )
            }
        })
    }

    /// Upserts every document in order and stops at the first failure.
    /// Returns the number of documents written.
    pub fn insert_or_replace_all<'a, I>(&mut self, documents: I) -> OjaiResult<usize>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut written = 0;
        for document in documents {
            self.insert_or_replace(document)?;
            written += 1;
        }
        Ok(written)
    }

    /// Looks up a single document by id.
    pub fn find_by_id(&self, id: &str) -> OjaiResult<Option<Document>> {
        self.check_open()?;
        self.backend.find_by_id(&self.path, id)
    }

    /// Blocks until every buffered write of this store is durable.
    pub fn flush(&mut self) -> OjaiResult<()> {
        self.check_open()?;
        log::debug!("Flushing store {}", self.path);
        self.backend.flush(&self.path)
    }

    /// Executes `query` and returns a lazy stream over the results.
    ///
    /// Nothing is read from the backend until the stream is pulled. The
    /// connection's default timeout, if any, bounds the stream.
    pub fn find_query(&self, query: &Query) -> OjaiResult<DocumentStream> {
        self.open_stream(query, self.config.default_timeout())
    }

    /// Executes `query` with per-call options.
    pub fn find_query_with_options(
        &self,
        query: &Query,
        options: &FindOptions,
    ) -> OjaiResult<DocumentStream> {
        let timeout = options.timeout.or_else(|| self.config.default_timeout());
        self.open_stream(query, timeout)
    }

    /// Streams every document of the store.
    pub fn find(&self) -> OjaiResult<DocumentStream> {
        self.find_query(&Query::all())
    }

    /// Closes the handle. Closing twice is harmless; the connection stays open.
    pub fn close(&mut self) -> OjaiResult<()> {
        if self.closed.close() {
            log::debug!("Closed store {}", self.path);
        }
        Ok(())
    }

    /// Returns `true` if this handle or its connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_closed() || self.connection_flag.is_closed()
    }

    fn open_stream(
        &self,
        query: &Query,
        timeout: Option<std::time::Duration>,
    ) -> OjaiResult<DocumentStream> {
        self.check_open()?;
        log::debug!("Executing '{}' on {}", query, self.path);
        Ok(DocumentStream::new(
            &self.path,
            query.clone(),
            self.backend.clone(),
            timeout,
            self.connection_flag.clone(),
            self.closed.clone(),
        ))
    }

    fn check_open(&self) -> OjaiResult<()> {
        self.connection_flag.check_open("Connection")?;
        self.closed.check_open(&format!("Store {}", self.path))
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}
