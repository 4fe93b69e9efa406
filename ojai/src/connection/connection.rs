use crate::common::CloseFlag;
use crate::condition::ConditionBuilder;
use crate::connection::Endpoint;
use crate::connection_builder::ConnectionBuilder;
use crate::connection_config::ConnectionConfig;
use crate::document::{Document, DocumentBuilder};
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use crate::query::QueryBuilder;
use crate::store::{DocumentStore, StoreBackend, StoreBackendProvider};
use std::sync::Arc;

/// A live session to one store endpoint.
///
/// The connection owns the backend session. It is the factory for
/// [DocumentStore] handles and for document, condition and query builders.
///
/// ## Lifecycle
///
/// - Opened explicitly with [Connection::open] or [Connection::builder].
/// - Closed explicitly with [Connection::close]; closing is idempotent.
///   Dropping the last clone closes it as well.
/// - After close, every factory method and every store or stream derived
///   from the connection fails with [ErrorKind::ClosedResource].
///
/// ## Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone; clones share the same
/// session. Share it freely for factory calls, but give each thread its own
/// [DocumentStore] handle.
///
/// # Examples
///
/// ```rust
/// use ojai::condition::Op;
/// use ojai::connection::Connection;
/// use ojai::store::memory::InMemoryBackend;
///
/// let backend = InMemoryBackend::builder().with_store("/apps/user").build();
/// let connection = Connection::open("ojai:mem:", backend).unwrap();
///
/// let mut store = connection.get_store("/apps/user").unwrap();
/// let user = connection
///     .new_document().unwrap()
///     .set_id("fdoe-1")
///     .set("name", "fredDoe")
///     .set("support", "gold")
///     .build()
///     .unwrap();
/// store.insert_or_replace(&user).unwrap();
/// store.flush().unwrap();
///
/// let gold = connection.new_condition().unwrap()
///     .is("support", Op::Equal, "gold")
///     .build()
///     .unwrap();
/// let query = connection.new_query().unwrap()
///     .select(["name"])
///     .where_condition(gold)
///     .build()
///     .unwrap();
///
/// let found: Vec<_> = store.find_query(&query).unwrap().collect::<Result<_, _>>().unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].as_json_string(), r#"{"_id":"fdoe-1","name":"fredDoe"}"#);
///
/// store.close().unwrap();
/// connection.close().unwrap();
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// Opens a connection to `endpoint` through `backend` with default
    /// configuration.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::InvalidEndpoint] if the endpoint is malformed.
    /// - [ErrorKind::ConnectionError] if the endpoint selects another driver
    ///   or the backend refused the session.
    pub fn open<T: StoreBackendProvider + 'static>(endpoint: &str, backend: T) -> OjaiResult<Connection> {
        Connection::builder().backend(backend).open(endpoint)
    }

    pub(crate) fn connect(
        endpoint: &str,
        backend: StoreBackend,
        config: ConnectionConfig,
    ) -> OjaiResult<Connection> {
        let endpoint = Endpoint::parse(endpoint)?;

        if endpoint.driver() != backend.driver_name() {
            log::error!(
                "Endpoint {} selects driver '{}' but the backend is '{}'",
                endpoint,
                endpoint.driver(),
                backend.driver_name()
            );
            return Err(OjaiError::new(
                &format!(
                    "Endpoint {} selects driver '{}' but the backend is '{}'",
                    endpoint,
                    endpoint.driver(),
                    backend.driver_name()
                ),
                ErrorKind::ConnectionError,
            ));
        }

        backend.connect(&endpoint).map_err(|e| {
            if e.kind() == &ErrorKind::ConnectionError {
                e
            } else {
                log::error!("Failed to connect to {}: {}", endpoint, e);
                OjaiError::new_with_cause(
                    &format!("Failed to connect to {}", endpoint),
                    ErrorKind::ConnectionError,
                    e,
                )
            }
        })?;

        if let Err(e) = config.initialize(endpoint.clone()) {
            if let Err(disconnect_error) = backend.disconnect() {
                log::warn!("Failed to disconnect from {}: {}", endpoint, disconnect_error);
            }
            return Err(e);
        }

        log::debug!("Connected to {}", endpoint);
        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                endpoint,
                config,
                backend,
                closed: CloseFlag::new(),
            }),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn driver_name(&self) -> &str {
        self.inner.backend.driver_name()
    }

    /// Starts a new document.
    pub fn new_document(&self) -> OjaiResult<DocumentBuilder> {
        self.check_open()?;
        Ok(DocumentBuilder::new())
    }

    /// Parses a JSON object into a document.
    pub fn new_document_from_json(&self, json: &str) -> OjaiResult<Document> {
        self.check_open()?;
        Document::from_json(json)
    }

    pub fn new_condition(&self) -> OjaiResult<ConditionBuilder> {
        self.check_open()?;
        Ok(ConditionBuilder::new())
    }

    pub fn new_query(&self) -> OjaiResult<QueryBuilder> {
        self.check_open()?;
        Ok(QueryBuilder::new())
    }

    pub fn store_exists(&self, path: &str) -> OjaiResult<bool> {
        self.check_open()?;
        self.inner.backend.store_exists(path)
    }

    /// Returns a new handle to the store at `path`.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::StoreNotFound] if no such store exists.
    /// - [ErrorKind::ClosedResource] if the connection is closed.
    pub fn get_store(&self, path: &str) -> OjaiResult<DocumentStore> {
        self.check_open()?;

        if path.is_empty() || !self.inner.backend.store_exists(path)? {
            log::error!("Store '{}' not found on {}", path, self.inner.endpoint);
            return Err(OjaiError::new(
                &format!("Store '{}' not found on {}", path, self.inner.endpoint),
                ErrorKind::StoreNotFound,
            ));
        }

        log::debug!("Opened store {} on {}", path, self.inner.endpoint);
        Ok(DocumentStore::new(
            path,
            self.inner.backend.clone(),
            self.inner.config.clone(),
            self.inner.closed.clone(),
        ))
    }

    /// Closes the connection and terminates the backend session.
    ///
    /// Every store and stream derived from this connection becomes unusable.
    /// Closing an already closed connection does nothing.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the session could not be terminated
    /// cleanly. The connection is closed regardless.
    pub fn close(&self) -> OjaiResult<()> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_closed()
    }

    fn check_open(&self) -> OjaiResult<()> {
        self.inner.closed.check_open("Connection")
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct ConnectionInner {
    endpoint: Endpoint,
    config: ConnectionConfig,
    backend: StoreBackend,
    closed: CloseFlag,
}

impl ConnectionInner {
    fn close(&self) -> OjaiResult<()> {
        if !self.closed.close() {
            return Ok(());
        }

        log::debug!("Closing connection to {}", self.endpoint);
        self.backend.disconnect().map_err(|e| {
            log::error!("Failed to disconnect from {}: {}", self.endpoint, e);
            OjaiError::new_with_cause(
                &format!("Failed to disconnect from {}", self.endpoint),
                ErrorKind::ConnectionError,
                e,
            )
        })
    }
}

impl Drop for ConnectionInner {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close connection to {} during drop: {}", self.endpoint, e);
        }
    }
}
