use crate::connection::Connection;
use crate::connection_config::ConnectionConfig;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use crate::store::{StoreBackend, StoreBackendProvider};
use std::time::Duration;

/// Builder for [Connection].
///
/// The backend is injected by the caller; there is no global driver
/// registry. Configuration errors are captured and returned from
/// [open](Self::open), so the chain never breaks midway.
///
/// ```rust
/// use ojai::connection::Connection;
/// use ojai::store::memory::InMemoryBackend;
/// use std::time::Duration;
///
/// let connection = Connection::builder()
///     .backend(InMemoryBackend::builder().with_store("/apps/user").build())
///     .default_timeout(Duration::from_secs(30))
///     .option("auth", "basic")
///     .open("ojai:mem:")
///     .unwrap();
/// assert_eq!(connection.config().option("auth"), Some("basic".to_string()));
/// connection.close().unwrap();
/// ```
pub struct ConnectionBuilder {
    config: ConnectionConfig,
    backend: Option<StoreBackend>,
    error: Option<OjaiError>,
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionBuilder {
    pub fn new() -> Self {
        ConnectionBuilder {
            config: ConnectionConfig::new(),
            backend: None,
            error: None,
        }
    }

    /// Sets the backend the connection talks to. A later call replaces an
    /// earlier one.
    pub fn backend<T: StoreBackendProvider + 'static>(mut self, backend: T) -> Self {
        self.backend = Some(StoreBackend::new(backend));
        self
    }

    /// Sets an already shared backend handle.
    pub fn store_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Bounds every stream of the connection that does not set its own timeout.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_default_timeout(timeout) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Adds a connection option. Options set here take precedence over
    /// options of the endpoint URL.
    pub fn option(mut self, key: &str, value: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_option(key, value) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the connection to `endpoint`.
    ///
    /// # Errors
    ///
    /// - The first error captured during configuration.
    /// - [ErrorKind::ConnectionError] if no backend was set, the endpoint
    ///   selects another driver, or the backend refused the session.
    /// - [ErrorKind::InvalidEndpoint] if the endpoint is malformed.
    pub fn open(self, endpoint: &str) -> OjaiResult<Connection> {
        if let Some(error) = self.error {
            return Err(error);
        }

        match self.backend {
            Some(backend) => Connection::connect(endpoint, backend, self.config),
            None => {
                log::error!("No store backend is configured for {}", endpoint);
                Err(OjaiError::new(
                    &format!("No store backend is configured for {}", endpoint),
                    ErrorKind::ConnectionError,
                ))
            }
        }
    }
}
