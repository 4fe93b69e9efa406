//! Configuration of a client connection.

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::connection::Endpoint;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Endpoint option holding the default stream timeout in milliseconds.
pub const TIMEOUT_OPTION: &str = "timeout";

/// Settings of a [Connection](crate::connection::Connection).
///
/// A configuration is assembled by a
/// [ConnectionBuilder](crate::connection_builder::ConnectionBuilder) and
/// frozen when the connection opens; setters fail afterwards. Cloning is
/// cheap and clones share the same settings.
#[derive(Clone)]
pub struct ConnectionConfig {
    inner: Arc<ConnectionConfigInner>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        ConnectionConfig {
            inner: Arc::new(ConnectionConfigInner::new()),
        }
    }

    /// The endpoint the connection was opened with, once it is open.
    pub fn endpoint(&self) -> Option<Endpoint> {
        self.inner.endpoint.get().cloned()
    }

    /// Timeout applied to streams whose `find` call does not set one.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.inner.default_timeout.read_with(|it| *it)
    }

    pub fn set_default_timeout(&self, timeout: Duration) -> OjaiResult<()> {
        self.inner.set_default_timeout(timeout)
    }

    pub fn option(&self, key: &str) -> Option<String> {
        self.inner.options.get(key).map(|it| it.value().clone())
    }

    /// All connection options, sorted by key.
    pub fn options(&self) -> BTreeMap<String, String> {
        self.inner
            .options
            .iter()
            .map(|it| (it.key().clone(), it.value().clone()))
            .collect()
    }

    pub fn set_option(&self, key: &str, value: &str) -> OjaiResult<()> {
        self.inner.set_option(key, value)
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    pub(crate) fn initialize(&self, endpoint: Endpoint) -> OjaiResult<()> {
        self.inner.initialize(endpoint)
    }
}

struct ConnectionConfigInner {
    configured: AtomicBool,
    endpoint: OnceLock<Endpoint>,
    default_timeout: Atomic<Option<Duration>>,
    options: DashMap<String, String>,
}

impl ConnectionConfigInner {
    fn new() -> Self {
        ConnectionConfigInner {
            configured: AtomicBool::from(false),
            endpoint: OnceLock::new(),
            default_timeout: atomic(None),
            options: DashMap::new(),
        }
    }

    fn check_not_configured(&self, what: &str) -> OjaiResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after the connection is opened", what);
            return Err(OjaiError::new(
                &format!("{} cannot be changed after the connection is opened", what),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn set_default_timeout(&self, timeout: Duration) -> OjaiResult<()> {
        self.check_not_configured("Default timeout")?;

        if timeout.is_zero() {
            log::error!("Default timeout must be greater than zero");
            return Err(OjaiError::new(
                "Default timeout must be greater than zero",
                ErrorKind::InvalidOperation,
            ));
        }

        self.default_timeout.write_with(|it| *it = Some(timeout));
        Ok(())
    }

    fn set_option(&self, key: &str, value: &str) -> OjaiResult<()> {
        self.check_not_configured("Connection options")?;

        if key.is_empty() {
            log::error!("Connection option name cannot be empty");
            return Err(OjaiError::new(
                "Connection option name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        self.options.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn initialize(&self, endpoint: Endpoint) -> OjaiResult<()> {
        self.check_not_configured("Endpoint")?;

        // explicit options win over endpoint options
        for (key, value) in endpoint.options() {
            self.options
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        let has_timeout = self.default_timeout.read_with(|it| it.is_some());
        if !has_timeout {
            if let Some(value) = self.options.get(TIMEOUT_OPTION).map(|it| it.value().clone()) {
                let millis = value.parse::<u64>().ok().filter(|m| *m > 0).ok_or_else(|| {
                    log::error!("Invalid {} option '{}' on {}", TIMEOUT_OPTION, value, endpoint);
                    OjaiError::new(
                        &format!("Invalid {} option '{}' on {}", TIMEOUT_OPTION, value, endpoint),
                        ErrorKind::InvalidEndpoint,
                    )
                })?;
                self.default_timeout
                    .write_with(|it| *it = Some(Duration::from_millis(millis)));
            }
        }

        if self.endpoint.set(endpoint).is_err() {
            log::error!("Connection config is already initialized");
            return Err(OjaiError::new(
                "Connection config is already initialized",
                ErrorKind::InvalidOperation,
            ));
        }

        self.configured.store(true, Ordering::Relaxed);
        Ok(())
    }
}
