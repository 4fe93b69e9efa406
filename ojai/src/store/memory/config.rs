use crate::common::IN_MEMORY_DRIVER;
use crate::store::memory::InMemoryBackend;
use std::sync::Arc;

/// Configuration of an [InMemoryBackend].
///
/// Cloning is cheap; clones share the same settings.
#[derive(Clone)]
pub struct InMemoryConfig {
    inner: Arc<InMemoryConfigInner>,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        InMemoryConfig::new()
    }
}

impl InMemoryConfig {
    pub fn new() -> InMemoryConfig {
        InMemoryConfig {
            inner: Arc::new(InMemoryConfigInner::default()),
        }
    }

    /// Driver name the endpoint must select. Defaults to `mem`.
    pub fn driver_name(&self) -> &str {
        &self.inner.driver_name
    }

    /// Store paths that exist as soon as the backend is built.
    pub fn initial_stores(&self) -> &[String] {
        &self.inner.initial_stores
    }

    /// When `true`, every connection attempt is refused.
    pub fn is_unreachable(&self) -> bool {
        self.inner.unreachable
    }

    /// Number of buffered writes per store that triggers an implicit flush.
    pub fn auto_flush_threshold(&self) -> Option<usize> {
        self.inner.auto_flush_threshold
    }

    /// Streams fail after producing this many documents.
    pub fn fail_after(&self) -> Option<usize> {
        self.inner.fail_after
    }
}

struct InMemoryConfigInner {
    driver_name: String,
    initial_stores: Vec<String>,
    unreachable: bool,
    auto_flush_threshold: Option<usize>,
    fail_after: Option<usize>,
}

impl Default for InMemoryConfigInner {
    fn default() -> Self {
        InMemoryConfigInner {
            driver_name: IN_MEMORY_DRIVER.to_string(),
            initial_stores: Vec::new(),
            unreachable: false,
            auto_flush_threshold: None,
            fail_after: None,
        }
    }
}

/// Builder for [InMemoryBackend].
///
/// ```rust
/// use ojai::store::memory::InMemoryBackend;
///
/// let backend = InMemoryBackend::builder()
///     .with_store("/apps/user")
///     .auto_flush_threshold(100)
///     .build();
/// assert!(backend.has_store("/apps/user"));
/// ```
#[derive(Default)]
pub struct InMemoryBackendBuilder {
    inner: InMemoryConfigInner,
}

impl InMemoryBackendBuilder {
    pub fn new() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder::default()
    }

    /// Creates the store `path` up front.
    pub fn with_store(mut self, path: &str) -> Self {
        if !self.inner.initial_stores.iter().any(|p| p == path) {
            self.inner.initial_stores.push(path.to_string());
        }
        self
    }

    pub fn driver_name(mut self, driver_name: &str) -> Self {
        self.inner.driver_name = driver_name.to_string();
        self
    }

    /// Simulates an endpoint that refuses every connection.
    pub fn unreachable(mut self, unreachable: bool) -> Self {
        self.inner.unreachable = unreachable;
        self
    }

    pub fn auto_flush_threshold(mut self, threshold: usize) -> Self {
        self.inner.auto_flush_threshold = Some(threshold);
        self
    }

    /// Makes every stream fail with a backend error once it has produced
    /// `documents` documents.
    pub fn fail_after(mut self, documents: usize) -> Self {
        self.inner.fail_after = Some(documents);
        self
    }

    pub fn build(self) -> InMemoryBackend {
        InMemoryBackend::new(InMemoryConfig {
            inner: Arc::new(self.inner),
        })
    }
}
