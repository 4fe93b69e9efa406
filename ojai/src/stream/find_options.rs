use std::time::Duration;

/// Options for a single `find_query` execution.
///
/// # Examples
///
/// ```rust
/// use ojai::stream::{timeout_after, FindOptions};
/// use std::time::Duration;
///
/// let options = FindOptions::new().timeout(Duration::from_secs(5));
/// assert_eq!(options.get_timeout(), Some(Duration::from_secs(5)));
/// assert_eq!(timeout_after(Duration::from_millis(10)).get_timeout(), Some(Duration::from_millis(10)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub(crate) timeout: Option<Duration>,
}

/// Creates `FindOptions` with a stream deadline `timeout` from now.
pub fn timeout_after(timeout: Duration) -> FindOptions {
    FindOptions::new().timeout(timeout)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Bounds how long the resulting stream may stay open. Once the deadline
    /// passes, the next pull fails and the cursor is released.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
