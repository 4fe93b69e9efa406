use crate::common::CloseFlag;
use crate::document::Document;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use crate::query::Query;
use crate::store::{CursorProvider, StoreBackend};
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Lifecycle state of a [DocumentStream].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// More documents may follow.
    Open,
    /// Every matching document has been returned.
    Exhausted,
    /// Iteration stopped on an error before exhaustion.
    Failed,
    /// The stream was closed before exhaustion, by the caller or because
    /// its store or connection was closed.
    Closed,
}

impl Display for StreamState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamState::Open => write!(f, "open"),
            StreamState::Exhausted => write!(f, "exhausted"),
            StreamState::Failed => write!(f, "failed"),
            StreamState::Closed => write!(f, "closed"),
        }
    }
}

/// A lazy, forward-only, single-pass sequence of query results.
///
/// Nothing is fetched from the backend until the first pull. The stream
/// distinguishes normal exhaustion from failure:
///
/// - [try_next](Self::try_next) returns `Ok(None)` once every document has
///   been produced and `Err(_)` if iteration failed.
/// - As an [Iterator], the stream yields `Some(Err(_))` once on the first
///   error and then ends.
///
/// The backend cursor is released on exhaustion, on failure, on
/// [close](Self::close) and on drop, whichever comes first.
///
/// A stream is `Send` but not `Sync`: it may move to another thread, but
/// only one thread can pull from it.
pub struct DocumentStream {
    store_path: String,
    query: Query,
    backend: StoreBackend,
    cursor: Option<Box<dyn CursorProvider>>,
    state: StreamState,
    error_reported: bool,
    deadline: Option<Instant>,
    documents_read: usize,
    connection_flag: CloseFlag,
    store_flag: CloseFlag,
}

impl DocumentStream {
    pub(crate) fn new(
        store_path: &str,
        query: Query,
        backend: StoreBackend,
        timeout: Option<Duration>,
        connection_flag: CloseFlag,
        store_flag: CloseFlag,
    ) -> DocumentStream {
        DocumentStream {
            store_path: store_path.to_string(),
            query,
            backend,
            cursor: None,
            state: StreamState::Open,
            error_reported: false,
            deadline: timeout.and_then(deadline_after),
            documents_read: 0,
            connection_flag,
            store_flag,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of documents produced so far.
    pub fn documents_read(&self) -> usize {
        self.documents_read
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Pulls the next document.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::ClosedResource] if the stream, its store or its
    ///   connection was closed.
    /// - [ErrorKind::Timeout] once the stream deadline has passed.
    /// - [ErrorKind::StreamError] if the backend failed mid-iteration; the
    ///   backend error is kept as the cause.
    /// - Errors raised while opening the backend cursor are returned as is.
    ///
    /// Once a stream has failed, every further call returns an error.
    pub fn try_next(&mut self) -> OjaiResult<Option<Document>> {
        match self.state {
            StreamState::Exhausted => return Ok(None),
            StreamState::Closed => {
                log::error!("Stream over {} is closed", self.store_path);
                return Err(OjaiError::new(
                    &format!("Stream over {} is closed", self.store_path),
                    ErrorKind::ClosedResource,
                ));
            }
            StreamState::Failed => {
                log::error!("Stream over {} has already failed", self.store_path);
                return Err(OjaiError::new(
                    &format!("Stream over {} has already failed", self.store_path),
                    ErrorKind::StreamError,
                ));
            }
            StreamState::Open => {}
        }

        if self.connection_flag.is_closed() || self.store_flag.is_closed() {
            self.finish(StreamState::Closed);
            let resource = if self.connection_flag.is_closed() {
                "Connection"
            } else {
                "Store"
            };
            log::error!("{} of stream over {} is closed", resource, self.store_path);
            return Err(OjaiError::new(
                &format!("{} of stream over {} is closed", resource, self.store_path),
                ErrorKind::ClosedResource,
            ));
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.finish(StreamState::Failed);
                log::error!(
                    "Stream over {} timed out after {} documents",
                    self.store_path,
                    self.documents_read
                );
                return Err(OjaiError::new(
                    &format!(
                        "Stream over {} timed out after {} documents",
                        self.store_path, self.documents_read
                    ),
                    ErrorKind::Timeout,
                ));
            }
        }

        if let Some(limit) = self.query.limit() {
            if self.documents_read >= limit {
                self.finish(StreamState::Exhausted);
                return Ok(None);
            }
        }

        if self.cursor.is_none() {
            log::debug!("Opening cursor on {} for {}", self.store_path, self.query);
            match self.backend.find(&self.store_path, &self.query) {
                Ok(cursor) => self.cursor = Some(cursor),
                Err(e) => {
                    self.finish(StreamState::Failed);
                    return Err(e);
                }
            }
        }

        let next = match self.cursor.as_mut() {
            Some(cursor) => cursor.next_document(),
            None => Ok(None),
        };

        match next {
            Ok(Some(doc)) => {
                self.documents_read += 1;
                Ok(Some(doc))
            }
            Ok(None) => {
                log::debug!(
                    "Stream over {} exhausted after {} documents",
                    self.store_path,
                    self.documents_read
                );
                self.finish(StreamState::Exhausted);
                Ok(None)
            }
            Err(e) => {
                self.finish(StreamState::Failed);
                if e.kind() == &ErrorKind::StreamError {
                    return Err(e);
                }
                log::error!(
                    "Stream over {} failed after {} documents: {}",
                    self.store_path,
                    self.documents_read,
                    e
                );
                Err(OjaiError::new_with_cause(
                    &format!(
                        "Stream over {} failed after {} documents",
                        self.store_path, self.documents_read
                    ),
                    ErrorKind::StreamError,
                    e,
                ))
            }
        }
    }

    /// Closes the stream and releases the backend cursor. Closing an
    /// exhausted, failed or already closed stream is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend error if releasing the cursor failed. The stream
    /// is closed regardless.
    pub fn close(&mut self) -> OjaiResult<()> {
        if self.state == StreamState::Open {
            self.state = StreamState::Closed;
        }
        self.release_cursor()
    }

    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }

    fn finish(&mut self, state: StreamState) {
        self.state = state;
        if let Err(e) = self.release_cursor() {
            log::warn!("Failed to release cursor on {}: {}", self.store_path, e);
        }
    }

    fn release_cursor(&mut self) -> OjaiResult<()> {
        match self.cursor.take() {
            Some(mut cursor) => {
                log::debug!("Releasing cursor on {}", self.store_path);
                cursor.release()
            }
            None => Ok(()),
        }
    }
}

// A timeout too large to represent as an instant means no deadline.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    let deadline = Instant::now().checked_add(timeout);
    if deadline.is_none() {
        log::debug!("Stream timeout {:?} is out of range, no deadline set", timeout);
    }
    deadline
}

impl Iterator for DocumentStream {
    type Item = OjaiResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error_reported {
            return None;
        }

        match self.try_next() {
            Ok(Some(doc)) => Some(Ok(doc)),
            Ok(None) => None,
            Err(e) => {
                self.error_reported = true;
                Some(Err(e))
            }
        }
    }
}

impl Drop for DocumentStream {
    fn drop(&mut self) {
        if let Err(e) = self.release_cursor() {
            log::warn!("Failed to release cursor on {} during drop: {}", self.store_path, e);
        }
    }
}

impl std::fmt::Debug for DocumentStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStream")
            .field("store_path", &self.store_path)
            .field("query", &self.query.to_string())
            .field("state", &self.state)
            .field("documents_read", &self.documents_read)
            .finish()
    }
}
