use crate::document::Document;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use crate::store::CursorProvider;
use crate::stream::RawStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cursor over a store snapshot of the [InMemoryBackend](crate::store::memory::InMemoryBackend).
pub struct InMemoryCursor {
    path: String,
    stream: Option<RawStream>,
    produced: usize,
    fail_after: Option<usize>,
    open_cursors: Arc<AtomicUsize>,
}

impl InMemoryCursor {
    pub(crate) fn new(
        path: &str,
        stream: RawStream,
        fail_after: Option<usize>,
        open_cursors: Arc<AtomicUsize>,
    ) -> InMemoryCursor {
        open_cursors.fetch_add(1, Ordering::AcqRel);
        InMemoryCursor {
            path: path.to_string(),
            stream: Some(stream),
            produced: 0,
            fail_after,
            open_cursors,
        }
    }
}

impl CursorProvider for InMemoryCursor {
    fn next_document(&mut self) -> OjaiResult<Option<Document>> {
        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => {
                log::error!("Cursor on {} is released", self.path);
                return Err(OjaiError::new(
                    &format!("Cursor on {} is released", self.path),
                    ErrorKind::ClosedResource,
                ));
            }
        };

        if self.fail_after == Some(self.produced) {
            log::error!(
                "Injected failure on {} after {} documents",
                self.path,
                self.produced
            );
            return Err(OjaiError::new(
                &format!(
                    "Injected failure on {} after {} documents",
                    self.path, self.produced
                ),
                ErrorKind::BackendError,
            ));
        }

        match stream.next() {
            Some(Ok(document)) => {
                self.produced += 1;
                Ok(Some(document))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn release(&mut self) -> OjaiResult<()> {
        if self.stream.take().is_some() {
            self.open_cursors.fetch_sub(1, Ordering::AcqRel);
            log::debug!("Released cursor on {} after {} documents", self.path, self.produced);
        }
        Ok(())
    }
}

impl Drop for InMemoryCursor {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Failed to release cursor on {}: {}", self.path, e);
        }
    }
}
