use crate::condition::Condition;
use crate::document::Document;
use crate::errors::OjaiResult;

pub(crate) type RawStream = Box<dyn Iterator<Item = OjaiResult<Document>> + Send>;

/// Yields the documents of `raw_stream` that satisfy `condition`. Errors
/// pass through untouched.
pub(crate) struct FilteredStream {
    raw_stream: RawStream,
    condition: Condition,
}

impl FilteredStream {
    pub fn new(raw_stream: RawStream, condition: Condition) -> Self {
        FilteredStream {
            raw_stream,
            condition,
        }
    }
}

impl Iterator for FilteredStream {
    type Item = OjaiResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.raw_stream.next() {
                Some(Ok(doc)) => {
                    if self.condition.is_empty() || self.condition.evaluate(&doc) {
                        return Some(Ok(doc));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => return None,
            }
        }
    }
}
