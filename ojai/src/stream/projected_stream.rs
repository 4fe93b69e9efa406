use crate::document::Document;
use crate::errors::OjaiResult;
use crate::query::Query;
use crate::stream::RawStream;

/// Applies the projection of a [Query] to every document of the underlying
/// stream.
pub(crate) struct ProjectedStream {
    raw_stream: RawStream,
    query: Query,
}

impl ProjectedStream {
    pub fn new(raw_stream: RawStream, query: Query) -> Self {
        ProjectedStream { raw_stream, query }
    }
}

impl Iterator for ProjectedStream {
    type Item = OjaiResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.raw_stream
            .next()
            .map(|result| result.map(|doc| self.query.project(&doc)))
    }
}
