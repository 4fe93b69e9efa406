mod document_stream;
mod filtered_stream;
mod find_options;
mod projected_stream;

pub use document_stream::*;
pub(crate) use filtered_stream::*;
pub use find_options::*;
pub(crate) use projected_stream::*;
