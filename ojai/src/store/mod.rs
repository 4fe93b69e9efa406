//! Store handles and the backend seam.
//!
//! [DocumentStore] is the handle applications use. Everything below it goes
//! through a [StoreBackendProvider], chosen by the caller when the
//! connection is opened; [memory::InMemoryBackend] is the bundled backend.

mod document_store;
pub mod memory;
mod store_backend;

pub use document_store::*;
pub use store_backend::*;
