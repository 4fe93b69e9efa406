//! # OJAI - Document Store Client
//!
//! A thin client facade for inserting and querying semi-structured documents
//! in a document store. It makes the connection / store / query / stream
//! lifecycle explicit and leaves the wire protocol to a pluggable backend.
//!
//! ## Key Features
//!
//! - **Explicit lifecycle**: connections, stores and streams are opened and
//!   closed explicitly; use after close fails with `ClosedResource`
//! - **Idempotent upsert**: documents are written by id, the last write wins
//! - **Fluent builders**: documents, conditions and queries are built once
//!   and immutable afterwards
//! - **Lazy streams**: results are fetched on demand, and exhaustion is
//!   distinguishable from failure
//! - **Injected backends**: the caller picks the backend when opening a
//!   connection; an in-memory backend is bundled
//!
//! ## Quick Start
//!
//! ```rust
//! use ojai::condition::Op;
//! use ojai::connection::Connection;
//! use ojai::store::memory::InMemoryBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = InMemoryBackend::builder().with_store("/apps/user").build();
//! let connection = Connection::open("ojai:mem:", backend)?;
//! let mut store = connection.get_store("/apps/user")?;
//!
//! let user = connection
//!     .new_document()?
//!     .set_id("fdoe-1")
//!     .set("name", "fredDoe")
//!     .set("support", "gold")
//!     .build()?;
//! store.insert_or_replace(&user)?;
//! store.flush()?;
//!
//! let gold = connection.new_condition()?.is("support", Op::Equal, "gold").build()?;
//! let query = connection.new_query()?.select(["name", "support"]).where_condition(gold).build()?;
//!
//! for document in store.find_query(&query)? {
//!     println!("{}", document?);
//! }
//!
//! store.close()?;
//! connection.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`connection`] - Connections and endpoint parsing
//! - [`connection_builder`] - Connection builder
//! - [`connection_config`] - Connection configuration
//! - [`store`] - Store handles, the backend seam and the in-memory backend
//! - [`document`] - Documents and document builders
//! - [`condition`] - Filter conditions
//! - [`query`] - Query descriptors
//! - [`stream`] - Result streams
//! - [`common`] - Values, field paths and shared helpers
//! - [`errors`] - Error types and result definitions

pub mod common;
pub mod condition;
pub mod connection;
pub mod connection_builder;
pub mod connection_config;
pub mod document;
pub mod errors;
pub mod query;
pub mod store;
pub mod stream;
