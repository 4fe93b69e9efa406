#[allow(clippy::module_inception)]
mod connection;
mod endpoint;

pub use connection::*;
pub use endpoint::*;
