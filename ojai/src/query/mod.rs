mod builder;
#[allow(clippy::module_inception)]
mod query;

pub use builder::*;
pub use query::*;
