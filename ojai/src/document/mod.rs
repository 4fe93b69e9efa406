mod builder;
#[allow(clippy::module_inception)]
mod document;

pub use builder::*;
pub use document::*;
