mod builder;
#[allow(clippy::module_inception)]
mod condition;

pub use builder::*;
pub use condition::*;
