//! Common types shared by every layer of the client: the dynamically typed
//! [Value], parsed [FieldPath]s, constants and small locking helpers.

mod constants;
mod field_path;
mod value;
pub(crate) mod util;

pub use constants::*;
pub use field_path::*;
pub use util::*;
pub use value::*;
