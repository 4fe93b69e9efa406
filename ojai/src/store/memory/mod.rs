mod backend;
mod config;
mod cursor;

pub use backend::*;
pub use config::*;
pub use cursor::*;
