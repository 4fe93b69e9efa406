// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: char = '.';

// endpoint constants
pub const OJAI_SCHEME: &str = "ojai";
pub const IN_MEMORY_DRIVER: &str = "mem";
pub const OPTION_SEPARATORS: [char; 2] = [';', '&'];
pub const HOST_SEPARATOR: char = ',';
