//! Reader and writer for Valve's KeyValues text format, the nested
//! `"key" "value"` / `"key" { ... }` syntax used by Steam configuration files
//! such as `sharedconfig.vdf`.

pub mod error;
pub mod file;
pub mod format;
pub mod node;
pub mod parse;

pub use error::{Error, Expecting, Result};
pub use node::{Children, Node};
pub use parse::{parse, parse_reader, MAX_DEPTH};
