use std::{fmt, io};

/// What the parser was looking for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expecting {
  Key,
  Value,
}

impl fmt::Display for Expecting {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Key => f.write_str("key"),
      Self::Value => f.write_str("value"),
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("unexpected end of input at offset {offset}: unterminated string")]
  UnterminatedString { offset: usize },

  #[error("unexpected character {found:?} at offset {offset} when expecting {expecting}")]
  UnexpectedCharacter {
    found: char,
    expecting: Expecting,
    offset: usize,
  },

  #[error("unexpected end of input when expecting {expecting}")]
  UnexpectedEnd { expecting: Expecting },

  #[error("blocks nested deeper than {limit} levels at offset {offset}")]
  TooDeep { limit: usize, offset: usize },

  #[error("invalid syntax at offset {offset}")]
  InvalidSyntax { offset: usize },

  #[error("node is a value, not a container; cannot access key {key:?}")]
  NotAContainer { key: String },

  #[error(transparent)]
  Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
