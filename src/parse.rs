use crate::{
  error::{self, Error, Expecting},
  node::{Children, Node},
};
use nom::{
  branch::alt,
  bytes::complete::{is_not, take_while},
  character::complete::{anychar, char},
  combinator::map,
  error::{ErrorKind, ParseError},
  multi::fold_many0,
  sequence::preceded,
  Err::{Failure, Incomplete},
  IResult,
};
use std::io::Read;

/// Deepest run of nested `{` blocks the parser accepts.
pub const MAX_DEPTH: usize = 32;

/// Parses a document. The root is a container holding every top-level pair,
/// unless `first_value_as_root` is set, in which case the value of the first
/// pair becomes the whole result and the rest of the input is ignored.
///
/// Blocks nested deeper than [`MAX_DEPTH`] fail with [`Error::TooDeep`].
/// Error offsets are byte offsets into `input`.
pub fn parse(input: &str, first_value_as_root: bool) -> error::Result<Node> {
  let result = if first_value_as_root {
    first_value(input)
  } else {
    map(|i| block(i, 0), Node::Container)(input)
  };
  match result {
    Ok((_, node)) => Ok(node),
    Err(nom::Err::Error(e)) | Err(Failure(e)) => Err(e.into_error(input)),
    Err(Incomplete(_)) => panic!("unexpected incomplete error"),
  }
}

/// Reads `reader` to the end and parses it. Invalid UTF-8 sequences are
/// replaced with U+FFFD rather than rejected.
///
/// Error offsets index the decoded text. They match byte positions in the
/// stream only when it is valid UTF-8; each replaced sequence shifts later
/// offsets, since U+FFFD takes three bytes.
pub fn parse_reader<R: Read>(mut reader: R, first_value_as_root: bool) -> error::Result<Node> {
  let mut bytes = Vec::new();
  reader.read_to_end(&mut bytes)?;
  parse(&String::from_utf8_lossy(&bytes), first_value_as_root)
}

#[derive(Debug, PartialEq)]
enum SyntaxErrorKind {
  UnterminatedString,
  UnexpectedCharacter(char, Expecting),
  UnexpectedEnd(Expecting),
  TooDeep,
  Nom,
}

#[derive(Debug, PartialEq)]
struct SyntaxError<'a> {
  input: &'a str,
  kind: SyntaxErrorKind,
}

impl<'a> SyntaxError<'a> {
  fn fail<O>(input: &'a str, kind: SyntaxErrorKind) -> Result<'a, O> {
    Err(Failure(Self { input, kind }))
  }

  fn into_error(self, full: &str) -> Error {
    let offset = full.len() - self.input.len();
    match self.kind {
      SyntaxErrorKind::UnterminatedString => Error::UnterminatedString { offset },
      SyntaxErrorKind::UnexpectedCharacter(found, expecting) => Error::UnexpectedCharacter {
        found,
        expecting,
        offset,
      },
      SyntaxErrorKind::UnexpectedEnd(expecting) => Error::UnexpectedEnd { expecting },
      SyntaxErrorKind::TooDeep => Error::TooDeep {
        limit: MAX_DEPTH,
        offset,
      },
      // The dispatch in `value` and `block` vets every character before a
      // combinator sees it, so this only fires if that stops holding.
      SyntaxErrorKind::Nom => Error::InvalidSyntax { offset },
    }
  }
}

impl<'a> ParseError<&'a str> for SyntaxError<'a> {
  fn from_error_kind(input: &'a str, _: ErrorKind) -> Self {
    Self {
      input,
      kind: SyntaxErrorKind::Nom,
    }
  }

  fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
    other
  }
}

type Result<'a, O> = IResult<&'a str, O, SyntaxError<'a>>;

fn first_value(input: &str) -> Result<Node> {
  let (rest, _) = space(input)?;
  match rest.chars().next() {
    None | Some('}') => Ok((rest, Node::new())),
    Some('"') => map(|i| pair(i, 0), |(_, node): (String, Node)| node)(rest),
    Some(c) => SyntaxError::fail(rest, SyntaxErrorKind::UnexpectedCharacter(c, Expecting::Key)),
  }
}

/// Key/value pairs up to and including the closing `}`, or to the end of input.
/// `depth` counts the blocks already open around this one.
fn block(input: &str, depth: usize) -> Result<Children> {
  let (input, children) = fold_many0(
    |i| pair(i, depth),
    Children::new,
    |mut acc: Children, (key, node): (String, Node)| {
      acc.insert(key, node);
      acc
    },
  )(input)?;
  let (input, _) = space(input)?;
  match input.chars().next() {
    None => Ok((input, children)),
    Some('}') => Ok((&input[1..], children)),
    Some(c) => SyntaxError::fail(input, SyntaxErrorKind::UnexpectedCharacter(c, Expecting::Key)),
  }
}

fn pair(input: &str, depth: usize) -> Result<(String, Node)> {
  let (input, _) = space(input)?;
  let (input, key) = string(input)?;
  let (input, _) = space(input)?;
  let (input, node) = value(input, depth)?;
  Ok((input, (key, node)))
}

fn value(input: &str, depth: usize) -> Result<Node> {
  match input.chars().next() {
    Some('"') => map(string, Node::Leaf)(input),
    Some('{') if depth >= MAX_DEPTH => SyntaxError::fail(input, SyntaxErrorKind::TooDeep),
    Some('{') => map(preceded(char('{'), |i| block(i, depth + 1)), Node::Container)(input),
    Some(c) => SyntaxError::fail(input, SyntaxErrorKind::UnexpectedCharacter(c, Expecting::Value)),
    None => SyntaxError::fail(input, SyntaxErrorKind::UnexpectedEnd(Expecting::Value)),
  }
}

enum Fragment<'a> {
  Literal(&'a str),
  Escaped(char),
}

/// A quoted string with its escapes resolved. Only `\\`, `\"` and `\'` are
/// recognised; any other escaped character is dropped along with its
/// backslash.
fn string(input0: &str) -> Result<String> {
  let (input, _) = char('"')(input0)?;
  let (input, body) = fold_many0(
    alt((
      map(is_not("\\\""), Fragment::Literal),
      map(preceded(char('\\'), anychar), Fragment::Escaped),
    )),
    String::new,
    |mut acc: String, fragment: Fragment| {
      match fragment {
        Fragment::Literal(s) => acc.push_str(s),
        Fragment::Escaped(c @ ('\\' | '"' | '\'')) => acc.push(c),
        Fragment::Escaped(_) => {}
      }
      acc
    },
  )(input)?;
  match input.strip_prefix('"') {
    Some(rest) => Ok((rest, body)),
    None => SyntaxError::fail(input0, SyntaxErrorKind::UnterminatedString),
  }
}

fn space(input: &str) -> Result<&str> {
  take_while(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))(input)
}
