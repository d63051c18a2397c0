use crate::node::Node::{self, Container, Leaf};
use std::{
  fmt,
  io::{self, Write},
};

impl fmt::Display for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut buf = String::new();
    self.format(&mut buf, 0);
    f.write_str(&buf)
  }
}

impl Node {
  /// Writes the children of this container to `out`, starting at `indent`
  /// tabs. A leaf writes nothing.
  pub fn save<W: Write>(&self, mut out: W, indent: usize) -> io::Result<()> {
    let mut buf = String::new();
    self.format(&mut buf, indent);
    out.write_all(buf.as_bytes())?;
    out.flush()
  }

  /// Pre-order walk over an explicit stack of child iterators, one per open
  /// block, so nesting depth never touches the call stack.
  fn format(&self, buf: &mut String, level: usize) {
    let print_indent = |level: usize, buf: &mut String| (0..level).for_each(|_| buf.push('\t'));

    let children = match self {
      Container(children) => children,
      Leaf(_) => return,
    };

    let mut stack = vec![children.iter()];
    while !stack.is_empty() {
      let depth = level + stack.len() - 1;
      let next = match stack.last_mut() {
        Some(pending) => pending.next(),
        None => break,
      };
      match next {
        Some((key, Container(grandchildren))) => {
          print_indent(depth, buf);
          push_quoted(buf, key);
          buf.push('\n');
          print_indent(depth, buf);
          buf.push_str("{\n");
          stack.push(grandchildren.iter());
        }
        Some((key, Leaf(value))) => {
          print_indent(depth, buf);
          push_quoted(buf, key);
          buf.push_str("\t\t");
          push_quoted(buf, value);
          buf.push('\n');
        }
        None => {
          stack.pop();
          if !stack.is_empty() {
            print_indent(depth - 1, buf);
            buf.push_str("}\n");
          }
        }
      }
    }
  }
}

/// Backslashes are escaped along with quotes so the reader gets back the
/// exact string, whatever follows a backslash.
fn push_quoted(buf: &mut String, s: &str) {
  buf.push('"');
  for c in s.chars() {
    if c == '"' || c == '\\' {
      buf.push('\\');
    }
    buf.push(c);
  }
  buf.push('"');
}
