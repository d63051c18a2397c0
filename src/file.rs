use crate::{error::Result, node::Node, parse::parse_reader};
use log::debug;
use std::{
  fs::File,
  io::{BufReader, BufWriter},
  path::Path,
};

/// Loads the document stored at `path`.
pub fn load(path: impl AsRef<Path>, first_value_as_root: bool) -> Result<Node> {
  let path = path.as_ref();
  debug!("loading {}", path.display());
  let node = parse_reader(BufReader::new(File::open(path)?), first_value_as_root)?;
  debug!("loaded {} top-level entries from {}", node.children().count(), path.display());
  Ok(node)
}

/// Writes `node` to `path`, replacing any existing file.
pub fn save(node: &Node, path: impl AsRef<Path>) -> Result<()> {
  let path = path.as_ref();
  debug!("saving {}", path.display());
  node.save(BufWriter::new(File::create(path)?), 0)?;
  Ok(())
}
