use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::{
  io::{self, Write},
  process::exit,
};
use vdftree::{file, parse_reader};

/// Reformat and query Valve KeyValues (VDF) text files
#[derive(Debug, Parser, PartialEq)]
#[command(version)]
struct Args {
  /// Remove containers that hold no values
  #[arg(long)]
  prune: bool,

  /// Print the node at PATH, a list of keys separated by `/`, instead of rewriting
  #[arg(long, value_name = "PATH")]
  get: Option<String>,

  /// Treat the value of the first top-level key as the document root
  #[arg(long, requires = "get")]
  first_as_root: bool,

  /// File to process, otherwise uses stdin/stdout
  file: Option<String>,
}

fn main() {
  env_logger::init();
  if let Err(e) = run(Args::parse(), &mut io::stdout().lock()) {
    eprintln!("{:#}", e);
    exit(1);
  }
}

fn run(args: Args, out: &mut impl Write) -> Result<()> {
  let mut node = match args.file.as_ref() {
    Some(path) => {
      file::load(path, args.first_as_root).with_context(|| format!("failed to load {}", path))?
    }
    None => parse_reader(io::stdin().lock(), args.first_as_root)?,
  };

  if args.prune {
    node.prune_empty();
  }

  if let Some(path) = args.get.as_ref() {
    let keys: Vec<&str> = path.split('/').filter(|key| !key.is_empty()).collect();
    let found = node
      .find(&keys)
      .ok_or_else(|| anyhow!("no node at {}", path))?;
    match found.as_str() {
      Some(value) => writeln!(out, "{}", value)?,
      None => write!(out, "{}", found)?,
    }
    return Ok(());
  }

  match args.file.as_ref() {
    Some(path) => file::save(&node, path).with_context(|| format!("failed to save {}", path))?,
    None => node.save(out, 0)?,
  }
  Ok(())
}
