use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::mem;
use Node::{Container, Leaf};

/// Children of a container, kept in insertion order.
pub type Children = IndexMap<String, Node>;

/// A single node of a KeyValues document.
///
/// A `Container` maps keys to child nodes; a `Leaf` holds one string. The
/// root of a parsed document is always a `Container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Container(Children),
  Leaf(String),
}

impl Default for Node {
  fn default() -> Self {
    Container(Children::new())
  }
}

impl From<&str> for Node {
  fn from(value: &str) -> Self {
    Leaf(value.to_owned())
  }
}

impl From<String> for Node {
  fn from(value: String) -> Self {
    Leaf(value)
  }
}

impl Node {
  /// Creates an empty container.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn leaf(value: impl Into<String>) -> Self {
    Leaf(value.into())
  }

  pub fn is_container(&self) -> bool {
    matches!(self, Container(_))
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Leaf(value) => Some(value),
      Container(_) => None,
    }
  }

  pub fn as_container(&self) -> Option<&Children> {
    match self {
      Container(children) => Some(children),
      Leaf(_) => None,
    }
  }

  /// Iterates over the direct children in insertion order. A leaf has none.
  pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
    self
      .as_container()
      .into_iter()
      .flat_map(|children| children.iter().map(|(k, v)| (k.as_str(), v)))
  }

  /// Returns the child at `key`, inserting an empty container first if the
  /// key is absent.
  pub fn get_or_create(&mut self, key: &str) -> Result<&mut Node> {
    match self {
      Container(children) => Ok(children.entry(key.to_owned()).or_default()),
      Leaf(_) => Err(not_a_container(key)),
    }
  }

  pub fn try_get(&self, key: &str) -> Option<&Node> {
    match self {
      Container(children) => children.get(key),
      Leaf(_) => None,
    }
  }

  pub fn try_get_mut(&mut self, key: &str) -> Option<&mut Node> {
    match self {
      Container(children) => children.get_mut(key),
      Leaf(_) => None,
    }
  }

  /// Inserts or replaces the child at `key`. A replaced key keeps its position.
  pub fn set(&mut self, key: &str, node: impl Into<Node>) -> Result<()> {
    match self {
      Container(children) => {
        children.insert(key.to_owned(), node.into());
        Ok(())
      }
      Leaf(_) => Err(not_a_container(key)),
    }
  }

  pub fn contains_key(&self, key: &str) -> bool {
    match self {
      Container(children) => children.contains_key(key),
      Leaf(_) => false,
    }
  }

  /// Removes the child at `key`, returning whether it was present.
  pub fn remove_child(&mut self, key: &str) -> Result<bool> {
    match self {
      Container(children) => Ok(children.shift_remove(key).is_some()),
      Leaf(_) => Err(not_a_container(key)),
    }
  }

  /// Walks `path` one key at a time. Missing keys are created as empty
  /// containers when `create` is set, otherwise the walk yields `None`.
  /// A leaf in the middle of the path also yields `None`.
  pub fn get_node_at_path<S: AsRef<str>>(&mut self, path: &[S], create: bool) -> Option<&mut Node> {
    let mut node = self;
    for key in path {
      let key = key.as_ref();
      node = match node {
        Container(children) => {
          if create {
            children.entry(key.to_owned()).or_default()
          } else {
            children.get_mut(key)?
          }
        }
        Leaf(_) => return None,
      };
    }
    Some(node)
  }

  /// Read-only counterpart of [`Node::get_node_at_path`].
  pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
    path
      .iter()
      .try_fold(self, |node, key| node.try_get(key.as_ref()))
  }

  /// A container with no children. Leaves always carry a value.
  pub fn is_empty(&self) -> bool {
    match self {
      Container(children) => children.is_empty(),
      Leaf(_) => false,
    }
  }

  /// Removes every descendant container left without children once its own
  /// subtree has been pruned. Walks with an explicit stack, so depth is
  /// bounded by memory rather than the call stack.
  pub fn prune_empty(&mut self) {
    let root = match self {
      Container(children) => children,
      Leaf(_) => return,
    };

    // Each frame: key in the parent, children still to visit, children kept.
    let mut stack = vec![(String::new(), mem::take(root).into_iter(), Children::new())];
    loop {
      let next = match stack.last_mut() {
        Some((_, pending, _)) => pending.next(),
        None => return,
      };
      match next {
        Some((key, Container(children))) => {
          stack.push((key, children.into_iter(), Children::new()));
        }
        Some((key, leaf)) => {
          if let Some((_, _, kept)) = stack.last_mut() {
            kept.insert(key, leaf);
          }
        }
        None => {
          let Some((key, _, kept)) = stack.pop() else {
            return;
          };
          match stack.last_mut() {
            Some((_, _, parent)) => {
              if !kept.is_empty() {
                parent.insert(key, Container(kept));
              }
            }
            None => *root = kept,
          }
        }
      }
    }
  }
}

fn not_a_container(key: &str) -> Error {
  Error::NotAContainer {
    key: key.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::Node::{self, Container, Leaf};
  use crate::error::Error;

  fn keys(node: &Node) -> Vec<&str> {
    node.children().map(|(k, _)| k).collect()
  }

  #[test]
  fn get_or_create_builds_containers() {
    let mut root = Node::new();
    root
      .get_or_create("a")
      .unwrap()
      .set("b", Node::leaf("v"))
      .unwrap();

    let a = root.get_or_create("a").unwrap();
    assert!(a.is_container());
    assert_eq!(a.get_or_create("b").unwrap(), &Leaf("v".into()));
    assert_eq!(keys(&root), vec!["a"]);
  }

  #[test]
  fn get_or_create_on_leaf_fails() {
    let mut leaf = Node::leaf("x");
    assert!(matches!(
      leaf.get_or_create("k"),
      Err(Error::NotAContainer { key }) if key == "k"
    ));
    assert_eq!(leaf, Leaf("x".into()));
  }

  #[test]
  fn set_on_leaf_fails() {
    let mut leaf = Node::leaf("x");
    assert!(matches!(
      leaf.set("k", Node::new()),
      Err(Error::NotAContainer { .. })
    ));
    assert_eq!(leaf.as_str(), Some("x"));
  }

  #[test]
  fn set_replaces_in_place() {
    let mut root = Node::new();
    root.set("a", "1").unwrap();
    root.set("b", "2").unwrap();
    root.set("c", "3").unwrap();
    root.set("a", Node::new()).unwrap();

    assert_eq!(keys(&root), vec!["a", "b", "c"]);
    assert!(root.try_get("a").unwrap().is_container());
  }

  #[test]
  fn try_get_does_not_create() {
    let root = Node::new();
    assert_eq!(root.try_get("missing"), None);
    assert!(root.is_empty());
    assert_eq!(Node::leaf("x").try_get("missing"), None);
  }

  #[test]
  fn contains_key() {
    let mut root = Node::new();
    root.set("k", "v").unwrap();

    assert!(root.contains_key("k"));
    assert!(!root.contains_key("other"));
    assert!(!Node::leaf("k").contains_key("k"));
  }

  #[test]
  fn remove_child() {
    let mut root = Node::new();
    root.set("a", "1").unwrap();
    root.set("b", "2").unwrap();
    root.set("c", "3").unwrap();

    assert!(root.remove_child("b").unwrap());
    assert!(!root.remove_child("b").unwrap());
    assert_eq!(keys(&root), vec!["a", "c"]);
    assert!(matches!(
      Node::leaf("x").remove_child("a"),
      Err(Error::NotAContainer { .. })
    ));
  }

  #[test]
  fn get_node_at_path_without_create() {
    let mut root = Node::new();
    root
      .get_node_at_path(&["Software", "Valve"], true)
      .unwrap()
      .set("Steam", "x")
      .unwrap();

    assert_eq!(
      root.get_node_at_path(&["Software", "Valve", "Steam"], false),
      Some(&mut Leaf("x".into()))
    );
    assert_eq!(root.get_node_at_path(&["Software", "Nope"], false), None);
    assert_eq!(root.get_node_at_path(&["Software", "Valve", "Steam", "apps"], true), None);
    assert_eq!(root.get_node_at_path(&["Software", "Valve", "Steam", "apps"], false), None);
    assert_eq!(keys(root.find(&["Software"]).unwrap()), vec!["Valve"]);
  }

  #[test]
  fn get_node_at_path_with_create() {
    let mut root = Node::new();
    let apps = root
      .get_node_at_path(&["Software", "Valve", "Steam", "apps"], true)
      .unwrap();
    assert_eq!(apps, &mut Node::new());

    assert!(root.find(&["Software", "Valve", "Steam", "apps"]).is_some());
    assert!(root.find(&["Software", "Valve", "Other"]).is_none());
  }

  #[test]
  fn empty_path_is_self() {
    let mut root = Node::leaf("x");
    let empty: [&str; 0] = [];
    assert_eq!(root.find(&empty), Some(&Leaf("x".into())));
    assert_eq!(root.get_node_at_path(&empty, false), Some(&mut Leaf("x".into())));
  }

  #[test]
  fn prune_empty() {
    let mut b = Node::new();
    b.set("b", Node::new()).unwrap();
    let mut root = Node::new();
    root.set("a", b).unwrap();
    root.set("c", "x").unwrap();

    root.prune_empty();

    let mut expected = Node::new();
    expected.set("c", "x").unwrap();
    assert_eq!(root, expected);
  }

  #[test]
  fn prune_empty_keeps_filled_branches() {
    let mut root = Node::new();
    root
      .get_node_at_path(&["apps", "10", "tags"], true)
      .unwrap()
      .set("0", "favorite")
      .unwrap();
    root.get_node_at_path(&["apps", "20", "tags"], true);
    root.get_node_at_path(&["apps", "30"], true).unwrap().set("Hidden", "").unwrap();

    root.prune_empty();

    let apps = root.find(&["apps"]).unwrap();
    assert_eq!(keys(apps), vec!["10", "30"]);
    assert_eq!(root.find(&["apps", "30", "Hidden"]), Some(&Leaf(String::new())));
  }

  #[test]
  fn prune_empty_keeps_order() {
    let mut root = Node::new();
    root.set("z", "1").unwrap();
    root.get_node_at_path(&["y", "gone"], true);
    root.get_or_create("x").unwrap().set("k", "v").unwrap();
    root.set("w", "2").unwrap();

    root.prune_empty();

    assert_eq!(keys(&root), vec!["z", "x", "w"]);
  }

  #[test]
  fn prune_empty_deep_tree() {
    let path: Vec<String> = (0..3000).map(|i| i.to_string()).collect();
    let mut root = Node::new();
    root.get_node_at_path(&path, true);
    root
      .get_node_at_path(&path[..1500], false)
      .unwrap()
      .set("value", "x")
      .unwrap();

    root.prune_empty();

    let mut kept = path[..1500].to_vec();
    kept.push("value".to_owned());
    assert_eq!(root.find(&kept), Some(&Leaf("x".into())));
    assert_eq!(root.find(&path[..1501]), None);
  }

  #[test]
  fn prune_leaf_is_noop() {
    let mut leaf = Node::leaf("");
    leaf.prune_empty();
    assert_eq!(leaf, Leaf(String::new()));
    assert!(!leaf.is_empty());
  }

  #[test]
  fn accessors() {
    let leaf = Node::from("v");
    assert_eq!(leaf.as_str(), Some("v"));
    assert_eq!(leaf.as_container(), None);
    assert_eq!(leaf.children().count(), 0);

    let root = Container(Default::default());
    assert_eq!(root.as_str(), None);
    assert_eq!(root.as_container().map(|c| c.len()), Some(0));
  }
}
