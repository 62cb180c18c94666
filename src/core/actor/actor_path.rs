use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Hierarchical actor identity; the registry key for mailbox lookup.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum ActorPath {
  Root {
    name: String,
  },
  Child {
    parent: Arc<ActorPath>,
    name: String,
  },
}

impl ActorPath {
  pub fn of_root(name: impl Into<String>) -> Self {
    ActorPath::Root { name: name.into() }
  }

  pub fn of_child(&self, name: impl Into<String>) -> Self {
    ActorPath::Child {
      parent: Arc::new(self.clone()),
      name: name.into(),
    }
  }

  pub fn name(&self) -> &str {
    match self {
      ActorPath::Root { name } => name,
      ActorPath::Child { name, .. } => name,
    }
  }
}

impl Display for ActorPath {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      ActorPath::Root { name } => write!(f, "/{}", name),
      ActorPath::Child { parent, name } => write!(f, "{}/{}", parent, name),
    }
  }
}
