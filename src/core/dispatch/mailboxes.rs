use std::fmt::{Debug, Formatter};

use dashmap::DashMap;

use crate::core::actor::actor_path::ActorPath;
use crate::core::dispatch::mailbox::dead_letter_mailbox::DeadLetterMailbox;
use crate::core::dispatch::mailbox::mailbox::Mailbox;
use crate::core::dispatch::mailbox::mailbox_type::MailboxType;

/// Process-wide mailbox registry plus the shared dead letter mailbox.
///
/// The dispatcher reaches mailboxes through actor cells or this registry, so
/// it never owns them; the owning side is the actor.
pub struct Mailboxes {
  dead_letter_mailbox: DeadLetterMailbox,
  mailboxes: DashMap<ActorPath, Mailbox>,
}

impl Debug for Mailboxes {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Mailboxes")
      .field("registered", &self.mailboxes.len())
      .finish()
  }
}

impl Mailboxes {
  pub fn new() -> Self {
    Self {
      dead_letter_mailbox: DeadLetterMailbox::new(),
      mailboxes: DashMap::new(),
    }
  }

  pub fn dead_letter_mailbox(&self) -> DeadLetterMailbox {
    self.dead_letter_mailbox.clone()
  }

  /// Creates and registers the mailbox for an actor path.
  pub fn register(&self, path: &ActorPath, mailbox_type: MailboxType) -> Mailbox {
    let mailbox = Mailbox::new(mailbox_type);
    self.mailboxes.insert(path.clone(), mailbox.clone());
    mailbox
  }

  pub fn lookup(&self, path: &ActorPath) -> Option<Mailbox> {
    self.mailboxes.get(path).map(|entry| entry.value().clone())
  }

  pub fn deregister(&self, path: &ActorPath) -> Option<Mailbox> {
    self.mailboxes.remove(path).map(|(_, mailbox)| mailbox)
  }

  pub fn len(&self) -> usize {
    self.mailboxes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mailboxes.is_empty()
  }
}

impl Default for Mailboxes {
  fn default() -> Self {
    Self::new()
  }
}
