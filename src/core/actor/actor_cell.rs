use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

use crate::core::actor::actor_path::ActorPath;
use crate::core::actor::{ActorBehavior, ActorResult};
use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::mailbox::dead_letter_mailbox::DeadLetterMailbox;
use crate::core::dispatch::mailbox::mailbox::Mailbox;
use crate::core::dispatch::system_message::system_message::SystemMessage;
use crate::core::event_stream::EventStream;

/// Owns the actor's behavior and mailbox, and carries the process-wide
/// collaborators the mailbox reaches through it. Clones share the same cell,
/// so the dispatcher can hand copies to spawned run tasks.
#[derive(Clone)]
pub struct ActorCell {
  inner: Arc<ActorCellInner>,
}

struct ActorCellInner {
  path: ActorPath,
  behavior: Mutex<Box<dyn ActorBehavior>>,
  mailbox: Mailbox,
  event_stream: Arc<EventStream>,
  dead_letter_mailbox: DeadLetterMailbox,
}

impl Debug for ActorCell {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActorCell").field("path", &self.inner.path).finish()
  }
}

impl ActorCell {
  pub fn new(
    path: ActorPath,
    behavior: Box<dyn ActorBehavior>,
    mailbox: Mailbox,
    event_stream: Arc<EventStream>,
    dead_letter_mailbox: DeadLetterMailbox,
  ) -> Self {
    Self {
      inner: Arc::new(ActorCellInner {
        path,
        behavior: Mutex::new(behavior),
        mailbox,
        event_stream,
        dead_letter_mailbox,
      }),
    }
  }

  pub fn path(&self) -> &ActorPath {
    &self.inner.path
  }

  pub fn mailbox(&self) -> Mailbox {
    self.inner.mailbox.clone()
  }

  pub fn event_stream(&self) -> Arc<EventStream> {
    self.inner.event_stream.clone()
  }

  pub fn dead_letter_mailbox(&self) -> DeadLetterMailbox {
    self.inner.dead_letter_mailbox.clone()
  }

  /// Delivers one user envelope to the behavior.
  pub fn invoke(&self, envelope: &Envelope) -> ActorResult<()> {
    log::debug!("invoke: {} at {}", envelope, self.inner.path);
    let mut behavior = self.inner.behavior.lock().unwrap();
    behavior.receive(envelope)
  }

  /// Delivers one system message to the behavior.
  pub fn system_invoke(&self, message: &SystemMessage) -> ActorResult<()> {
    log::debug!("system_invoke: {:?} at {}", message, self.inner.path);
    let mut behavior = self.inner.behavior.lock().unwrap();
    behavior.system_receive(message)
  }
}
