use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use crate::core::actor::actor_path::ActorPath;
use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::mailbox::dead_letter::DeadLetter;
use crate::core::dispatch::system_message::system_message_entry::SystemMessageEntry;

/// Destination for messages drained out of a closed mailbox. Mirrors the
/// mailbox enqueue surface plus the recipient whose delivery failed, and
/// never rejects.
pub trait DeadLetterSinkBehavior: Debug + Send + Sync {
  fn enqueue(&self, envelope: Envelope, recipient: ActorPath);
  fn system_enqueue(&self, entry: SystemMessageEntry, recipient: ActorPath);
}

#[derive(Debug, Clone)]
pub struct DeadLetterMailbox {
  letters: Arc<Mutex<Vec<DeadLetter>>>,
}

impl DeadLetterMailbox {
  pub fn new() -> Self {
    Self {
      letters: Arc::new(Mutex::new(Vec::new())),
    }
  }

  pub fn number_of_dead_letters(&self) -> usize {
    self.letters.lock().unwrap().len()
  }

  pub fn drain_dead_letters(&self) -> Vec<DeadLetter> {
    let mut mg = self.letters.lock().unwrap();
    std::mem::take(&mut *mg)
  }
}

impl Default for DeadLetterMailbox {
  fn default() -> Self {
    Self::new()
  }
}

impl DeadLetterSinkBehavior for DeadLetterMailbox {
  fn enqueue(&self, envelope: Envelope, recipient: ActorPath) {
    log::debug!("dead letter for {}: {}", recipient, envelope);
    let mut mg = self.letters.lock().unwrap();
    mg.push(DeadLetter::of_user(envelope, recipient));
  }

  fn system_enqueue(&self, entry: SystemMessageEntry, recipient: ActorPath) {
    debug_assert!(entry.is_unlinked());
    log::debug!("dead letter (system) for {}: {:?}", recipient, entry.message);
    let mut mg = self.letters.lock().unwrap();
    mg.push(DeadLetter::of_system(entry.message, recipient));
  }
}
