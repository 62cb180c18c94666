use thiserror::Error;

use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::message_queue::MessageQueueSize;

pub mod dead_letter;
pub mod dead_letter_mailbox;
pub mod mailbox;
pub mod mailbox_status;
pub mod mailbox_type;
pub mod system_queue;

#[cfg(test)]
mod mailbox_test;

pub trait MailboxBehavior {
  fn number_of_messages(&self) -> MessageQueueSize;
  fn has_messages(&self) -> bool;
  fn has_system_messages(&self) -> bool;
}

/// Raised when a bounded enqueue exhausts its push timeout.
#[derive(Error, Debug)]
#[error("Couldn't enqueue message {envelope} to {mailbox}")]
pub struct EnqueueError {
  envelope: String,
  mailbox: String,
}

impl EnqueueError {
  pub(crate) fn new(envelope: &Envelope, mailbox: impl Into<String>) -> Self {
    Self {
      envelope: envelope.to_string(),
      mailbox: mailbox.into(),
    }
  }
}
