use std::fmt::{Debug, Formatter};
use std::ptr;

use crate::core::dispatch::system_message::system_message::SystemMessage;

/// A system message plus the intrusive link used by the system queue.
///
/// The link belongs exclusively to the queue: an entry that is not resident
/// in a queue always has a null `next`.
pub struct SystemMessageEntry {
  pub message: SystemMessage,
  pub(crate) next: *mut SystemMessageEntry,
}

unsafe impl Send for SystemMessageEntry {}

impl Debug for SystemMessageEntry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SystemMessageEntry")
      .field("message", &self.message)
      .field("unlinked", &self.is_unlinked())
      .finish()
  }
}

impl PartialEq for SystemMessageEntry {
  fn eq(&self, other: &Self) -> bool {
    self.message == other.message
  }
}

impl SystemMessageEntry {
  pub fn new(message: SystemMessage) -> Self {
    SystemMessageEntry {
      message,
      next: ptr::null_mut(),
    }
  }

  pub fn is_unlinked(&self) -> bool {
    self.next.is_null()
  }

  pub(crate) fn unlink(&mut self) {
    self.next = ptr::null_mut();
  }
}
