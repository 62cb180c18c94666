use std::fmt::{Debug, Formatter};
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::core::dispatch::system_message::system_message_entry::SystemMessageEntry;

/// Treiber-style lock-free LIFO of system message entries.
///
/// Producers push onto an atomic head; the entry's `next` link is written
/// before the head CAS and published by its release ordering. The single
/// consumer detaches the whole stack in one CAS and reverses it, so delivery
/// is in arrival order across all producers.
pub struct SystemQueue {
  head: AtomicPtr<SystemMessageEntry>,
}

impl Debug for SystemQueue {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SystemQueue")
      .field("has_system_messages", &self.has_system_messages())
      .finish()
  }
}

impl SystemQueue {
  pub fn new() -> Self {
    Self {
      head: AtomicPtr::new(ptr::null_mut()),
    }
  }

  /// Pushes an entry. The entry must be unlinked; on CAS failure its link is
  /// reset before the retry so the precondition holds on every attempt.
  pub fn system_enqueue(&self, entry: SystemMessageEntry) {
    debug_assert!(entry.is_unlinked());
    let node = Box::into_raw(Box::new(entry));
    loop {
      let current_head = self.head.load(Ordering::Acquire);
      unsafe {
        (*node).next = current_head;
      }
      if self
        .head
        .compare_exchange(current_head, node, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
      {
        return;
      }
      unsafe {
        (*node).unlink();
      }
    }
  }

  /// Detaches everything enqueued so far and returns it in arrival order.
  pub fn system_drain(&self) -> EarliestFirstSystemMessageChain {
    loop {
      let current_head = self.head.load(Ordering::Acquire);
      if current_head.is_null() {
        return EarliestFirstSystemMessageChain::empty();
      }
      if self
        .head
        .compare_exchange(current_head, ptr::null_mut(), Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
      {
        return EarliestFirstSystemMessageChain {
          head: Self::reverse_chain(current_head),
        };
      }
    }
  }

  pub fn has_system_messages(&self) -> bool {
    !self.head.load(Ordering::Acquire).is_null()
  }

  fn reverse_chain(mut head: *mut SystemMessageEntry) -> *mut SystemMessageEntry {
    let mut prev = ptr::null_mut();
    while !head.is_null() {
      let next = unsafe { (*head).next };
      unsafe {
        (*head).next = prev;
      }
      prev = head;
      head = next;
    }
    prev
  }
}

impl Default for SystemQueue {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for SystemQueue {
  fn drop(&mut self) {
    drop(self.system_drain());
  }
}

/// An owned chain of drained entries in arrival order.
///
/// Iteration detaches each entry and resets its link, so every yielded entry
/// is unlinked. Dropping the chain frees any undelivered tail.
pub struct EarliestFirstSystemMessageChain {
  head: *mut SystemMessageEntry,
}

unsafe impl Send for EarliestFirstSystemMessageChain {}

impl EarliestFirstSystemMessageChain {
  pub fn empty() -> Self {
    Self { head: ptr::null_mut() }
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_null()
  }

  pub fn non_empty(&self) -> bool {
    !self.is_empty()
  }

  pub fn len(&self) -> usize {
    let mut count = 0;
    let mut cursor = self.head;
    while !cursor.is_null() {
      count += 1;
      cursor = unsafe { (*cursor).next };
    }
    count
  }
}

impl Iterator for EarliestFirstSystemMessageChain {
  type Item = SystemMessageEntry;

  fn next(&mut self) -> Option<Self::Item> {
    if self.head.is_null() {
      return None;
    }
    let node = unsafe { Box::from_raw(self.head) };
    self.head = node.next;
    let mut entry = *node;
    entry.unlink();
    Some(entry)
  }
}

impl Debug for EarliestFirstSystemMessageChain {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EarliestFirstSystemMessageChain")
      .field("len", &self.len())
      .finish()
  }
}

impl Drop for EarliestFirstSystemMessageChain {
  fn drop(&mut self) {
    while self.next().is_some() {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::actor::actor_path::ActorPath;
  use crate::core::dispatch::system_message::system_message::SystemMessage;
  use std::env;
  use std::sync::Arc;
  use std::thread;

  fn init_logger() {
    env::set_var("RUST_LOG", "debug");
    let _ = env_logger::builder().is_test(true).try_init();
  }

  #[test]
  fn test_drain_returns_arrival_order() {
    init_logger();
    let queue = SystemQueue::new();
    queue.system_enqueue(SystemMessageEntry::new(SystemMessage::of_create()));
    queue.system_enqueue(SystemMessageEntry::new(SystemMessage::of_suspend()));
    queue.system_enqueue(SystemMessageEntry::new(SystemMessage::of_terminate()));

    assert!(queue.has_system_messages());

    let chain = queue.system_drain();
    assert_eq!(chain.len(), 3);
    let messages: Vec<SystemMessage> = chain.map(|entry| entry.message).collect();
    assert_eq!(
      messages,
      vec![
        SystemMessage::of_create(),
        SystemMessage::of_suspend(),
        SystemMessage::of_terminate()
      ]
    );
    assert!(!queue.has_system_messages());
  }

  #[test]
  fn test_drain_concatenation_preserves_order() {
    init_logger();
    let queue = SystemQueue::new();
    let root = ActorPath::of_root("user");

    let mut collected = Vec::new();
    for batch in 0..3 {
      for i in 0..4 {
        let watchee = root.of_child(format!("w-{}-{}", batch, i));
        queue.system_enqueue(SystemMessageEntry::new(SystemMessage::of_watch(
          watchee.clone(),
          root.clone(),
        )));
      }
      for entry in queue.system_drain() {
        assert!(entry.is_unlinked());
        collected.push(entry.message);
      }
    }

    let expected: Vec<SystemMessage> = (0..3)
      .flat_map(|batch| {
        let root = root.clone();
        (0..4).map(move |i| SystemMessage::of_watch(root.of_child(format!("w-{}-{}", batch, i)), root.clone()))
      })
      .collect();
    assert_eq!(collected, expected);
  }

  #[test]
  fn test_empty_drain() {
    init_logger();
    let queue = SystemQueue::new();

    let chain = queue.system_drain();
    assert!(chain.is_empty());
    assert_eq!(chain.len(), 0);
  }

  #[test]
  fn test_concurrent_enqueue_loses_nothing() {
    init_logger();
    let queue = Arc::new(SystemQueue::new());
    let root = ActorPath::of_root("user");

    let handles: Vec<_> = (0..4)
      .map(|p| {
        let queue = queue.clone();
        let root = root.clone();
        thread::spawn(move || {
          for i in 0..250 {
            let watchee = root.of_child(format!("p{}-{}", p, i));
            queue.system_enqueue(SystemMessageEntry::new(SystemMessage::of_watch(watchee, root.clone())));
          }
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }

    let mut total = 0;
    loop {
      let chain = queue.system_drain();
      if chain.is_empty() {
        break;
      }
      total += chain.count();
    }
    assert_eq!(total, 1000);
  }

  #[test]
  fn test_dropping_chain_frees_tail() {
    init_logger();
    let queue = SystemQueue::new();
    for _ in 0..5 {
      queue.system_enqueue(SystemMessageEntry::new(SystemMessage::of_terminate()));
    }

    let mut chain = queue.system_drain();
    let first = chain.next().unwrap();
    assert!(first.is_unlinked());
    drop(chain);

    assert!(!queue.has_system_messages());
  }
}
