use anyhow::Result;

use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::message_queue::{
  MessageQueueBehavior, MessageQueueReaderBehavior, MessageQueueSize, MessageQueueWriterBehavior,
};
use crate::infrastructure::queue::{QueueBehavior, QueueMpsc, QueueReaderBehavior, QueueWriterBehavior};

/// Unbounded FIFO user queue; enqueue never blocks and never fails.
#[derive(Debug, Clone)]
pub struct UnboundedMessageQueue {
  queue: QueueMpsc<Envelope>,
}

impl UnboundedMessageQueue {
  pub fn new() -> Self {
    Self {
      queue: QueueMpsc::new(),
    }
  }
}

impl Default for UnboundedMessageQueue {
  fn default() -> Self {
    Self::new()
  }
}

impl MessageQueueBehavior for UnboundedMessageQueue {
  fn number_of_messages(&self) -> MessageQueueSize {
    self.queue.len().into()
  }

  fn has_messages(&self) -> bool {
    self.queue.non_empty()
  }
}

impl MessageQueueWriterBehavior for UnboundedMessageQueue {
  fn enqueue(&self, envelope: Envelope) -> Result<()> {
    self.queue.offer(envelope)
  }
}

impl MessageQueueReaderBehavior for UnboundedMessageQueue {
  fn dequeue(&self) -> Result<Option<Envelope>> {
    self.queue.poll()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::env;

  fn init_logger() {
    env::set_var("RUST_LOG", "info");
    let _ = env_logger::builder().is_test(true).try_init();
  }

  #[test]
  fn test_insertion_order() {
    init_logger();
    let queue = UnboundedMessageQueue::new();

    for text in ["a", "b", "c"] {
      queue.enqueue(Envelope::new(text.to_owned())).unwrap();
    }

    assert!(queue.has_messages());
    assert_eq!(queue.number_of_messages(), MessageQueueSize::Limited(3));
    for text in ["a", "b", "c"] {
      let envelope = queue.dequeue().unwrap().unwrap();
      assert_eq!(envelope.typed_message::<String>().unwrap(), text.to_owned());
    }
    assert!(!queue.has_messages());
  }
}
