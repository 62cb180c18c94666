use std::time::Duration;

use anyhow::Result;

use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::message_queue::{
  MessageQueueBehavior, MessageQueueReaderBehavior, MessageQueueSize, MessageQueueWriterBehavior,
};
use crate::infrastructure::queue::{BlockingQueue, QueueBehavior, QueueReaderBehavior, QueueVec};

/// Bounded FIFO user queue. A zero push timeout requests block-forever; a
/// positive one turns into an offer that fails once it elapses.
#[derive(Debug, Clone)]
pub struct BoundedMessageQueue {
  queue: BlockingQueue<Envelope, QueueVec<Envelope>>,
  push_timeout: Duration,
}

impl BoundedMessageQueue {
  pub fn new(capacity: usize, push_timeout: Duration) -> Self {
    Self {
      queue: BlockingQueue::new(QueueVec::with_num_elements(capacity)),
      push_timeout,
    }
  }
}

impl MessageQueueBehavior for BoundedMessageQueue {
  fn number_of_messages(&self) -> MessageQueueSize {
    self.queue.len().into()
  }

  fn has_messages(&self) -> bool {
    self.queue.non_empty()
  }
}

impl MessageQueueWriterBehavior for BoundedMessageQueue {
  fn enqueue(&self, envelope: Envelope) -> Result<()> {
    if self.push_timeout.is_zero() {
      self.queue.put(envelope)
    } else {
      self.queue.put_with_timeout(envelope, self.push_timeout)
    }
  }
}

impl MessageQueueReaderBehavior for BoundedMessageQueue {
  fn dequeue(&self) -> Result<Option<Envelope>> {
    self.queue.poll()
  }
}
