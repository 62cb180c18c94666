use std::time::Duration;

use anyhow::Result;

use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::message_queue::{
  EnvelopeComparator, MessageQueueBehavior, MessageQueueReaderBehavior, MessageQueueSize, MessageQueueWriterBehavior,
};
use crate::infrastructure::queue::{BlockingQueue, QueueBehavior, QueueHeap, QueueReaderBehavior};

/// Capacity-limited priority user queue with the bounded push-timeout policy.
#[derive(Debug, Clone)]
pub struct BoundedPriorityMessageQueue {
  queue: BlockingQueue<Envelope, QueueHeap<Envelope>>,
  push_timeout: Duration,
}

impl BoundedPriorityMessageQueue {
  pub fn new(capacity: usize, push_timeout: Duration, comparator: EnvelopeComparator) -> Self {
    Self {
      queue: BlockingQueue::new(QueueHeap::with_num_elements(capacity, comparator)),
      push_timeout,
    }
  }
}

impl MessageQueueBehavior for BoundedPriorityMessageQueue {
  fn number_of_messages(&self) -> MessageQueueSize {
    self.queue.len().into()
  }

  fn has_messages(&self) -> bool {
    self.queue.non_empty()
  }
}

impl MessageQueueWriterBehavior for BoundedPriorityMessageQueue {
  fn enqueue(&self, envelope: Envelope) -> Result<()> {
    if self.push_timeout.is_zero() {
      self.queue.put(envelope)
    } else {
      self.queue.put_with_timeout(envelope, self.push_timeout)
    }
  }
}

impl MessageQueueReaderBehavior for BoundedPriorityMessageQueue {
  fn dequeue(&self) -> Result<Option<Envelope>> {
    self.queue.poll()
  }
}
