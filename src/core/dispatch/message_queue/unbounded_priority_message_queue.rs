use anyhow::Result;

use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::message_queue::{
  EnvelopeComparator, MessageQueueBehavior, MessageQueueReaderBehavior, MessageQueueSize, MessageQueueWriterBehavior,
};
use crate::infrastructure::queue::{QueueBehavior, QueueHeap, QueueReaderBehavior, QueueWriterBehavior};

/// Unbounded priority user queue; comparator-least envelopes dequeue first.
#[derive(Debug, Clone)]
pub struct UnboundedPriorityMessageQueue {
  queue: QueueHeap<Envelope>,
}

impl UnboundedPriorityMessageQueue {
  pub fn new(comparator: EnvelopeComparator) -> Self {
    Self {
      queue: QueueHeap::new(comparator),
    }
  }
}

impl MessageQueueBehavior for UnboundedPriorityMessageQueue {
  fn number_of_messages(&self) -> MessageQueueSize {
    self.queue.len().into()
  }

  fn has_messages(&self) -> bool {
    self.queue.non_empty()
  }
}

impl MessageQueueWriterBehavior for UnboundedPriorityMessageQueue {
  fn enqueue(&self, envelope: Envelope) -> Result<()> {
    self.queue.offer(envelope)
  }
}

impl MessageQueueReaderBehavior for UnboundedPriorityMessageQueue {
  fn dequeue(&self) -> Result<Option<Envelope>> {
    self.queue.poll()
  }
}
