use anyhow::Result;

use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::message_queue::bounded_message_queue::BoundedMessageQueue;
use crate::core::dispatch::message_queue::bounded_priority_message_queue::BoundedPriorityMessageQueue;
use crate::core::dispatch::message_queue::unbounded_message_queue::UnboundedMessageQueue;
use crate::core::dispatch::message_queue::unbounded_priority_message_queue::UnboundedPriorityMessageQueue;
use crate::infrastructure::queue::{Comparator, QueueSize};
use std::time::Duration;

pub mod bounded_message_queue;
pub mod bounded_priority_message_queue;
pub mod unbounded_message_queue;
pub mod unbounded_priority_message_queue;

/// Ordering over envelopes for the priority variants.
pub type EnvelopeComparator = Comparator<Envelope>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageQueueSize {
  Limited(usize),
  Limitless,
}

impl From<QueueSize> for MessageQueueSize {
  fn from(size: QueueSize) -> Self {
    match size {
      QueueSize::Limited(n) => MessageQueueSize::Limited(n),
      QueueSize::Limitless => MessageQueueSize::Limitless,
    }
  }
}

pub trait MessageQueueBehavior {
  fn number_of_messages(&self) -> MessageQueueSize;
  fn has_messages(&self) -> bool;
}

pub trait MessageQueueWriterBehavior: MessageQueueBehavior {
  fn enqueue(&self, envelope: Envelope) -> Result<()>;
}

pub trait MessageQueueReaderBehavior: MessageQueueBehavior {
  fn dequeue(&self) -> Result<Option<Envelope>>;
}

/// The user message queue of a mailbox; one of four flavors selected at
/// mailbox construction.
#[derive(Debug, Clone)]
pub enum MessageQueue {
  Unbounded(UnboundedMessageQueue),
  Bounded(BoundedMessageQueue),
  UnboundedPriority(UnboundedPriorityMessageQueue),
  BoundedPriority(BoundedPriorityMessageQueue),
}

impl MessageQueue {
  pub fn of_unbounded() -> Self {
    MessageQueue::Unbounded(UnboundedMessageQueue::new())
  }

  pub fn of_bounded(capacity: usize, push_timeout: Duration) -> Self {
    MessageQueue::Bounded(BoundedMessageQueue::new(capacity, push_timeout))
  }

  pub fn of_unbounded_priority(comparator: EnvelopeComparator) -> Self {
    MessageQueue::UnboundedPriority(UnboundedPriorityMessageQueue::new(comparator))
  }

  pub fn of_bounded_priority(capacity: usize, push_timeout: Duration, comparator: EnvelopeComparator) -> Self {
    MessageQueue::BoundedPriority(BoundedPriorityMessageQueue::new(capacity, push_timeout, comparator))
  }
}

impl MessageQueueBehavior for MessageQueue {
  fn number_of_messages(&self) -> MessageQueueSize {
    match self {
      MessageQueue::Unbounded(queue) => queue.number_of_messages(),
      MessageQueue::Bounded(queue) => queue.number_of_messages(),
      MessageQueue::UnboundedPriority(queue) => queue.number_of_messages(),
      MessageQueue::BoundedPriority(queue) => queue.number_of_messages(),
    }
  }

  fn has_messages(&self) -> bool {
    match self {
      MessageQueue::Unbounded(queue) => queue.has_messages(),
      MessageQueue::Bounded(queue) => queue.has_messages(),
      MessageQueue::UnboundedPriority(queue) => queue.has_messages(),
      MessageQueue::BoundedPriority(queue) => queue.has_messages(),
    }
  }
}

impl MessageQueueWriterBehavior for MessageQueue {
  fn enqueue(&self, envelope: Envelope) -> Result<()> {
    match self {
      MessageQueue::Unbounded(queue) => queue.enqueue(envelope),
      MessageQueue::Bounded(queue) => queue.enqueue(envelope),
      MessageQueue::UnboundedPriority(queue) => queue.enqueue(envelope),
      MessageQueue::BoundedPriority(queue) => queue.enqueue(envelope),
    }
  }
}

impl MessageQueueReaderBehavior for MessageQueue {
  fn dequeue(&self) -> Result<Option<Envelope>> {
    match self {
      MessageQueue::Unbounded(queue) => queue.dequeue(),
      MessageQueue::Bounded(queue) => queue.dequeue(),
      MessageQueue::UnboundedPriority(queue) => queue.dequeue(),
      MessageQueue::BoundedPriority(queue) => queue.dequeue(),
    }
  }
}
