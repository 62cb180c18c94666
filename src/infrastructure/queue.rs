use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;

pub mod blocking_queue;
pub mod queue_heap;
pub mod queue_mpsc;
pub mod queue_vec;

pub use blocking_queue::BlockingQueue;
pub use queue_heap::QueueHeap;
pub use queue_mpsc::QueueMpsc;
pub use queue_vec::QueueVec;

pub trait Element: Debug + Send + Sync + 'static {}

impl<T: Debug + Send + Sync + 'static> Element for T {}

/// Ordering supplied by the caller; smaller-ranked elements are dequeued first.
pub type Comparator<E> = Arc<dyn Fn(&E, &E) -> Ordering + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueSize {
  Limitless,
  Limited(usize),
}

impl QueueSize {
  pub fn to_usize(&self) -> usize {
    match self {
      QueueSize::Limitless => usize::MAX,
      QueueSize::Limited(n) => *n,
    }
  }
}

#[derive(Debug, Error)]
pub enum QueueError<E: Element> {
  #[error("offer failed: the queue is full")]
  OfferError(E),
  #[error("offer failed: no space became available within {timeout:?}")]
  PushTimeoutError { element: E, timeout: Duration },
  #[error("the queue is disconnected")]
  Disconnected,
}

pub trait QueueBehavior<E: Element> {
  fn len(&self) -> QueueSize;
  fn capacity(&self) -> QueueSize;

  fn non_empty(&self) -> bool {
    match self.len() {
      QueueSize::Limited(n) => n > 0,
      QueueSize::Limitless => true,
    }
  }

  fn is_empty(&self) -> bool {
    !self.non_empty()
  }

  fn non_full(&self) -> bool {
    match (self.len(), self.capacity()) {
      (QueueSize::Limited(len), QueueSize::Limited(cap)) => len < cap,
      _ => true,
    }
  }
}

pub trait QueueWriterBehavior<E: Element>: QueueBehavior<E> {
  fn offer(&self, element: E) -> Result<()>;
}

pub trait QueueReaderBehavior<E: Element>: QueueBehavior<E> {
  fn poll(&self) -> Result<Option<E>>;
}

pub trait QueueRWBehavior<E: Element>: QueueWriterBehavior<E> + QueueReaderBehavior<E> {}
