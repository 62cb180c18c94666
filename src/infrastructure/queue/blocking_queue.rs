use std::marker::PhantomData;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::infrastructure::queue::{
  Element, QueueBehavior, QueueError, QueueRWBehavior, QueueReaderBehavior, QueueSize, QueueWriterBehavior,
};

/// Adds producer-side blocking to a capacity-limited queue.
///
/// All mutations go through the outer lock, so the fullness predicate checked
/// before an offer cannot go stale between the check and the insert. Consumers
/// never block; every removal signals one waiting producer.
#[derive(Debug)]
pub struct BlockingQueue<E: Element, Q: QueueRWBehavior<E>> {
  underlying: Q,
  lock: Arc<Mutex<()>>,
  not_full: Arc<Condvar>,
  _phantom: PhantomData<E>,
}

impl<E: Element, Q: QueueRWBehavior<E> + Clone> Clone for BlockingQueue<E, Q> {
  fn clone(&self) -> Self {
    Self {
      underlying: self.underlying.clone(),
      lock: self.lock.clone(),
      not_full: self.not_full.clone(),
      _phantom: PhantomData,
    }
  }
}

impl<E: Element, Q: QueueRWBehavior<E>> BlockingQueue<E, Q> {
  pub fn new(underlying: Q) -> Self {
    Self {
      underlying,
      lock: Arc::new(Mutex::new(())),
      not_full: Arc::new(Condvar::new()),
      _phantom: PhantomData,
    }
  }

  /// Blocks until space is available, then inserts.
  pub fn put(&self, element: E) -> Result<()> {
    let mut guard = self.lock.lock().unwrap();
    while !self.underlying.non_full() {
      guard = self.not_full.wait(guard).unwrap();
    }
    let result = self.underlying.offer(element);
    drop(guard);
    result
  }

  /// Waits up to `timeout` for space; fails with `PushTimeoutError` once it elapses.
  pub fn put_with_timeout(&self, element: E, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let mut guard = self.lock.lock().unwrap();
    while !self.underlying.non_full() {
      let now = Instant::now();
      if now >= deadline {
        return Err(anyhow::Error::new(QueueError::PushTimeoutError { element, timeout }));
      }
      let (next_guard, _) = self.not_full.wait_timeout(guard, deadline - now).unwrap();
      guard = next_guard;
    }
    let result = self.underlying.offer(element);
    drop(guard);
    result
  }
}

impl<E: Element, Q: QueueRWBehavior<E>> QueueBehavior<E> for BlockingQueue<E, Q> {
  fn len(&self) -> QueueSize {
    self.underlying.len()
  }

  fn capacity(&self) -> QueueSize {
    self.underlying.capacity()
  }
}

impl<E: Element, Q: QueueRWBehavior<E>> QueueWriterBehavior<E> for BlockingQueue<E, Q> {
  fn offer(&self, element: E) -> Result<()> {
    let guard = self.lock.lock().unwrap();
    let result = self.underlying.offer(element);
    drop(guard);
    result
  }
}

impl<E: Element, Q: QueueRWBehavior<E>> QueueReaderBehavior<E> for BlockingQueue<E, Q> {
  fn poll(&self) -> Result<Option<E>> {
    let guard = self.lock.lock().unwrap();
    let result = self.underlying.poll()?;
    if result.is_some() {
      self.not_full.notify_one();
    }
    drop(guard);
    Ok(result)
  }
}

impl<E: Element, Q: QueueRWBehavior<E>> QueueRWBehavior<E> for BlockingQueue<E, Q> {}
