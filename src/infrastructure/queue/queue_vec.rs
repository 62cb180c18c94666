use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::infrastructure::queue::{
  Element, QueueBehavior, QueueError, QueueRWBehavior, QueueReaderBehavior, QueueSize, QueueWriterBehavior,
};

/// FIFO queue over a mutex-guarded `VecDeque`; the backing store for bounded mailboxes.
#[derive(Debug, Clone)]
pub struct QueueVec<E: Element> {
  values: Arc<Mutex<VecDeque<E>>>,
  capacity: QueueSize,
}

impl<E: Element> QueueVec<E> {
  pub fn new() -> Self {
    Self {
      values: Arc::new(Mutex::new(VecDeque::new())),
      capacity: QueueSize::Limitless,
    }
  }

  pub fn with_num_elements(num_elements: usize) -> Self {
    Self {
      values: Arc::new(Mutex::new(VecDeque::new())),
      capacity: QueueSize::Limited(num_elements),
    }
  }
}

impl<E: Element> Default for QueueVec<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E: Element> QueueBehavior<E> for QueueVec<E> {
  fn len(&self) -> QueueSize {
    let mg = self.values.lock().unwrap();
    QueueSize::Limited(mg.len())
  }

  fn capacity(&self) -> QueueSize {
    self.capacity.clone()
  }
}

impl<E: Element> QueueWriterBehavior<E> for QueueVec<E> {
  fn offer(&self, element: E) -> Result<()> {
    if self.non_full() {
      let mut mg = self.values.lock().unwrap();
      mg.push_back(element);
      Ok(())
    } else {
      Err(anyhow::Error::new(QueueError::OfferError(element)))
    }
  }
}

impl<E: Element> QueueReaderBehavior<E> for QueueVec<E> {
  fn poll(&self) -> Result<Option<E>> {
    let mut mg = self.values.lock().unwrap();
    Ok(mg.pop_front())
  }
}

impl<E: Element> QueueRWBehavior<E> for QueueVec<E> {}
