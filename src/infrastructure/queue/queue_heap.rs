use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::infrastructure::queue::{
  Comparator, Element, QueueBehavior, QueueError, QueueRWBehavior, QueueReaderBehavior, QueueSize,
  QueueWriterBehavior,
};

/// Priority queue over a mutex-guarded `BinaryHeap`.
///
/// The heap is a max-heap, so entries invert the caller's comparator: the
/// comparator-least element surfaces first. Equal-ranked elements have no
/// guaranteed relative order.
#[derive(Clone)]
pub struct QueueHeap<E: Element> {
  values: Arc<Mutex<BinaryHeap<HeapEntry<E>>>>,
  comparator: Comparator<E>,
  capacity: QueueSize,
}

impl<E: Element> Debug for QueueHeap<E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("QueueHeap")
      .field("len", &self.len())
      .field("capacity", &self.capacity)
      .finish()
  }
}

struct HeapEntry<E: Element> {
  value: E,
  comparator: Comparator<E>,
}

impl<E: Element> PartialEq for HeapEntry<E> {
  fn eq(&self, other: &Self) -> bool {
    (self.comparator)(&self.value, &other.value) == Ordering::Equal
  }
}

impl<E: Element> Eq for HeapEntry<E> {}

impl<E: Element> PartialOrd for HeapEntry<E> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<E: Element> Ord for HeapEntry<E> {
  fn cmp(&self, other: &Self) -> Ordering {
    (self.comparator)(&self.value, &other.value).reverse()
  }
}

impl<E: Element> QueueHeap<E> {
  pub fn new(comparator: Comparator<E>) -> Self {
    Self {
      values: Arc::new(Mutex::new(BinaryHeap::new())),
      comparator,
      capacity: QueueSize::Limitless,
    }
  }

  pub fn with_num_elements(num_elements: usize, comparator: Comparator<E>) -> Self {
    Self {
      values: Arc::new(Mutex::new(BinaryHeap::with_capacity(num_elements))),
      comparator,
      capacity: QueueSize::Limited(num_elements),
    }
  }
}

impl<E: Element> QueueBehavior<E> for QueueHeap<E> {
  fn len(&self) -> QueueSize {
    let mg = self.values.lock().unwrap();
    QueueSize::Limited(mg.len())
  }

  fn capacity(&self) -> QueueSize {
    self.capacity.clone()
  }
}

impl<E: Element> QueueWriterBehavior<E> for QueueHeap<E> {
  fn offer(&self, element: E) -> Result<()> {
    if self.non_full() {
      let mut mg = self.values.lock().unwrap();
      mg.push(HeapEntry {
        value: element,
        comparator: self.comparator.clone(),
      });
      Ok(())
    } else {
      Err(anyhow::Error::new(QueueError::OfferError(element)))
    }
  }
}

impl<E: Element> QueueReaderBehavior<E> for QueueHeap<E> {
  fn poll(&self) -> Result<Option<E>> {
    let mut mg = self.values.lock().unwrap();
    Ok(mg.pop().map(|entry| entry.value))
  }
}

impl<E: Element> QueueRWBehavior<E> for QueueHeap<E> {}
