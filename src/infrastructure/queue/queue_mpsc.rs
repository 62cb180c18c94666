use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::infrastructure::queue::{
  Element, QueueBehavior, QueueError, QueueRWBehavior, QueueReaderBehavior, QueueSize, QueueWriterBehavior,
};

/// Unbounded MPSC queue; any number of producers, one consuming side.
///
/// The channel cannot be asked for its length, so an element counter is kept
/// next to it. The counter is advisory between operations but exact for the
/// single consumer once producers have quiesced.
#[derive(Debug)]
pub struct QueueMpsc<E: Element> {
  tx: Sender<E>,
  rx: Arc<Mutex<Receiver<E>>>,
  count: Arc<AtomicUsize>,
}

impl<E: Element> Clone for QueueMpsc<E> {
  fn clone(&self) -> Self {
    Self {
      tx: self.tx.clone(),
      rx: self.rx.clone(),
      count: self.count.clone(),
    }
  }
}

impl<E: Element> QueueMpsc<E> {
  pub fn new() -> Self {
    let (tx, rx) = channel();
    Self {
      tx,
      rx: Arc::new(Mutex::new(rx)),
      count: Arc::new(AtomicUsize::new(0)),
    }
  }
}

impl<E: Element> Default for QueueMpsc<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E: Element> QueueBehavior<E> for QueueMpsc<E> {
  fn len(&self) -> QueueSize {
    QueueSize::Limited(self.count.load(Ordering::Acquire))
  }

  fn capacity(&self) -> QueueSize {
    QueueSize::Limitless
  }
}

impl<E: Element> QueueWriterBehavior<E> for QueueMpsc<E> {
  fn offer(&self, element: E) -> Result<()> {
    match self.tx.send(element) {
      Ok(_) => {
        self.count.fetch_add(1, Ordering::Release);
        Ok(())
      }
      Err(_) => Err(anyhow::Error::new(QueueError::<E>::Disconnected)),
    }
  }
}

impl<E: Element> QueueReaderBehavior<E> for QueueMpsc<E> {
  fn poll(&self) -> Result<Option<E>> {
    let rx = self.rx.lock().unwrap();
    match rx.try_recv() {
      Ok(element) => {
        self.count.fetch_sub(1, Ordering::Release);
        Ok(Some(element))
      }
      Err(TryRecvError::Empty) => Ok(None),
      Err(TryRecvError::Disconnected) => Err(anyhow::Error::new(QueueError::<E>::Disconnected)),
    }
  }
}

impl<E: Element> QueueRWBehavior<E> for QueueMpsc<E> {}
