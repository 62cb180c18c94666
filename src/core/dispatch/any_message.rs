use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use thiserror::Error;

use crate::core::dispatch::message::Message;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("failed to downcast to {expected}, the payload is {actual}")]
pub struct DowncastAnyMessageError {
  expected: &'static str,
  actual: &'static str,
}

/// Type-erased message payload. The dispatch layer never inspects it; typed
/// access is recovered by the actor via `take`.
#[derive(Clone)]
pub struct AnyMessage {
  msg: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Debug for AnyMessage {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "AnyMessage({})", self.type_name)
  }
}

impl PartialEq for AnyMessage {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.msg, &other.msg)
  }
}

impl AnyMessage {
  pub fn new<T: Message>(msg: T) -> Self {
    Self {
      msg: Arc::new(msg),
      type_name: std::any::type_name::<T>(),
    }
  }

  pub fn take<T: Message + Clone>(&self) -> Result<T, DowncastAnyMessageError> {
    self
      .msg
      .downcast_ref::<T>()
      .cloned()
      .ok_or(DowncastAnyMessageError {
        expected: std::any::type_name::<T>(),
        actual: self.type_name,
      })
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }
}
