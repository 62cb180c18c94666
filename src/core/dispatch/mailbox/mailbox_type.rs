use std::fmt::{Debug, Formatter};
use std::time::Duration;

use thiserror::Error;

use crate::core::dispatch::message_queue::{EnvelopeComparator, MessageQueue};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MailboxCreationError {
  #[error("Invalid argument: {message}")]
  InvalidArgument { message: String },
}

impl MailboxCreationError {
  pub fn of_invalid_argument(message: impl Into<String>) -> Self {
    MailboxCreationError::InvalidArgument {
      message: message.into(),
    }
  }
}

/// Selects the user queue flavor of a mailbox. The bounded constructors
/// validate their arguments; an already-constructed value is always usable.
#[derive(Clone)]
pub enum MailboxType {
  Unbounded,
  Bounded {
    capacity: usize,
    push_timeout: Duration,
  },
  UnboundedPriority {
    comparator: EnvelopeComparator,
  },
  BoundedPriority {
    capacity: usize,
    push_timeout: Duration,
    comparator: EnvelopeComparator,
  },
}

impl Debug for MailboxType {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      MailboxType::Unbounded => write!(f, "Unbounded"),
      MailboxType::Bounded {
        capacity,
        push_timeout,
      } => write!(f, "Bounded(capacity = {}, push_timeout = {:?})", capacity, push_timeout),
      MailboxType::UnboundedPriority { .. } => write!(f, "UnboundedPriority"),
      MailboxType::BoundedPriority {
        capacity,
        push_timeout,
        ..
      } => write!(
        f,
        "BoundedPriority(capacity = {}, push_timeout = {:?})",
        capacity, push_timeout
      ),
    }
  }
}

impl MailboxType {
  pub fn of_unbounded() -> Self {
    MailboxType::Unbounded
  }

  pub fn of_bounded(capacity: i64, push_timeout: Option<Duration>) -> Result<Self, MailboxCreationError> {
    let (capacity, push_timeout) = Self::validate_bounds(capacity, push_timeout)?;
    Ok(MailboxType::Bounded {
      capacity,
      push_timeout,
    })
  }

  pub fn of_unbounded_priority(comparator: EnvelopeComparator) -> Self {
    MailboxType::UnboundedPriority { comparator }
  }

  pub fn of_bounded_priority(
    capacity: i64,
    push_timeout: Option<Duration>,
    comparator: EnvelopeComparator,
  ) -> Result<Self, MailboxCreationError> {
    let (capacity, push_timeout) = Self::validate_bounds(capacity, push_timeout)?;
    Ok(MailboxType::BoundedPriority {
      capacity,
      push_timeout,
      comparator,
    })
  }

  fn validate_bounds(
    capacity: i64,
    push_timeout: Option<Duration>,
  ) -> Result<(usize, Duration), MailboxCreationError> {
    if capacity < 0 {
      return Err(MailboxCreationError::of_invalid_argument(format!(
        "capacity must be non-negative, got {}",
        capacity
      )));
    }
    match push_timeout {
      Some(push_timeout) => Ok((capacity as usize, push_timeout)),
      None => Err(MailboxCreationError::of_invalid_argument(
        "push-timeout is required for bounded mailboxes",
      )),
    }
  }

  pub fn create_message_queue(&self) -> MessageQueue {
    match self {
      MailboxType::Unbounded => MessageQueue::of_unbounded(),
      MailboxType::Bounded {
        capacity,
        push_timeout,
      } => MessageQueue::of_bounded(*capacity, *push_timeout),
      MailboxType::UnboundedPriority { comparator } => MessageQueue::of_unbounded_priority(comparator.clone()),
      MailboxType::BoundedPriority {
        capacity,
        push_timeout,
        comparator,
      } => MessageQueue::of_bounded_priority(*capacity, *push_timeout, comparator.clone()),
    }
  }
}
