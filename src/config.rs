use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::core::dispatch::mailbox::mailbox_type::{MailboxCreationError, MailboxType};
use crate::core::dispatch::message_queue::EnvelopeComparator;

/// The user queue flavor named by the `mailbox-type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
  Unbounded,
  Bounded,
  UnboundedPriority,
  BoundedPriority,
}

impl FromStr for QueueKind {
  type Err = MailboxCreationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "unbounded" => Ok(QueueKind::Unbounded),
      "bounded" => Ok(QueueKind::Bounded),
      "unbounded-priority" => Ok(QueueKind::UnboundedPriority),
      "bounded-priority" => Ok(QueueKind::BoundedPriority),
      other => Err(MailboxCreationError::of_invalid_argument(format!(
        "unknown mailbox-type: {}",
        other
      ))),
    }
  }
}

/// Mailbox settings read from a configuration table.
///
/// Durations are integer milliseconds; a zero `push-timeout` requests
/// block-forever on a full bounded queue.
#[derive(Debug, Clone, PartialEq)]
pub struct MailboxConfig {
  pub queue_kind: QueueKind,
  pub capacity: Option<i64>,
  pub push_timeout: Option<Duration>,
}

impl Default for MailboxConfig {
  fn default() -> Self {
    Self {
      queue_kind: QueueKind::Unbounded,
      capacity: None,
      push_timeout: None,
    }
  }
}

impl MailboxConfig {
  pub fn from_toml(table: &toml::Table) -> Result<Self, MailboxCreationError> {
    let queue_kind = match table.get("mailbox-type") {
      Some(toml::Value::String(s)) => s.parse()?,
      Some(_) => {
        return Err(MailboxCreationError::of_invalid_argument(
          "mailbox-type must be a string",
        ))
      }
      None => QueueKind::Unbounded,
    };
    let capacity = match table.get("capacity") {
      Some(toml::Value::Integer(n)) => Some(*n),
      Some(_) => return Err(MailboxCreationError::of_invalid_argument("capacity must be an integer")),
      None => None,
    };
    let push_timeout = match table.get("push-timeout") {
      Some(toml::Value::Integer(ms)) if *ms >= 0 => Some(Duration::from_millis(*ms as u64)),
      Some(_) => {
        return Err(MailboxCreationError::of_invalid_argument(
          "push-timeout must be a non-negative integer of milliseconds",
        ))
      }
      None => None,
    };
    Ok(Self {
      queue_kind,
      capacity,
      push_timeout,
    })
  }

  /// Builds the mailbox type; priority kinds need the caller's comparator.
  pub fn mailbox_type(&self, comparator: Option<EnvelopeComparator>) -> Result<MailboxType, MailboxCreationError> {
    match self.queue_kind {
      QueueKind::Unbounded => Ok(MailboxType::of_unbounded()),
      QueueKind::Bounded => MailboxType::of_bounded(self.required_capacity()?, self.push_timeout),
      QueueKind::UnboundedPriority => Ok(MailboxType::of_unbounded_priority(Self::required_comparator(
        comparator,
      )?)),
      QueueKind::BoundedPriority => MailboxType::of_bounded_priority(
        self.required_capacity()?,
        self.push_timeout,
        Self::required_comparator(comparator)?,
      ),
    }
  }

  fn required_capacity(&self) -> Result<i64, MailboxCreationError> {
    self
      .capacity
      .ok_or_else(|| MailboxCreationError::of_invalid_argument("capacity is required for bounded mailboxes"))
  }

  fn required_comparator(
    comparator: Option<EnvelopeComparator>,
  ) -> Result<EnvelopeComparator, MailboxCreationError> {
    comparator
      .ok_or_else(|| MailboxCreationError::of_invalid_argument("a comparator is required for priority mailboxes"))
  }
}

pub const DEFAULT_THROUGHPUT: usize = 5;

/// Dispatcher settings: the per-run throughput bound, whether the run loop
/// batches up to that bound at all, and the optional deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
  throughput: usize,
  throughput_bounded: bool,
  throughput_deadline_time: Option<Duration>,
}

pub static DEFAULT_DISPATCHER_CONFIG: Lazy<DispatcherConfig> = Lazy::new(|| DispatcherConfig {
  throughput: DEFAULT_THROUGHPUT,
  throughput_bounded: true,
  throughput_deadline_time: None,
});

impl Default for DispatcherConfig {
  fn default() -> Self {
    DEFAULT_DISPATCHER_CONFIG.clone()
  }
}

impl DispatcherConfig {
  pub fn new(throughput: i64, throughput_deadline_time: Option<Duration>) -> Result<Self, MailboxCreationError> {
    Self::new_with_throughput_bounded(throughput, true, throughput_deadline_time)
  }

  /// A dispatcher with `throughput_bounded` off delivers exactly one user
  /// message per run regardless of the throughput value.
  pub fn new_with_throughput_bounded(
    throughput: i64,
    throughput_bounded: bool,
    throughput_deadline_time: Option<Duration>,
  ) -> Result<Self, MailboxCreationError> {
    if throughput < 1 {
      return Err(MailboxCreationError::of_invalid_argument(format!(
        "throughput must be at least 1, got {}",
        throughput
      )));
    }
    Ok(Self {
      throughput: throughput as usize,
      throughput_bounded,
      throughput_deadline_time,
    })
  }

  pub fn throughput(&self) -> usize {
    self.throughput
  }

  pub fn throughput_bounded(&self) -> bool {
    self.throughput_bounded
  }

  pub fn throughput_deadline_time(&self) -> Option<Duration> {
    self.throughput_deadline_time
  }

  pub fn from_toml(table: &toml::Table) -> Result<Self, MailboxCreationError> {
    let throughput = match table.get("throughput") {
      Some(toml::Value::Integer(n)) => *n,
      Some(_) => {
        return Err(MailboxCreationError::of_invalid_argument(
          "throughput must be an integer",
        ))
      }
      None => DEFAULT_THROUGHPUT as i64,
    };
    let throughput_bounded = match table.get("throughput-bounded") {
      Some(toml::Value::Boolean(b)) => *b,
      Some(_) => {
        return Err(MailboxCreationError::of_invalid_argument(
          "throughput-bounded must be a boolean",
        ))
      }
      None => true,
    };
    let throughput_deadline_time = match table.get("throughput-deadline-time") {
      Some(toml::Value::Integer(ms)) if *ms >= 0 => Some(Duration::from_millis(*ms as u64)),
      Some(_) => {
        return Err(MailboxCreationError::of_invalid_argument(
          "throughput-deadline-time must be a non-negative integer of milliseconds",
        ))
      }
      None => None,
    };
    Self::new_with_throughput_bounded(throughput, throughput_bounded, throughput_deadline_time)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mailbox_config_from_toml() {
    let table: toml::Table = r#"
      mailbox-type = "bounded"
      capacity = 16
      push-timeout = 50
    "#
    .parse()
    .unwrap();

    let config = MailboxConfig::from_toml(&table).unwrap();
    assert_eq!(config.queue_kind, QueueKind::Bounded);
    assert_eq!(config.capacity, Some(16));
    assert_eq!(config.push_timeout, Some(Duration::from_millis(50)));
    assert!(config.mailbox_type(None).is_ok());
  }

  #[test]
  fn test_mailbox_config_defaults_to_unbounded() {
    let table: toml::Table = "".parse().unwrap();
    let config = MailboxConfig::from_toml(&table).unwrap();
    assert_eq!(config, MailboxConfig::default());
  }

  #[test]
  fn test_mailbox_config_rejects_unknown_kind() {
    let table: toml::Table = r#"mailbox-type = "banana""#.parse().unwrap();
    assert!(MailboxConfig::from_toml(&table).is_err());
  }

  #[test]
  fn test_bounded_requires_capacity() {
    let table: toml::Table = r#"
      mailbox-type = "bounded"
      push-timeout = 0
    "#
    .parse()
    .unwrap();
    let config = MailboxConfig::from_toml(&table).unwrap();
    assert!(matches!(
      config.mailbox_type(None),
      Err(MailboxCreationError::InvalidArgument { .. })
    ));
  }

  #[test]
  fn test_dispatcher_config_validates_throughput() {
    assert!(DispatcherConfig::new(0, None).is_err());
    let config = DispatcherConfig::new(10, Some(Duration::from_millis(100))).unwrap();
    assert_eq!(config.throughput(), 10);
    assert_eq!(config.throughput_deadline_time(), Some(Duration::from_millis(100)));
  }

  #[test]
  fn test_dispatcher_config_from_toml_defaults() {
    let table: toml::Table = "".parse().unwrap();
    let config = DispatcherConfig::from_toml(&table).unwrap();
    assert_eq!(config, DispatcherConfig::default());
    assert!(config.throughput_bounded());
  }

  #[test]
  fn test_dispatcher_config_throughput_bounded_off() {
    let table: toml::Table = r#"
      throughput = 10
      throughput-bounded = false
    "#
    .parse()
    .unwrap();
    let config = DispatcherConfig::from_toml(&table).unwrap();
    assert_eq!(config.throughput(), 10);
    assert!(!config.throughput_bounded());
  }
}
