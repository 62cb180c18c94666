use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::actor::actor_path::ActorPath;
use crate::core::actor::ActorError;

/// Events the dispatch layer publishes for the surrounding runtime to observe.
#[derive(Debug, Clone, PartialEq)]
pub enum MailboxEvent {
  SystemInvokeFailed {
    error: ActorError,
    path: ActorPath,
    dropped_count: usize,
  },
}

pub trait EventStreamSubscriberBehavior: Send + Sync {
  fn on_event(&self, event: &MailboxEvent);
}

struct EventStreamSubscription {
  id: u64,
  subscriber: Arc<dyn EventStreamSubscriberBehavior>,
}

/// Process-wide fanout for mailbox error events. Subscriber callbacks run
/// outside the subscriber lock so they may themselves publish or unsubscribe.
pub struct EventStream {
  subscriptions: Mutex<Vec<EventStreamSubscription>>,
  subscription_serial: AtomicU64,
}

impl Debug for EventStream {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let count = self.subscriptions.lock().unwrap().len();
    f.debug_struct("EventStream").field("subscribers", &count).finish()
  }
}

impl EventStream {
  pub fn new() -> Self {
    Self {
      subscriptions: Mutex::new(Vec::new()),
      subscription_serial: AtomicU64::new(0),
    }
  }

  pub fn subscribe(&self, subscriber: Arc<dyn EventStreamSubscriberBehavior>) -> u64 {
    let id = self.subscription_serial.fetch_add(1, Ordering::Relaxed);
    let mut mg = self.subscriptions.lock().unwrap();
    mg.push(EventStreamSubscription { id, subscriber });
    id
  }

  pub fn unsubscribe(&self, id: u64) -> bool {
    let mut mg = self.subscriptions.lock().unwrap();
    let before = mg.len();
    mg.retain(|subscription| subscription.id != id);
    mg.len() != before
  }

  pub fn publish(&self, event: MailboxEvent) {
    match &event {
      MailboxEvent::SystemInvokeFailed {
        error,
        path,
        dropped_count,
      } => {
        log::error!(
          "system message handler failed at {}: {} ({} undelivered dropped)",
          path,
          error,
          dropped_count
        );
      }
    }
    let snapshot: Vec<Arc<dyn EventStreamSubscriberBehavior>> = {
      let mg = self.subscriptions.lock().unwrap();
      mg.iter().map(|subscription| subscription.subscriber.clone()).collect()
    };
    for subscriber in snapshot {
      subscriber.on_event(&event);
    }
  }
}

impl Default for EventStream {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::env;

  fn init_logger() {
    env::set_var("RUST_LOG", "info");
    let _ = env_logger::builder().is_test(true).try_init();
  }

  #[derive(Debug)]
  struct RecordingSubscriber {
    received: Mutex<Vec<MailboxEvent>>,
  }

  impl EventStreamSubscriberBehavior for RecordingSubscriber {
    fn on_event(&self, event: &MailboxEvent) {
      self.received.lock().unwrap().push(event.clone());
    }
  }

  #[test]
  fn test_publish_reaches_subscribers() {
    init_logger();
    let stream = EventStream::new();
    let subscriber = Arc::new(RecordingSubscriber {
      received: Mutex::new(Vec::new()),
    });
    let id = stream.subscribe(subscriber.clone());

    let event = MailboxEvent::SystemInvokeFailed {
      error: ActorError::of_failed("boom"),
      path: ActorPath::of_root("user").of_child("a"),
      dropped_count: 2,
    };
    stream.publish(event.clone());

    assert_eq!(subscriber.received.lock().unwrap().as_slice(), &[event.clone()]);

    assert!(stream.unsubscribe(id));
    stream.publish(event);
    assert_eq!(subscriber.received.lock().unwrap().len(), 1);
  }
}
