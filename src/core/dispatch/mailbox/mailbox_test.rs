use std::env;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::DispatcherConfig;
use crate::core::actor::actor_cell::ActorCell;
use crate::core::actor::actor_path::ActorPath;
use crate::core::actor::{ActorBehavior, ActorError, ActorResult};
use crate::core::dispatch::dispatcher::Dispatcher;
use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::mailbox::dead_letter::DeadLetter;
use crate::core::dispatch::mailbox::dead_letter_mailbox::DeadLetterMailbox;
use crate::core::dispatch::mailbox::mailbox::Mailbox;
use crate::core::dispatch::mailbox::mailbox_type::MailboxType;
use crate::core::dispatch::mailbox::MailboxBehavior;
use crate::core::dispatch::message_queue::{EnvelopeComparator, MessageQueueSize};
use crate::core::dispatch::system_message::system_message::SystemMessage;
use crate::core::event_stream::{EventStream, EventStreamSubscriberBehavior, MailboxEvent};

fn init_logger() {
  env::set_var("RUST_LOG", "debug");
  let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
enum Invocation {
  User(String),
  System(String),
}

#[derive(Debug)]
struct RecordingActor {
  invocations: Arc<Mutex<Vec<Invocation>>>,
  mailbox: Arc<Mutex<Option<Mailbox>>>,
  suspend_on: Option<String>,
  resume_on_resume: bool,
  fail_on_terminate: bool,
}

impl ActorBehavior for RecordingActor {
  fn receive(&mut self, envelope: &Envelope) -> ActorResult<()> {
    let text = envelope
      .typed_message::<String>()
      .map_err(|e| ActorError::of_failed(e.to_string()))?;
    self.invocations.lock().unwrap().push(Invocation::User(text.clone()));
    if self.suspend_on.as_deref() == Some(text.as_str()) {
      if let Some(mailbox) = self.mailbox.lock().unwrap().as_ref() {
        mailbox.suspend();
      }
    }
    Ok(())
  }

  fn system_receive(&mut self, message: &SystemMessage) -> ActorResult<()> {
    if self.fail_on_terminate && matches!(message, SystemMessage::Terminate) {
      return Err(ActorError::of_failed("terminate handler failed"));
    }
    self
      .invocations
      .lock()
      .unwrap()
      .push(Invocation::System(format!("{:?}", message)));
    if self.resume_on_resume && matches!(message, SystemMessage::Resume { .. }) {
      if let Some(mailbox) = self.mailbox.lock().unwrap().as_ref() {
        mailbox.resume();
      }
    }
    Ok(())
  }
}

struct Fixture {
  cell: ActorCell,
  mailbox: Mailbox,
  invocations: Arc<Mutex<Vec<Invocation>>>,
  event_stream: Arc<EventStream>,
  dead_letter_mailbox: DeadLetterMailbox,
}

fn fixture_with(mailbox_type: MailboxType, configure: impl FnOnce(&mut RecordingActor)) -> Fixture {
  let invocations = Arc::new(Mutex::new(Vec::new()));
  let mailbox_slot = Arc::new(Mutex::new(None));
  let mut actor = RecordingActor {
    invocations: invocations.clone(),
    mailbox: mailbox_slot.clone(),
    suspend_on: None,
    resume_on_resume: false,
    fail_on_terminate: false,
  };
  configure(&mut actor);

  let mailbox = Mailbox::new(mailbox_type);
  *mailbox_slot.lock().unwrap() = Some(mailbox.clone());
  let event_stream = Arc::new(EventStream::new());
  let dead_letter_mailbox = DeadLetterMailbox::new();
  let cell = ActorCell::new(
    ActorPath::of_root("user").of_child("subject"),
    Box::new(actor),
    mailbox.clone(),
    event_stream.clone(),
    dead_letter_mailbox.clone(),
  );
  Fixture {
    cell,
    mailbox,
    invocations,
    event_stream,
    dead_letter_mailbox,
  }
}

fn fixture(mailbox_type: MailboxType) -> Fixture {
  fixture_with(mailbox_type, |_| {})
}

/// Dispatcher whose runtime is never driven: run tasks spawned by the final
/// re-registration stay pending, keeping direct `run` calls deterministic.
fn direct_dispatcher(throughput: i64) -> Dispatcher {
  let runtime = Arc::new(
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .unwrap(),
  );
  Dispatcher::new(runtime, DispatcherConfig::new(throughput, None).unwrap())
}

fn threaded_dispatcher(throughput: i64) -> Dispatcher {
  let runtime = Arc::new(
    tokio::runtime::Builder::new_multi_thread()
      .worker_threads(2)
      .enable_all()
      .build()
      .unwrap(),
  );
  Dispatcher::new(runtime, DispatcherConfig::new(throughput, None).unwrap())
}

fn user(text: &str) -> Invocation {
  Invocation::User(text.to_owned())
}

#[test]
fn test_basic_ordering() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());
  let dispatcher = direct_dispatcher(10);

  for text in ["A", "B", "C"] {
    f.mailbox.enqueue(Envelope::new(text.to_owned())).unwrap();
  }

  assert!(f.mailbox.set_as_scheduled());
  f.mailbox.run(&f.cell, &dispatcher).unwrap();

  assert_eq!(
    f.invocations.lock().unwrap().as_slice(),
    &[user("A"), user("B"), user("C")]
  );
  assert!(f.mailbox.should_process_message());
  assert!(!f.mailbox.is_scheduled());
  assert!(!f.mailbox.has_messages());
}

#[test]
fn test_system_messages_processed_first() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());
  let dispatcher = direct_dispatcher(10);

  f.mailbox.enqueue(Envelope::new("U1".to_owned())).unwrap();
  f.mailbox.system_enqueue(SystemMessage::of_suspend());
  f.mailbox.enqueue(Envelope::new("U2".to_owned())).unwrap();

  assert!(f.mailbox.set_as_scheduled());
  f.mailbox.run(&f.cell, &dispatcher).unwrap();

  assert_eq!(
    f.invocations.lock().unwrap().as_slice(),
    &[Invocation::System("Suspend".to_owned()), user("U1"), user("U2")]
  );
}

#[test]
fn test_suspend_mid_batch_stops_user_processing() {
  init_logger();
  let f = fixture_with(MailboxType::of_unbounded(), |actor| {
    actor.suspend_on = Some("U2".to_owned());
  });
  let dispatcher = direct_dispatcher(10);

  for text in ["U1", "U2", "U3", "U4", "U5"] {
    f.mailbox.enqueue(Envelope::new(text.to_owned())).unwrap();
  }

  assert!(f.mailbox.set_as_scheduled());
  f.mailbox.run(&f.cell, &dispatcher).unwrap();

  assert_eq!(f.invocations.lock().unwrap().as_slice(), &[user("U1"), user("U2")]);
  assert_eq!(f.mailbox.number_of_messages(), MessageQueueSize::Limited(3));
  assert!(f.mailbox.is_suspended());
  assert!(!f.mailbox.is_scheduled());
  // user messages alone do not wake a suspended mailbox
  assert!(!f.mailbox.can_be_scheduled_for_execution(true, false));
}

#[test]
fn test_bounded_enqueue_times_out() {
  init_logger();
  let mailbox_type = MailboxType::of_bounded(2, Some(Duration::from_millis(50))).unwrap();
  let f = fixture(mailbox_type);

  let a = Envelope::new("A".to_owned());
  let b = Envelope::new("B".to_owned());
  f.mailbox.enqueue(a.clone()).unwrap();
  f.mailbox.enqueue(b.clone()).unwrap();

  let started = Instant::now();
  let result = f.mailbox.enqueue(Envelope::new("C".to_owned()));
  assert!(result.is_err());
  assert!(started.elapsed() >= Duration::from_millis(50));

  assert_eq!(f.mailbox.number_of_messages(), MessageQueueSize::Limited(2));
  assert_eq!(f.mailbox.dequeue().unwrap(), Some(a));
  assert_eq!(f.mailbox.dequeue().unwrap(), Some(b));
}

#[test]
fn test_close_drains_to_dead_letters() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());

  let u1 = Envelope::new("U1".to_owned());
  let u2 = Envelope::new("U2".to_owned());
  f.mailbox.enqueue(u1.clone()).unwrap();
  f.mailbox.enqueue(u2.clone()).unwrap();
  f.mailbox.system_enqueue(SystemMessage::of_terminate());

  assert!(f.mailbox.become_closed());
  f.mailbox.clean_up(&f.cell);

  let recipient = f.cell.path().clone();
  assert_eq!(
    f.dead_letter_mailbox.drain_dead_letters(),
    vec![
      DeadLetter::of_system(SystemMessage::of_terminate(), recipient.clone()),
      DeadLetter::of_user(u1, recipient.clone()),
      DeadLetter::of_user(u2, recipient)
    ]
  );
  assert!(!f.mailbox.has_messages());
  assert!(!f.mailbox.has_system_messages());
}

#[test]
fn test_clean_up_on_empty_mailbox_is_noop() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());

  assert!(f.mailbox.become_closed());
  f.mailbox.clean_up(&f.cell);

  assert_eq!(f.dead_letter_mailbox.number_of_dead_letters(), 0);
}

#[test]
fn test_priority_mailbox_invokes_in_priority_order() {
  init_logger();
  let comparator: EnvelopeComparator = Arc::new(|a, b| {
    let left: i32 = a.typed_message::<String>().unwrap().parse().unwrap();
    let right: i32 = b.typed_message::<String>().unwrap().parse().unwrap();
    left.cmp(&right)
  });
  let f = fixture(MailboxType::of_unbounded_priority(comparator));
  let dispatcher = direct_dispatcher(10);

  for text in ["5", "1", "3", "2"] {
    f.mailbox.enqueue(Envelope::new(text.to_owned())).unwrap();
  }

  assert!(f.mailbox.set_as_scheduled());
  f.mailbox.run(&f.cell, &dispatcher).unwrap();

  assert_eq!(
    f.invocations.lock().unwrap().as_slice(),
    &[user("1"), user("2"), user("3"), user("5")]
  );
}

#[test]
fn test_run_on_closed_mailbox_clears_scheduled() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());
  let dispatcher = direct_dispatcher(10);

  f.mailbox.enqueue(Envelope::new("U1".to_owned())).unwrap();
  f.mailbox.system_enqueue(SystemMessage::of_terminate());

  assert!(f.mailbox.set_as_scheduled());
  assert!(f.mailbox.become_closed());
  f.mailbox.run(&f.cell, &dispatcher).unwrap();

  assert!(f.invocations.lock().unwrap().is_empty());
  assert!(!f.mailbox.is_scheduled());
  assert!(f.mailbox.is_closed());
}

#[test]
fn test_throughput_bound_limits_invocations_per_run() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());
  let dispatcher = direct_dispatcher(10);

  for i in 0..25 {
    f.mailbox.enqueue(Envelope::new(format!("M{}", i))).unwrap();
  }

  assert!(f.mailbox.set_as_scheduled());
  f.mailbox.run(&f.cell, &dispatcher).unwrap();

  assert_eq!(f.invocations.lock().unwrap().len(), 10);
  assert_eq!(f.mailbox.number_of_messages(), MessageQueueSize::Limited(15));
}

#[test]
fn test_unbatched_dispatcher_delivers_one_message_per_run() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());
  let runtime = Arc::new(
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .unwrap(),
  );
  let config = DispatcherConfig::new_with_throughput_bounded(5, false, None).unwrap();
  let dispatcher = Dispatcher::new(runtime, config);

  for text in ["A", "B"] {
    f.mailbox.enqueue(Envelope::new(text.to_owned())).unwrap();
  }

  assert!(f.mailbox.set_as_scheduled());
  f.mailbox.run(&f.cell, &dispatcher).unwrap();

  assert_eq!(f.invocations.lock().unwrap().as_slice(), &[user("A")]);
  assert_eq!(f.mailbox.number_of_messages(), MessageQueueSize::Limited(1));
}

#[derive(Debug)]
struct CapturingSubscriber {
  events: Mutex<Vec<MailboxEvent>>,
}

impl EventStreamSubscriberBehavior for CapturingSubscriber {
  fn on_event(&self, event: &MailboxEvent) {
    self.events.lock().unwrap().push(event.clone());
  }
}

#[test]
fn test_system_invoke_failure_publishes_event_and_reraises() {
  init_logger();
  let f = fixture_with(MailboxType::of_unbounded(), |actor| {
    actor.fail_on_terminate = true;
  });
  let dispatcher = direct_dispatcher(10);
  let subscriber = Arc::new(CapturingSubscriber {
    events: Mutex::new(Vec::new()),
  });
  f.event_stream.subscribe(subscriber.clone());

  f.mailbox.system_enqueue(SystemMessage::of_suspend());
  f.mailbox.system_enqueue(SystemMessage::of_terminate());
  f.mailbox.system_enqueue(SystemMessage::of_resume());
  f.mailbox.system_enqueue(SystemMessage::of_create());

  assert!(f.mailbox.set_as_scheduled());
  let result = f.mailbox.run(&f.cell, &dispatcher);
  assert!(result.is_err());

  // only the message before the failure was delivered; the tail was dropped
  assert_eq!(
    f.invocations.lock().unwrap().as_slice(),
    &[Invocation::System("Suspend".to_owned())]
  );
  assert!(!f.mailbox.has_system_messages());
  assert!(!f.mailbox.is_scheduled());

  let events = subscriber.events.lock().unwrap();
  assert_eq!(events.len(), 1);
  match &events[0] {
    MailboxEvent::SystemInvokeFailed {
      error,
      path,
      dropped_count,
    } => {
      assert_eq!(error, &ActorError::of_failed("terminate handler failed"));
      assert_eq!(path.to_string(), "/user/subject");
      assert_eq!(*dropped_count, 2);
    }
  }
}

#[test]
fn test_set_as_scheduled_has_single_winner() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());

  let winners: Vec<bool> = {
    let handles: Vec<_> = (0..8)
      .map(|_| {
        let mailbox = f.mailbox.clone();
        thread::spawn(move || mailbox.set_as_scheduled())
      })
      .collect();
    handles.into_iter().map(|handle| handle.join().unwrap()).collect()
  };

  assert_eq!(winners.iter().filter(|won| **won).count(), 1);
  assert!(f.mailbox.is_scheduled());
}

#[test]
fn test_dispatcher_end_to_end() {
  init_logger();
  let f = fixture(MailboxType::of_unbounded());
  let dispatcher = threaded_dispatcher(10);

  for text in ["A", "B", "C"] {
    dispatcher.dispatch(&f.cell, Envelope::new(text.to_owned())).unwrap();
  }
  dispatcher.join();

  assert_eq!(
    f.invocations.lock().unwrap().as_slice(),
    &[user("A"), user("B"), user("C")]
  );
  assert!(!f.mailbox.is_scheduled());
  assert!(!f.mailbox.has_messages());
}

#[test]
fn test_system_dispatch_wakes_suspended_mailbox() {
  init_logger();
  let f = fixture_with(MailboxType::of_unbounded(), |actor| {
    actor.resume_on_resume = true;
  });
  let dispatcher = threaded_dispatcher(10);

  assert!(f.mailbox.suspend());
  dispatcher.dispatch(&f.cell, Envelope::new("U1".to_owned())).unwrap();
  // a user message alone does not schedule a suspended mailbox
  assert!(!f.mailbox.is_scheduled());

  dispatcher.system_dispatch(&f.cell, SystemMessage::of_resume());
  dispatcher.join();

  assert_eq!(
    f.invocations.lock().unwrap().as_slice(),
    &[Invocation::System("Resume { caused_by_failure: None }".to_owned()), user("U1")]
  );
  assert!(f.mailbox.should_process_message());
}
