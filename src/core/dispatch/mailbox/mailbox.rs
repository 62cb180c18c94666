use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::core::actor::actor_cell::ActorCell;
use crate::core::actor::ActorResult;
use crate::core::dispatch::dispatcher::Dispatcher;
use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::mailbox::dead_letter_mailbox::DeadLetterSinkBehavior;
use crate::core::dispatch::mailbox::mailbox_status::{MailboxStatus, StatusWord};
use crate::core::dispatch::mailbox::mailbox_type::MailboxType;
use crate::core::dispatch::mailbox::system_queue::SystemQueue;
use crate::core::dispatch::mailbox::{EnqueueError, MailboxBehavior};
use crate::core::dispatch::message_queue::{
  MessageQueue, MessageQueueBehavior, MessageQueueReaderBehavior, MessageQueueSize, MessageQueueWriterBehavior,
};
use crate::core::dispatch::system_message::system_message::SystemMessage;
use crate::core::dispatch::system_message::system_message_entry::SystemMessageEntry;
use crate::core::event_stream::MailboxEvent;
use crate::infrastructure::queue::QueueError;

/// Per-actor queue assembly plus status word; the unit the dispatcher
/// schedules. Clones share the same underlying mailbox.
///
/// Producers touch only the status word, the system queue head and the user
/// queue; the status word and system queue are lock-free, the user queue
/// carries its variant's own synchronization.
#[derive(Clone)]
pub struct Mailbox {
  inner: Arc<MailboxInner>,
}

struct MailboxInner {
  mailbox_type: MailboxType,
  status: StatusWord,
  system_queue: SystemQueue,
  message_queue: MessageQueue,
}

impl Debug for Mailbox {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Mailbox")
      .field("mailbox_type", &self.inner.mailbox_type)
      .field("status", &self.inner.status.status())
      .field("messages", &self.number_of_messages())
      .field("has_system_messages", &self.has_system_messages())
      .finish()
  }
}

impl PartialEq for Mailbox {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Mailbox {
  pub fn new(mailbox_type: MailboxType) -> Self {
    let message_queue = mailbox_type.create_message_queue();
    Self {
      inner: Arc::new(MailboxInner {
        mailbox_type,
        status: StatusWord::new(),
        system_queue: SystemQueue::new(),
        message_queue,
      }),
    }
  }

  pub fn mailbox_type(&self) -> &MailboxType {
    &self.inner.mailbox_type
  }

  // --- status word delegations

  pub fn status(&self) -> u32 {
    self.inner.status.status()
  }

  pub fn should_process_message(&self) -> bool {
    self.inner.status.should_process_message()
  }

  pub fn is_suspended(&self) -> bool {
    self.inner.status.is_suspended()
  }

  pub fn is_closed(&self) -> bool {
    self.inner.status.is_closed()
  }

  pub fn is_scheduled(&self) -> bool {
    self.inner.status.is_scheduled()
  }

  /// Stops user message processing; system messages keep flowing.
  pub fn suspend(&self) -> bool {
    self.inner.status.become_suspended()
  }

  pub fn resume(&self) -> bool {
    self.inner.status.become_open()
  }

  pub fn become_closed(&self) -> bool {
    self.inner.status.become_closed()
  }

  pub fn set_as_scheduled(&self) -> bool {
    self.inner.status.set_as_scheduled()
  }

  pub fn set_as_idle(&self) {
    self.inner.status.set_as_idle()
  }

  // --- enqueue surface

  /// Forwards to the user queue. Fails only for the bounded variants, after
  /// the push timeout elapses. Thread-safe.
  pub fn enqueue(&self, envelope: Envelope) -> Result<()> {
    match self.inner.message_queue.enqueue(envelope) {
      Ok(()) => Ok(()),
      Err(error) => match error.downcast::<QueueError<Envelope>>() {
        Ok(QueueError::PushTimeoutError { element, .. }) | Ok(QueueError::OfferError(element)) => {
          Err(anyhow::Error::new(EnqueueError::new(&element, format!("{:?}", self))))
        }
        Ok(other) => Err(anyhow::Error::new(other)),
        Err(error) => Err(error),
      },
    }
  }

  /// Pushes a lifecycle message; never blocks, never fails. Thread-safe.
  pub fn system_enqueue(&self, message: SystemMessage) {
    self.inner.system_queue.system_enqueue(SystemMessageEntry::new(message));
  }

  pub fn dequeue(&self) -> Result<Option<Envelope>> {
    self.inner.message_queue.dequeue()
  }

  /// Whether the dispatcher should schedule this mailbox now.
  ///
  /// Open: any of the four has-message signals. Closed: never. Suspended:
  /// only system messages wake the mailbox.
  pub fn can_be_scheduled_for_execution(&self, has_message_hint: bool, has_system_message_hint: bool) -> bool {
    match self.inner.status.primary() {
      MailboxStatus::Open => {
        has_message_hint || has_system_message_hint || self.has_system_messages() || self.has_messages()
      }
      MailboxStatus::Closed => false,
      MailboxStatus::Suspended => has_system_message_hint || self.has_system_messages(),
    }
  }

  // --- dispatcher entry point

  /// Drains system messages to exhaustion, then user messages up to the
  /// dispatcher's throughput bound, then clears the scheduled bit and
  /// re-registers unconditionally with false hints. The re-registration
  /// recovers arrivals that raced with `set_as_idle`.
  pub fn run(&self, actor_cell: &ActorCell, dispatcher: &Dispatcher) -> ActorResult<()> {
    log::debug!("run: start, mailbox = {:?}", self);
    let result = if self.is_closed() {
      Ok(())
    } else {
      self
        .process_all_system_messages(actor_cell)
        .and_then(|()| self.process_mailbox(actor_cell, dispatcher))
    };
    self.set_as_idle();
    dispatcher.register_for_execution(actor_cell, false, false);
    log::debug!("run: finished, mailbox = {:?}", self);
    result
  }

  /// No user message is processed while any system message is pending: the
  /// queue is drained, delivered in order, then drained again until empty.
  /// A handler failure is published with the count of the undelivered tail,
  /// which is dropped, and the error re-raised.
  fn process_all_system_messages(&self, actor_cell: &ActorCell) -> ActorResult<()> {
    loop {
      let mut chain = self.inner.system_queue.system_drain();
      if chain.is_empty() {
        return Ok(());
      }
      while let Some(entry) = chain.next() {
        log::debug!("system_invoke: {:?}", entry.message);
        if let Err(error) = actor_cell.system_invoke(&entry.message) {
          let dropped_count = chain.len();
          actor_cell.event_stream().publish(MailboxEvent::SystemInvokeFailed {
            error: error.clone(),
            path: actor_cell.path().clone(),
            dropped_count,
          });
          return Err(error);
        }
      }
    }
  }

  fn process_mailbox(&self, actor_cell: &ActorCell, dispatcher: &Dispatcher) -> ActorResult<()> {
    if !self.should_process_message() {
      return Ok(());
    }
    let first = match self.dequeue() {
      Ok(Some(envelope)) => envelope,
      Ok(None) => return Ok(()),
      Err(error) => {
        log::error!("dequeue failed: {:?}", error);
        return Ok(());
      }
    };

    if dispatcher.is_throughput_bounded() {
      let deadline = dispatcher.throughput_deadline_time().map(|d| Instant::now() + d);
      let mut envelope = first;
      let mut processed = 0;
      loop {
        actor_cell.invoke(&envelope)?;
        self.process_all_system_messages(actor_cell)?;
        if !self.should_process_message() {
          break;
        }
        processed += 1;
        if processed >= dispatcher.throughput() {
          break;
        }
        if let Some(deadline) = deadline {
          if Instant::now() >= deadline {
            break;
          }
        }
        envelope = match self.dequeue() {
          Ok(Some(next)) => next,
          Ok(None) => break,
          Err(error) => {
            log::error!("dequeue failed: {:?}", error);
            break;
          }
        };
      }
    } else {
      actor_cell.invoke(&first)?;
      self.process_all_system_messages(actor_cell)?;
    }
    Ok(())
  }

  /// Drains whatever is left into the dead letter sink under the actor's
  /// path as recipient: the system chain first, then the user queue. Every
  /// forwarded entry is unlinked. Called once by the runtime after the
  /// mailbox closed and the actor was de-registered; never concurrent with
  /// `run`.
  pub fn clean_up(&self, actor_cell: &ActorCell) {
    let dead_letter_mailbox = actor_cell.dead_letter_mailbox();
    let recipient = actor_cell.path();
    loop {
      let chain = self.inner.system_queue.system_drain();
      if chain.is_empty() {
        break;
      }
      for entry in chain {
        dead_letter_mailbox.system_enqueue(entry, recipient.clone());
      }
    }
    loop {
      match self.dequeue() {
        Ok(Some(envelope)) => dead_letter_mailbox.enqueue(envelope, recipient.clone()),
        Ok(None) => break,
        Err(error) => {
          log::error!("clean_up: dequeue failed: {:?}", error);
          break;
        }
      }
    }
  }
}

impl MailboxBehavior for Mailbox {
  fn number_of_messages(&self) -> MessageQueueSize {
    self.inner.message_queue.number_of_messages()
  }

  fn has_messages(&self) -> bool {
    self.inner.message_queue.has_messages()
  }

  fn has_system_messages(&self) -> bool {
    self.inner.system_queue.has_system_messages()
  }
}
