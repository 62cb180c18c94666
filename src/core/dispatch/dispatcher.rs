use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::config::DispatcherConfig;
use crate::core::actor::actor_cell::ActorCell;
use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::system_message::system_message::SystemMessage;

/// Executor for mailboxes. Scheduling is gated by the mailbox's own CAS
/// (`set_as_scheduled`), so a mailbox is never resident in the run queue
/// twice and `run` executes on one worker at a time.
#[derive(Clone)]
pub struct Dispatcher {
  inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
  runtime: Arc<Runtime>,
  config: DispatcherConfig,
  tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Debug for Dispatcher {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Dispatcher").field("config", &self.inner.config).finish()
  }
}

impl Dispatcher {
  pub fn new(runtime: Arc<Runtime>, config: DispatcherConfig) -> Self {
    Self {
      inner: Arc::new(DispatcherInner {
        runtime,
        config,
        tasks: Mutex::new(Vec::new()),
      }),
    }
  }

  pub fn throughput(&self) -> usize {
    self.inner.config.throughput()
  }

  pub fn is_throughput_bounded(&self) -> bool {
    self.inner.config.throughput_bounded()
  }

  pub fn throughput_deadline_time(&self) -> Option<Duration> {
    self.inner.config.throughput_deadline_time()
  }

  pub fn is_throughput_deadline_time_defined(&self) -> bool {
    self.throughput_deadline_time().is_some()
  }

  /// Consults the mailbox and, only when the scheduled CAS is won, spawns a
  /// run task. Returns whether a task was spawned.
  pub fn register_for_execution(
    &self,
    actor_cell: &ActorCell,
    has_message_hint: bool,
    has_system_message_hint: bool,
  ) -> bool {
    let mailbox = actor_cell.mailbox();
    if mailbox.can_be_scheduled_for_execution(has_message_hint, has_system_message_hint) && mailbox.set_as_scheduled()
    {
      log::debug!("register_for_execution: scheduling {:?}", actor_cell);
      let actor_cell = actor_cell.clone();
      let dispatcher = self.clone();
      let task = self.inner.runtime.spawn(async move {
        let mailbox = actor_cell.mailbox();
        if let Err(error) = mailbox.run(&actor_cell, &dispatcher) {
          log::error!("run failed at {}: {}", actor_cell.path(), error);
        }
      });
      self.inner.tasks.lock().unwrap().push(task);
      true
    } else {
      false
    }
  }

  /// Enqueues a user envelope and requests scheduling.
  pub fn dispatch(&self, actor_cell: &ActorCell, envelope: Envelope) -> Result<()> {
    actor_cell.mailbox().enqueue(envelope)?;
    self.register_for_execution(actor_cell, true, false);
    Ok(())
  }

  /// Enqueues a system message and requests scheduling.
  pub fn system_dispatch(&self, actor_cell: &ActorCell, message: SystemMessage) {
    actor_cell.mailbox().system_enqueue(message);
    self.register_for_execution(actor_cell, false, true);
  }

  /// Drains every spawned run task, including ones spawned while draining.
  pub fn join(&self) {
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .unwrap();
    loop {
      let task_opt = {
        let mut tasks = self.inner.tasks.lock().unwrap();
        tasks.pop()
      };
      match task_opt {
        Some(task) => {
          let _ = runtime.block_on(task);
        }
        None => break,
      }
    }
  }
}
