use crate::core::actor::actor_path::ActorPath;
use crate::core::actor::ActorError;

/// Lifecycle control message; always delivered ahead of any user message.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemMessage {
  Create {
    failure: Option<ActorError>,
  },
  Suspend,
  Resume {
    caused_by_failure: Option<ActorError>,
  },
  Terminate,
  Watch {
    watchee: ActorPath,
    watcher: ActorPath,
  },
}

impl SystemMessage {
  pub fn of_create() -> Self {
    SystemMessage::Create { failure: None }
  }

  pub fn of_create_with_failure(failure: Option<ActorError>) -> Self {
    SystemMessage::Create { failure }
  }

  pub fn of_suspend() -> Self {
    SystemMessage::Suspend
  }

  pub fn of_resume() -> Self {
    SystemMessage::Resume {
      caused_by_failure: None,
    }
  }

  pub fn of_resume_with_failure(caused_by_failure: Option<ActorError>) -> Self {
    SystemMessage::Resume { caused_by_failure }
  }

  pub fn of_terminate() -> Self {
    SystemMessage::Terminate
  }

  pub fn of_watch(watchee: ActorPath, watcher: ActorPath) -> Self {
    SystemMessage::Watch { watchee, watcher }
  }
}
