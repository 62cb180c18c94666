use std::fmt::Debug;

use thiserror::Error;

use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::system_message::system_message::SystemMessage;

pub mod actor_cell;
pub mod actor_path;

pub type ActorResult<A> = Result<A, ActorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActorError {
  #[error("Actor failed: {message}")]
  ActorFailed { message: String },
}

impl ActorError {
  pub fn of_failed(message: impl Into<String>) -> Self {
    ActorError::ActorFailed {
      message: message.into(),
    }
  }
}

/// User code invoked by the mailbox run loop. Both hooks are opaque to the
/// dispatch layer; errors escape through `run` for the layer above to handle.
pub trait ActorBehavior: Debug + Send {
  fn receive(&mut self, envelope: &Envelope) -> ActorResult<()>;

  fn system_receive(&mut self, _message: &SystemMessage) -> ActorResult<()> {
    Ok(())
  }
}
