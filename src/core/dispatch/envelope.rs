use std::fmt;
use std::fmt::{Display, Formatter};

use crate::core::actor::actor_path::ActorPath;
use crate::core::dispatch::any_message::{AnyMessage, DowncastAnyMessageError};
use crate::core::dispatch::message::Message;

/// A user message paired with its sender identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
  message: AnyMessage,
  sender: Option<ActorPath>,
}

impl Envelope {
  pub fn new<T: Message>(message: T) -> Self {
    Envelope {
      message: AnyMessage::new(message),
      sender: None,
    }
  }

  pub fn new_with_sender<T: Message>(message: T, sender: ActorPath) -> Self {
    Envelope {
      message: AnyMessage::new(message),
      sender: Some(sender),
    }
  }

  pub fn message(&self) -> &AnyMessage {
    &self.message
  }

  pub fn typed_message<T: Message + Clone>(&self) -> Result<T, DowncastAnyMessageError> {
    self.message.take::<T>()
  }

  pub fn sender(&self) -> Option<&ActorPath> {
    self.sender.as_ref()
  }
}

impl Display for Envelope {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match &self.sender {
      Some(sender) => write!(f, "Envelope({} from {})", self.message.type_name(), sender),
      None => write!(f, "Envelope({})", self.message.type_name()),
    }
  }
}
