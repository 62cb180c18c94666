use crate::core::actor::actor_path::ActorPath;
use crate::core::dispatch::envelope::Envelope;
use crate::core::dispatch::system_message::system_message::SystemMessage;

/// A message that could no longer be delivered because its mailbox closed,
/// together with the identities on both ends of the failed delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadLetter {
  pub message: DeadLetterMessage,
  pub sender: Option<ActorPath>,
  pub recipient: ActorPath,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeadLetterMessage {
  User(Envelope),
  System(SystemMessage),
}

impl DeadLetter {
  pub fn of_user(envelope: Envelope, recipient: ActorPath) -> Self {
    let sender = envelope.sender().cloned();
    DeadLetter {
      message: DeadLetterMessage::User(envelope),
      sender,
      recipient,
    }
  }

  pub fn of_system(message: SystemMessage, recipient: ActorPath) -> Self {
    DeadLetter {
      message: DeadLetterMessage::System(message),
      sender: None,
      recipient,
    }
  }
}
