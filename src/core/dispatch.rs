pub mod any_message;
pub mod dispatcher;
pub mod envelope;
pub mod mailbox;
pub mod mailboxes;
pub mod message;
pub mod message_queue;
pub mod system_message;
