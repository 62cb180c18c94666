pub mod system_message;
pub mod system_message_entry;
