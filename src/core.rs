pub mod actor;
pub mod dispatch;
pub mod event_stream;
