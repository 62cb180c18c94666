use std::any::Any;
use std::fmt::Debug;

/// Marker for user message payloads carried by envelopes.
pub trait Message: Any + Debug + Send + Sync + 'static {}

impl<T: Any + Debug + Send + Sync + 'static> Message for T {}
