//! Event delivery
//!
//! The only place outbound events are handed to connection queues.

mod dispatcher;

pub use dispatcher::DeliveryDispatcher;
