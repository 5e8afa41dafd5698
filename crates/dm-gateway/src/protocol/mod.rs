//! Gateway protocol definitions
//!
//! Op codes, frame format, client payloads and close codes.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::{FrameError, GatewayMessage};
pub use opcodes::OpCode;
pub use payloads::{NotifyTypingPayload, RequestHistoryPayload, SendMessagePayload};
