//! Domain entities - core business objects

mod message;
mod online_user;
mod user;

pub use message::Message;
pub use online_user::OnlineUser;
pub use user::User;
