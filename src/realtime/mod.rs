pub mod hub;
pub mod socket;

pub use hub::{Audience, EventName, Frame, Hub, Session};
pub use socket::ws_handler;
