pub mod canned;
pub mod event;
pub mod message;
pub mod slots;

pub use canned::CannedReply;
pub use event::IntakeEvent;
pub use message::{Message, MessageFilter, MessageStatus};
pub use slots::{Intent, Service, Slots};
