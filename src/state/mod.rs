//! Widget state owned by the controller.
//!
//! DESIGN
//! ======
//! State is plain data mutated only by `ChatWidgetController`; views receive
//! rendered messages and flag changes but never read it back.

pub mod chat;

pub use chat::{ChatMessage, ChatState, Sender};
