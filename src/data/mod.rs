//! External data collaborators.
//!
//! - the live chat-completions client (`chat`)
//! - a deterministic offline stand-in for it (`mock`)
//!
//! Both implement [`QueryService`]; everything downstream only ever sees
//! reply text.

pub mod chat;
pub mod mock;

pub use chat::{ChatClient, QueryService};
pub use mock::MockService;
