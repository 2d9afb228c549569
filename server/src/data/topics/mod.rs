//! Live span rooms
//!
//! In-process pub/sub for pushing freshly ingested spans to dashboard
//! clients. Rooms are ephemeral: nothing is persisted and a subscriber only
//! sees spans published after it joined.

mod error;
mod rooms;

pub use error::TopicError;
pub use rooms::{RoomHub, RoomSubscription};
