//! Data storage layer
//!
//! - `sqlite` - Embedded span store (WAL, versioned migrations)
//! - `topics` - In-process rooms for live span delivery
//! - `traits` - Repository traits the services depend on
//! - `error` - Backend-neutral error type

pub mod error;
pub mod sqlite;
pub mod topics;
pub mod traits;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use topics::{RoomHub, RoomSubscription, TopicError};
pub use traits::SpanRepository;
