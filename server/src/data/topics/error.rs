//! Topic error types

use std::fmt;

use tokio::sync::broadcast::error::RecvError;

/// Error type for room subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicError {
    /// Room channel closed
    ChannelClosed,
    /// Receiver lagged behind and missed this many messages
    Lagged(u64),
}

impl std::error::Error for TopicError {}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicError::ChannelClosed => write!(f, "channel closed"),
            TopicError::Lagged(n) => write!(f, "receiver lagged by {} messages", n),
        }
    }
}

impl From<RecvError> for TopicError {
    fn from(err: RecvError) -> Self {
        match err {
            RecvError::Closed => TopicError::ChannelClosed,
            RecvError::Lagged(n) => TopicError::Lagged(n),
        }
    }
}
