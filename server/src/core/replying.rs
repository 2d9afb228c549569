//! Process-wide "agent is replying" flag
//!
//! The dashboard sets it while an agent run is producing a reply and reads
//! it to decide whether to show a pending state. Clones share the flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct ReplyingState(Arc<AtomicBool>);

impl ReplyingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag, returning the previous value
    pub fn set(&self, replying: bool) -> bool {
        self.0.swap(replying, Ordering::AcqRel)
    }
}
