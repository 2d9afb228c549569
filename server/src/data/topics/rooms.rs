//! Named broadcast rooms for live span delivery
//!
//! Each room is a `tokio::broadcast` channel created on first subscribe.
//! Publishing to a room nobody joined is a no-op. A room is removed when
//! its last subscription is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::error::TopicError;
use crate::core::constants::ROOM_CHANNEL_CAPACITY;
use crate::domain::traces::SpanData;

type RoomMap = Arc<RwLock<HashMap<String, broadcast::Sender<SpanData>>>>;

/// Registry of live rooms keyed by name (`run-{runId}`)
pub struct RoomHub {
    rooms: RoomMap,
    capacity: usize,
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomHub {
    pub fn new() -> Self {
        Self::with_capacity(ROOM_CHANNEL_CAPACITY)
    }

    /// Create with custom per-room buffer capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Join a room, creating it if needed
    pub fn subscribe(&self, room: &str) -> RoomSubscription {
        {
            let rooms = self.rooms.read();
            if let Some(sender) = rooms.get(room) {
                return RoomSubscription::new(room, sender.subscribe(), &self.rooms);
            }
        }

        let mut rooms = self.rooms.write();
        // Double-check after acquiring write lock
        let sender = rooms.entry(room.to_string()).or_insert_with(|| {
            tracing::debug!(room, "Creating room");
            broadcast::channel(self.capacity).0
        });
        RoomSubscription::new(room, sender.subscribe(), &self.rooms)
    }

    /// Send a span to every subscriber of `room`. Returns how many received it.
    pub fn publish(&self, room: &str, span: SpanData) -> usize {
        let rooms = self.rooms.read();
        match rooms.get(room) {
            // Last receiver may leave between the lookup and the send
            Some(sender) => sender.send(span).unwrap_or(0),
            None => 0,
        }
    }

    /// Number of rooms currently registered
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    /// Number of subscribers in `room`
    pub fn subscriber_count(&self, room: &str) -> usize {
        self.rooms
            .read()
            .get(room)
            .map_or(0, |sender| sender.receiver_count())
    }
}

/// Membership of one room. Leaving the room is dropping this.
pub struct RoomSubscription {
    room: String,
    receiver: broadcast::Receiver<SpanData>,
    rooms: RoomMap,
}

impl RoomSubscription {
    fn new(room: &str, receiver: broadcast::Receiver<SpanData>, rooms: &RoomMap) -> Self {
        Self {
            room: room.to_string(),
            receiver,
            rooms: Arc::clone(rooms),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// Next span in the room. `Lagged(n)` reports `n` spans skipped because
    /// this subscriber fell behind; the following call resumes delivery.
    pub async fn recv(&mut self) -> Result<SpanData, TopicError> {
        self.receiver.recv().await.map_err(TopicError::from)
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        // Joins happen under the lock, so the count cannot grow while we hold it.
        // Our own receiver is still alive here and counts as one.
        let mut rooms = self.rooms.write();
        if rooms
            .get(&self.room)
            .is_some_and(|sender| sender.receiver_count() <= 1)
        {
            rooms.remove(&self.room);
            tracing::debug!(room = %self.room, "Dropped empty room");
        }
    }
}
