use crate::domain::{Clock, ConnId};
use crate::use_cases::GameEvent;
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, broadcast, mpsc};

#[derive(Clone)]
pub struct AppState {
    // Intents flowing from every connection into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Where the fan-out task finds a connection's own queue.
    pub connections: Arc<ConnectionDirectory>,
    pub connection_queue_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Init,
    StateUpdate,
    /// Last frame of a game; the room stops broadcasting after it.
    GameOver,
}

/// One serialized update broadcast to every member of a room.
#[derive(Debug, Clone)]
pub struct RoomFrame {
    pub kind: FrameKind,
    pub bytes: Utf8Bytes,
}

/// Subscription to one room's broadcast, handed over together with the init.
#[derive(Debug)]
pub struct RoomFeed {
    pub room_code: Arc<str>,
    pub frames: broadcast::Receiver<RoomFrame>,
}

/// One serialized update addressed to a single connection.
#[derive(Debug)]
pub struct DirectFrame {
    pub bytes: Utf8Bytes,
    /// Set on init; replaces whatever room the connection followed before.
    pub feed: Option<RoomFeed>,
}

/// Per-connection queues for frames addressed to one connection only.
#[derive(Debug, Default)]
pub struct ConnectionDirectory {
    queues: RwLock<HashMap<ConnId, mpsc::Sender<DirectFrame>>>,
}

impl ConnectionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the queue for `conn_id`, replacing any earlier one.
    pub async fn register(&self, conn_id: &str, capacity: usize) -> mpsc::Receiver<DirectFrame> {
        let (tx, rx) = mpsc::channel(capacity);
        self.queues.write().await.insert(conn_id.to_string(), tx);
        rx
    }

    pub async fn unregister(&self, conn_id: &str) {
        self.queues.write().await.remove(conn_id);
    }

    pub async fn sender(&self, conn_id: &str) -> Option<mpsc::Sender<DirectFrame>> {
        self.queues.read().await.get(conn_id).cloned()
    }
}

// Monotonic clock adapter; milliseconds since the server started.
#[derive(Clone)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
