// Room update fan-out: one broadcast channel per room, one queue per connection.

use crate::interface_adapters::protocol::ServerMessage;
use crate::interface_adapters::state::{
    ConnectionDirectory, DirectFrame, FrameKind, RoomFeed, RoomFrame,
};
use crate::use_cases::{Delivery, RoomEvent, RoomUpdate};

use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, warn};

/// Serializes each room update once and routes it to the room or connection it
/// is addressed to. Runs until the world task drops its sender.
pub async fn room_update_serializer(
    mut update_rx: mpsc::Receiver<RoomUpdate>,
    connections: Arc<ConnectionDirectory>,
    room_capacity: usize,
) {
    let mut fanout = RoomFanout::new(connections, room_capacity);
    while let Some(update) = update_rx.recv().await {
        fanout.route(update).await;
    }
    warn!("room updates channel closed; serializer exiting");
}

/// Routing state owned by the serializer task.
pub struct RoomFanout {
    connections: Arc<ConnectionDirectory>,
    rooms: HashMap<Arc<str>, broadcast::Sender<RoomFrame>>,
    room_capacity: usize,
}

impl RoomFanout {
    pub fn new(connections: Arc<ConnectionDirectory>, room_capacity: usize) -> Self {
        Self {
            connections,
            rooms: HashMap::new(),
            room_capacity,
        }
    }

    /// Number of rooms that currently have a broadcast channel.
    pub fn room_channels(&self) -> usize {
        self.rooms.len()
    }

    pub async fn route(&mut self, update: RoomUpdate) {
        let RoomUpdate {
            room_code,
            delivery,
            event,
        } = update;
        let kind = frame_kind(&event);
        let bytes = match encode(event) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(room_code = %room_code, error = ?e, "failed to serialize room update");
                return;
            }
        };

        match delivery {
            Delivery::Connection(conn_id) => {
                let Some(queue) = self.connections.sender(&conn_id).await else {
                    debug!(conn_id = %conn_id, "connection gone; frame dropped");
                    return;
                };
                let feed = (kind == FrameKind::Init).then(|| self.subscribe(room_code));
                if let Err(mpsc::error::TrySendError::Full(_)) =
                    queue.try_send(DirectFrame { bytes, feed })
                {
                    warn!(conn_id = %conn_id, "connection queue full; frame dropped");
                }
            }
            Delivery::Room => {
                let Some(tx) = self.rooms.get(&room_code) else {
                    return;
                };
                if tx.send(RoomFrame { kind, bytes }).is_err() {
                    // Every member left; the next init opens a new channel.
                    self.rooms.remove(&room_code);
                }
            }
        }
    }

    /// Subscribes at routing time so every later frame of the room is seen.
    fn subscribe(&mut self, room_code: Arc<str>) -> RoomFeed {
        self.rooms.retain(|_, tx| tx.receiver_count() > 0);
        let capacity = self.room_capacity;
        let tx = self
            .rooms
            .entry(room_code.clone())
            .or_insert_with(|| broadcast::channel(capacity).0);
        RoomFeed {
            room_code,
            frames: tx.subscribe(),
        }
    }
}

fn frame_kind(event: &RoomEvent) -> FrameKind {
    match event {
        RoomEvent::Init(_) => FrameKind::Init,
        RoomEvent::StateUpdate(_) => FrameKind::StateUpdate,
        RoomEvent::GameOver { .. } => FrameKind::GameOver,
    }
}

fn encode(event: RoomEvent) -> Result<Utf8Bytes, serde_json::Error> {
    let txt = serde_json::to_string(&ServerMessage::from(event))?;
    Ok(Utf8Bytes::from(txt))
}
