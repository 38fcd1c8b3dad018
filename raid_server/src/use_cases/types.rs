// Use-case level inputs/outputs for the raid engine.

use crate::domain::{BossSnapshot, ConnId, Outcome, PlayerSnapshot, ProjectileSnapshot, ShieldSnapshot};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Intents from connections, already decoded by the transport.
#[derive(Debug, Clone)]
pub enum GameEvent {
    Join {
        conn_id: ConnId,
        class_tag: String,
        room_code: String,
    },
    Move {
        conn_id: ConnId,
        angle: f32,
    },
    Shoot {
        conn_id: ConnId,
        vx: f32,
        vy: f32,
    },
    UseAbility {
        conn_id: ConnId,
        class_tag: String,
    },
    /// The transport lost the connection.
    Leave {
        conn_id: ConnId,
    },
}

/// Full state of one room at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub players: BTreeMap<ConnId, PlayerSnapshot>,
    pub bullets: Vec<ProjectileSnapshot>,
    pub enemy_bullets: Vec<ProjectileSnapshot>,
    pub boss: BossSnapshot,
    pub shared_charge: u32,
    pub shield: Option<ShieldSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Sent once to a connection that just joined.
    Init(RoomSnapshot),
    /// Sent to the whole room after every tick.
    StateUpdate(RoomSnapshot),
    /// Sent to the whole room once, on the tick the outcome is decided.
    GameOver { outcome: Outcome },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Room,
    Connection(ConnId),
}

/// An outbound event addressed to a room or to a single connection in it.
#[derive(Debug, Clone)]
pub struct RoomUpdate {
    pub room_code: Arc<str>,
    pub delivery: Delivery,
    pub event: RoomEvent,
}
