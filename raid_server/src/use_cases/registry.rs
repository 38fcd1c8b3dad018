// Room registry: owns every room and the connection -> room mapping.

use crate::domain::{ConnId, Player, RaidTuning, Room};
use std::collections::HashMap;
use tracing::info;

/// Registry for active rooms.
///
/// Owned by the world task, so access is single-threaded and needs no locking.
#[derive(Debug)]
pub struct RoomRegistry {
    /// Tuning applied to newly created rooms.
    tuning: RaidTuning,
    /// Map of room code to room state.
    rooms: HashMap<String, Room>,
    /// Room code each connection currently plays in.
    connections: HashMap<ConnId, String>,
}

impl RoomRegistry {
    /// Creates an empty registry with the provided tuning.
    pub fn new(tuning: RaidTuning) -> Self {
        Self {
            tuning,
            rooms: HashMap::new(),
            connections: HashMap::new(),
        }
    }

    /// Returns the room for `code`, creating fresh state on first use.
    pub fn get_or_create_room(&mut self, code: &str) -> &mut Room {
        let tuning = &self.tuning;
        self.rooms.entry(code.to_string()).or_insert_with(|| {
            info!(room_code = %code, "room created");
            Room::new(code, tuning)
        })
    }

    pub fn room(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn room_mut(&mut self, code: &str) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = (&String, &mut Room)> {
        self.rooms.iter_mut()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Room code the connection is bound to, if any.
    pub fn room_code_for(&self, conn_id: &str) -> Option<&str> {
        self.connections.get(conn_id).map(String::as_str)
    }

    /// Room the connection is bound to, if the room still exists.
    pub fn room_for_connection_mut(&mut self, conn_id: &str) -> Option<&mut Room> {
        let code = self.connections.get(conn_id)?;
        self.rooms.get_mut(code)
    }

    pub fn bind_connection(&mut self, conn_id: &str, room_code: &str) {
        self.connections
            .insert(conn_id.to_string(), room_code.to_string());
    }

    /// Deletes the player and unbinds the connection.
    ///
    /// A room that is left empty and has not ended is retired; ended rooms wait for
    /// their scheduled replacement.
    pub fn remove_player(&mut self, room_code: &str, conn_id: &str) -> Option<Player> {
        if self.connections.get(conn_id).map(String::as_str) == Some(room_code) {
            self.connections.remove(conn_id);
        }

        let room = self.rooms.get_mut(room_code)?;
        let player = room.players.remove(conn_id);
        if room.players.is_empty() && !room.ended {
            self.rooms.remove(room_code);
            info!(room_code = %room_code, "room retired after last player left");
        }
        player
    }

    /// Retires every room that has no players and has not ended.
    ///
    /// Catches replacements nobody rejoined; ended rooms are left for their reset.
    pub fn retire_idle_rooms(&mut self) -> Vec<String> {
        let idle: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.players.is_empty() && !room.ended)
            .map(|(code, _)| code.clone())
            .collect();
        for code in &idle {
            self.rooms.remove(code);
            info!(room_code = %code, "idle room retired");
        }
        idle
    }

    /// Installs fresh state under `code` and unbinds every connection of the old room.
    ///
    /// Returns false if no room existed under the code.
    pub fn replace_room(&mut self, code: &str) -> bool {
        let Some(old) = self.rooms.insert(code.to_string(), Room::new(code, &self.tuning)) else {
            // Nothing to replace; do not leave a room behind that nobody asked for.
            self.rooms.remove(code);
            return false;
        };
        for conn_id in old.players.keys() {
            if self.connections.get(conn_id).map(String::as_str) == Some(code) {
                self.connections.remove(conn_id);
            }
        }
        true
    }
}
