// Snapshot broadcaster: turns room state into outbound updates.

use crate::domain::{Outcome, Room};
use crate::use_cases::types::{Delivery, RoomEvent, RoomSnapshot, RoomUpdate};
use std::sync::Arc;

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            players: room
                .players
                .iter()
                .map(|(id, p)| (id.clone(), p.into()))
                .collect(),
            bullets: room.projectiles.iter().map(Into::into).collect(),
            enemy_bullets: room.enemy_projectiles.iter().map(Into::into).collect(),
            boss: (&room.boss).into(),
            shared_charge: room.shared_charge,
            shield: room.shield.as_ref().map(Into::into),
        }
    }
}

/// Snapshot for a connection that just joined `room_code`.
pub fn init(room_code: &str, conn_id: &str, snapshot: RoomSnapshot) -> RoomUpdate {
    RoomUpdate {
        room_code: Arc::from(room_code),
        delivery: Delivery::Connection(conn_id.to_string()),
        event: RoomEvent::Init(snapshot),
    }
}

/// Per-tick update, only for live rooms that have someone to receive it.
pub fn state_update(room: &Room) -> Option<RoomUpdate> {
    if room.ended || room.players.is_empty() {
        return None;
    }
    Some(RoomUpdate {
        room_code: Arc::from(room.code.as_str()),
        delivery: Delivery::Room,
        event: RoomEvent::StateUpdate(RoomSnapshot::from(room)),
    })
}

pub fn game_over(room_code: &str, outcome: Outcome) -> RoomUpdate {
    RoomUpdate {
        room_code: Arc::from(room_code),
        delivery: Delivery::Room,
        event: RoomEvent::GameOver { outcome },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Player, PlayerClass, Projectile, RaidTuning, Shield};

    fn populated_room() -> Room {
        let mut room = Room::new("SNAP", &RaidTuning::default());
        room.players.insert(
            "c1".to_string(),
            Player::spawn(PlayerClass::Healer, 1.0, room.orbit_radius),
        );
        let id = room.next_projectile_id();
        room.projectiles.push(Projectile {
            id,
            owner_id: Some("c1".to_string()),
            x: 1.0,
            y: 2.0,
            vx: 3.0,
            vy: 4.0,
            lifespan: 5,
            radius: 0.0,
            special: None,
        });
        room.shared_charge = 3;
        room.shield = Some(Shield {
            x: 0.0,
            y: 0.0,
            radius: 80.0,
            expires_at: 42,
        });
        room
    }

    #[test]
    fn snapshot_copies_every_part_of_the_room() {
        let room = populated_room();
        let snapshot = RoomSnapshot::from(&room);

        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players["c1"].class, PlayerClass::Healer);
        assert_eq!(snapshot.bullets.len(), 1);
        assert_eq!(snapshot.bullets[0].owner_id.as_deref(), Some("c1"));
        assert!(snapshot.enemy_bullets.is_empty());
        assert_eq!(snapshot.boss.current_health, 5000);
        assert_eq!(snapshot.boss.phase, 1);
        assert_eq!(snapshot.shared_charge, 3);
        assert_eq!(snapshot.shield.map(|s| s.expires_at), Some(42));
    }

    #[test]
    fn empty_room_gets_no_state_update() {
        let room = Room::new("EMPTY", &RaidTuning::default());
        assert!(state_update(&room).is_none());
    }

    #[test]
    fn ended_room_gets_no_state_update() {
        let mut room = populated_room();
        room.end(Some(Outcome::Victory));
        assert!(state_update(&room).is_none());
    }

    #[test]
    fn live_room_update_targets_the_room() {
        let room = populated_room();
        let update = state_update(&room).expect("update for live room");
        assert_eq!(&*update.room_code, "SNAP");
        assert_eq!(update.delivery, Delivery::Room);
        assert!(matches!(update.event, RoomEvent::StateUpdate(_)));
    }

    #[test]
    fn init_targets_only_the_joining_connection() {
        let room = populated_room();
        let update = init("SNAP", "c1", RoomSnapshot::from(&room));
        assert_eq!(update.delivery, Delivery::Connection("c1".to_string()));
    }
}
