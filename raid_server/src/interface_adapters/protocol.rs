// Wire protocol DTOs and conversions for the raid WebSocket.

use crate::domain::{BossSnapshot, PlayerSnapshot, ProjectileSnapshot, ShieldSnapshot};
use crate::use_cases::{RoomEvent, RoomSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    // Sent once on connect so the client can find itself in `players`.
    Identity {
        #[serde(rename = "connId")]
        conn_id: String,
    },
    Init(RoomSnapshotDto),
    StateUpdate(RoomSnapshotDto),
    GameOver { outcome: &'static str },
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::Init(snapshot) => ServerMessage::Init(snapshot.into()),
            RoomEvent::StateUpdate(snapshot) => ServerMessage::StateUpdate(snapshot.into()),
            RoomEvent::GameOver { outcome } => ServerMessage::GameOver {
                outcome: outcome.as_str(),
            },
        }
    }
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Join(JoinPayload),
    Move(MovePayload),
    Shoot(ShootPayload),
    UseAbility(AbilityPayload),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    // Unknown or missing tags fall back to the default class.
    #[serde(default)]
    pub class_tag: String,
    pub room_code: String,
}

/// Intents after the join may name the room; the server only trusts its own
/// binding and drops intents that name a different room.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub angle: f32,
    #[serde(default)]
    pub room_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootPayload {
    pub vx: f32,
    pub vy: f32,
    #[serde(default)]
    pub room_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityPayload {
    #[serde(default)]
    pub class_tag: String,
    #[serde(default)]
    pub room_code: Option<String>,
}

impl ClientMessage {
    pub fn room_code(&self) -> Option<&str> {
        match self {
            ClientMessage::Join(p) => Some(p.room_code.as_str()),
            ClientMessage::Move(p) => p.room_code.as_deref(),
            ClientMessage::Shoot(p) => p.room_code.as_deref(),
            ClientMessage::UseAbility(p) => p.room_code.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotDto {
    pub players: BTreeMap<String, PlayerViewDto>,
    pub bullets: Vec<ProjectileViewDto>,
    pub enemy_bullets: Vec<ProjectileViewDto>,
    pub boss: BossViewDto,
    pub shared_charge: u32,
    pub shield: Option<ShieldViewDto>,
}

impl From<RoomSnapshot> for RoomSnapshotDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            players: snapshot
                .players
                .iter()
                .map(|(id, p)| (id.clone(), PlayerViewDto::from(p)))
                .collect(),
            bullets: snapshot.bullets.iter().map(ProjectileViewDto::from).collect(),
            enemy_bullets: snapshot
                .enemy_bullets
                .iter()
                .map(ProjectileViewDto::from)
                .collect(),
            boss: BossViewDto::from(&snapshot.boss),
            shared_charge: snapshot.shared_charge,
            shield: snapshot.shield.as_ref().map(ShieldViewDto::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerViewDto {
    pub angle: f32,
    pub x: f32,
    pub y: f32,
    pub class: &'static str,
    pub health: u32,
    pub max_health: u32,
    pub invincible_until: u64,
}

impl From<&PlayerSnapshot> for PlayerViewDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            angle: p.angle,
            x: p.x,
            y: p.y,
            class: p.class.as_str(),
            health: p.health,
            max_health: p.max_health,
            // 0 on the wire means no window has been opened yet.
            invincible_until: p.invincible_until.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileViewDto {
    pub id: u64,
    pub owner_id: Option<String>,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub lifespan: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<&'static str>,
}

impl From<&ProjectileSnapshot> for ProjectileViewDto {
    fn from(p: &ProjectileSnapshot) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id.clone(),
            x: p.x,
            y: p.y,
            vx: p.vx,
            vy: p.vy,
            lifespan: p.lifespan,
            special: p.special.map(|kind| kind.as_str()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BossViewDto {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub max_health: u32,
    pub current_health: u32,
    pub phase: u8,
}

impl From<&BossSnapshot> for BossViewDto {
    fn from(b: &BossSnapshot) -> Self {
        Self {
            x: b.x,
            y: b.y,
            radius: b.radius,
            max_health: b.max_health,
            current_health: b.current_health,
            phase: b.phase,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldViewDto {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub expires_at: u64,
}

impl From<&ShieldSnapshot> for ShieldViewDto {
    fn from(s: &ShieldSnapshot) -> Self {
        Self {
            x: s.x,
            y: s.y,
            radius: s.radius,
            expires_at: s.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Outcome, Player, PlayerClass, RaidTuning, Room};
    use serde_json::{Value, json};

    fn snapshot() -> RoomSnapshot {
        let mut room = Room::new("WIRE", &RaidTuning::default());
        room.players
            .insert("c1".to_string(), Player::spawn(PlayerClass::Tank, 0.0, 400.0));
        room.shared_charge = 2;
        RoomSnapshot::from(&room)
    }

    #[test]
    fn state_update_uses_camel_case_envelope() {
        let msg = ServerMessage::from(RoomEvent::StateUpdate(snapshot()));
        let value: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "stateUpdate");
        let data = &value["data"];
        assert_eq!(data["sharedCharge"], 2);
        assert_eq!(data["shield"], Value::Null);
        assert_eq!(data["enemyBullets"], json!([]));
        assert_eq!(data["boss"]["currentHealth"], 5000);
        assert_eq!(data["boss"]["phase"], 1);
        assert_eq!(data["players"]["c1"]["class"], "Tank");
        assert_eq!(data["players"]["c1"]["maxHealth"], 10);
    }

    #[test]
    fn game_over_and_identity_shapes() {
        let over = serde_json::to_value(ServerMessage::from(RoomEvent::GameOver {
            outcome: Outcome::Defeat,
        }))
        .unwrap();
        assert_eq!(over, json!({"type": "gameOver", "data": {"outcome": "defeat"}}));

        let identity = serde_json::to_value(ServerMessage::Identity {
            conn_id: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(identity, json!({"type": "identity", "data": {"connId": "abc"}}));
    }

    #[test]
    fn parses_every_client_intent() {
        let join: ClientMessage = serde_json::from_str(
            r#"{"type":"join","data":{"classTag":"Healer","roomCode":"ABCD"}}"#,
        )
        .unwrap();
        assert!(matches!(join, ClientMessage::Join(ref p) if p.class_tag == "Healer"));
        assert_eq!(join.room_code(), Some("ABCD"));

        let mv: ClientMessage =
            serde_json::from_str(r#"{"type":"move","data":{"angle":1.5}}"#).unwrap();
        assert!(matches!(mv, ClientMessage::Move(ref p) if p.angle == 1.5));
        assert_eq!(mv.room_code(), None);

        let shoot: ClientMessage = serde_json::from_str(
            r#"{"type":"shoot","data":{"vx":3,"vy":-4,"roomCode":"ABCD"}}"#,
        )
        .unwrap();
        assert!(matches!(shoot, ClientMessage::Shoot(ref p) if p.vx == 3.0 && p.vy == -4.0));

        let ability: ClientMessage =
            serde_json::from_str(r#"{"type":"useAbility","data":{}}"#).unwrap();
        assert!(matches!(ability, ClientMessage::UseAbility(ref p) if p.class_tag.is_empty()));
    }

    #[test]
    fn rejects_wrong_typed_fields() {
        assert!(serde_json::from_str::<ClientMessage>(
            r#"{"type":"move","data":{"angle":"north"}}"#
        )
        .is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"join","data":{}}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance","data":{}}"#).is_err());
    }
}
