// Intent processing: applies decoded client intents to room state.

use crate::domain::abilities::{Caster, ability_for};
use crate::domain::spawn::{SpawnAngle, allocate_spawn_angle};
use crate::domain::tuning::{AbilityTuning, ProjectileTuning};
use crate::domain::{Player, PlayerClass, Projectile, RaidTuning, Room};
use crate::use_cases::registry::RoomRegistry;
use crate::use_cases::types::RoomSnapshot;
use rand::Rng;
use tracing::{debug, info};

/// Reasons an intent was dropped without touching room state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentError {
    /// The connection is not bound to a live room.
    UnknownConnection,
    /// The room reached a terminal state and waits for replacement.
    RoomEnded,
    /// Missing, empty or non-finite values.
    Malformed,
}

/// Result of an ability request that reached a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityOutcome {
    Applied { cost: u32 },
    /// Not enough shared charge; nothing changed.
    InsufficientCharge,
}

/// Accepted join: the snapshot for the joining connection and how its angle was picked.
#[derive(Debug, Clone)]
pub struct Joined {
    pub snapshot: RoomSnapshot,
    pub spawn: SpawnAngle,
}

/// Looks up the room a connection plays in, rejecting ended rooms.
pub fn active_room<'a>(
    registry: &'a mut RoomRegistry,
    conn_id: &str,
) -> Result<&'a mut Room, IntentError> {
    let room = registry
        .room_for_connection_mut(conn_id)
        .ok_or(IntentError::UnknownConnection)?;
    if room.ended {
        return Err(IntentError::RoomEnded);
    }
    Ok(room)
}

/// Adds the connection to `room_code`, creating the room on first use.
///
/// A connection already playing elsewhere leaves that room first. The returned
/// snapshot is meant for the joining connection only.
pub fn join<R: Rng + ?Sized>(
    registry: &mut RoomRegistry,
    rng: &mut R,
    tuning: &RaidTuning,
    conn_id: &str,
    class_tag: &str,
    room_code: &str,
) -> Result<Joined, IntentError> {
    let room_code = room_code.trim();
    if room_code.is_empty() {
        return Err(IntentError::Malformed);
    }
    if registry.room(room_code).is_some_and(|room| room.ended) {
        return Err(IntentError::RoomEnded);
    }

    if let Some(previous) = registry.room_code_for(conn_id).map(str::to_owned) {
        if previous != room_code {
            registry.remove_player(&previous, conn_id);
            debug!(conn_id, room_code = %previous, "left previous room before joining");
        }
    }

    let class = PlayerClass::from_tag(class_tag);
    let room = registry.get_or_create_room(room_code);
    // Joining the current room again respawns the player; the fight carries on.
    room.players.remove(conn_id);
    let spawn = allocate_spawn_angle(
        rng,
        &room.occupied_angles(),
        tuning.player.min_spawn_separation,
        tuning.player.spawn_attempts,
    );
    if let SpawnAngle::Fallback(angle) = spawn {
        debug!(conn_id, angle, "spawn angle budget exhausted; overlapping spawn");
    }

    room.players.insert(
        conn_id.to_string(),
        Player::spawn(class, spawn.angle(), room.orbit_radius),
    );
    let snapshot = RoomSnapshot::from(&*room);
    let players = room.players.len();
    registry.bind_connection(conn_id, room_code);

    info!(
        conn_id,
        room_code,
        class = class.as_str(),
        angle = spawn.angle(),
        players,
        "player joined"
    );
    Ok(Joined { snapshot, spawn })
}

/// Removes the connection's player from whatever room it is in.
pub fn leave(registry: &mut RoomRegistry, conn_id: &str) -> Result<(), IntentError> {
    let room_code = registry
        .room_code_for(conn_id)
        .map(str::to_owned)
        .ok_or(IntentError::UnknownConnection)?;
    registry.remove_player(&room_code, conn_id);
    info!(conn_id, room_code = %room_code, "player left");
    Ok(())
}

/// Stores the angle verbatim; position follows from it.
pub fn move_player(room: &mut Room, conn_id: &str, angle: f32) -> Result<(), IntentError> {
    if !angle.is_finite() {
        return Err(IntentError::Malformed);
    }
    let player = room
        .players
        .get_mut(conn_id)
        .ok_or(IntentError::UnknownConnection)?;
    player.set_angle(angle);
    Ok(())
}

/// Fires a shot from the player's position with its speed clamped to the maximum.
///
/// Returns the new projectile id.
pub fn shoot(
    room: &mut Room,
    conn_id: &str,
    vx: f32,
    vy: f32,
    tuning: &ProjectileTuning,
) -> Result<u64, IntentError> {
    if !vx.is_finite() || !vy.is_finite() {
        return Err(IntentError::Malformed);
    }
    let (x, y) = room
        .players
        .get(conn_id)
        .map(|p| (p.x(), p.y()))
        .ok_or(IntentError::UnknownConnection)?;

    let (vx, vy) = clamp_speed(vx, vy, tuning.max_speed);
    let id = room.next_projectile_id();
    room.projectiles.push(Projectile {
        id,
        owner_id: Some(conn_id.to_string()),
        x,
        y,
        vx,
        vy,
        lifespan: tuning.life_time,
        radius: 0.0,
        special: None,
    });
    Ok(id)
}

/// Scales the vector down to `max_speed` if it is faster, keeping its direction.
pub fn clamp_speed(vx: f32, vy: f32, max_speed: f32) -> (f32, f32) {
    let speed = vx.hypot(vy);
    if speed > max_speed && speed > 0.0 {
        let scale = max_speed / speed;
        (vx * scale, vy * scale)
    } else {
        (vx, vy)
    }
}

/// Spends shared charge on the ability of `class_tag`, or does nothing if the room
/// cannot afford it.
///
/// The check and deduction happen in one step, so a second request in the same
/// window sees the already reduced charge.
pub fn use_ability(
    room: &mut Room,
    conn_id: &str,
    class_tag: &str,
    tuning: &AbilityTuning,
    now: u64,
) -> Result<AbilityOutcome, IntentError> {
    let (x, y) = room
        .players
        .get(conn_id)
        .map(|p| (p.x(), p.y()))
        .ok_or(IntentError::UnknownConnection)?;

    let ability = ability_for(PlayerClass::from_tag(class_tag));
    if room.shared_charge < ability.cost {
        return Ok(AbilityOutcome::InsufficientCharge);
    }

    (ability.effect)(room, Caster { conn_id, x, y }, tuning, now);
    room.shared_charge -= ability.cost;
    info!(
        conn_id,
        room_code = %room.code,
        class = ability.class.as_str(),
        cost = ability.cost,
        charge_left = room.shared_charge,
        "ability used"
    );
    Ok(AbilityOutcome::Applied { cost: ability.cost })
}
