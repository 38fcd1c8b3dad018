// Simulation tick: advances one room by one fixed step.

use crate::domain::systems::{barrage, enemy_fire, projectiles};
use crate::domain::{Outcome, RaidTuning, Room};
use rand::Rng;

/// Runs one step for `room` at time `now` (ms).
///
/// Ended rooms are left untouched. Returns the outcome on the tick a terminal
/// condition is detected; the room is marked ended before returning.
pub fn tick_room<R: Rng + ?Sized>(
    room: &mut Room,
    now: u64,
    rng: &mut R,
    tuning: &RaidTuning,
) -> Option<Outcome> {
    if room.ended {
        return None;
    }

    // Recomputed from scratch every tick.
    room.phase = room.boss.phase();

    if room.boss.is_defeated() {
        room.end(Some(Outcome::Victory));
        return Some(Outcome::Victory);
    }
    if room.all_players_down() {
        room.end(Some(Outcome::Defeat));
        return Some(Outcome::Defeat);
    }

    if room.shield.as_ref().is_some_and(|s| s.is_expired(now)) {
        room.shield = None;
    }

    projectiles::tick_player_projectiles(
        &mut room.projectiles,
        &mut room.boss,
        tuning.projectile.boss_damage,
    );

    barrage::roll_barrage(room, rng, &tuning.boss);

    enemy_fire::tick_enemy_projectiles(room, now, &tuning.player);

    None
}
