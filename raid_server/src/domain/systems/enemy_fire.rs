use crate::domain::entities::{Room, distance};
use crate::domain::tuning::PlayerTuning;
use tracing::debug;

/// Advances boss bullets one tick, applies hits to players and drops expired bullets.
///
/// A bullet is not consumed by a hit and may strike several players in the same
/// tick. Players that are invincible, already down, or standing inside the active
/// shield are skipped. Each hit adds one to the shared charge. Returns the number
/// of hits.
pub fn tick_enemy_projectiles(room: &mut Room, now: u64, tuning: &PlayerTuning) -> u32 {
    let Room {
        enemy_projectiles,
        players,
        shield,
        shared_charge,
        ..
    } = room;

    let mut hits = 0;
    for bullet in enemy_projectiles.iter_mut() {
        bullet.advance();

        for (conn_id, player) in players.iter_mut() {
            if distance(bullet.x, bullet.y, player.x(), player.y()) >= tuning.hit_radius {
                continue;
            }
            if player.is_invincible(now) || !player.is_alive() {
                continue;
            }
            if shield
                .as_ref()
                .is_some_and(|s| s.covers(player.x(), player.y()))
            {
                continue;
            }

            player.take_hit(now, tuning.invincibility_ms);
            *shared_charge = shared_charge.saturating_add(1);
            hits += 1;
            debug!(
                conn_id = %conn_id,
                projectile_id = bullet.id,
                health = player.health,
                "player hit"
            );
        }
    }

    enemy_projectiles.retain(|b| !b.is_expired());
    hits
}
