use crate::domain::entities::{Boss, Projectile, distance};
use tracing::debug;

/// Advances player shots one tick and resolves hits against the boss.
///
/// A shot inside the boss radius is consumed and deals `damage` once. Shots whose
/// lifespan ran out without hitting are dropped. Returns the number of hits.
pub fn tick_player_projectiles(
    projectiles: &mut Vec<Projectile>,
    boss: &mut Boss,
    damage: u32,
) -> u32 {
    for p in projectiles.iter_mut() {
        p.advance();
    }

    let mut hits = 0;
    projectiles.retain(|p| {
        if distance(p.x, p.y, boss.x, boss.y) < boss.radius + p.radius {
            boss.apply_damage(damage);
            hits += 1;
            debug!(
                projectile_id = p.id,
                shooter_id = p.owner_id.as_deref().unwrap_or_default(),
                boss_hp = boss.current_health(),
                "boss hit"
            );
            return false;
        }
        !p.is_expired()
    });
    hits
}
