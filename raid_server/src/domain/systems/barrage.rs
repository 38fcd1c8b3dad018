use crate::domain::entities::{Projectile, Room};
use crate::domain::tuning::BossTuning;
use rand::Rng;
use std::f32::consts::TAU;

/// Rolls the boss attack for this tick and spawns a burst on success.
///
/// Burst size and speed come from the room's current phase. Returns how many
/// projectiles were spawned.
pub fn roll_barrage<R: Rng + ?Sized>(room: &mut Room, rng: &mut R, tuning: &BossTuning) -> u32 {
    let chance = tuning.barrage_chance.clamp(0.0, 1.0);
    if !rng.gen_bool(chance) {
        return 0;
    }

    let barrage = tuning.barrage_for(room.phase);
    let (origin_x, origin_y) = (room.boss.x, room.boss.y);
    for _ in 0..barrage.count {
        let angle = rng.gen_range(0.0..TAU);
        let id = room.next_projectile_id();
        room.enemy_projectiles.push(Projectile {
            id,
            owner_id: None,
            x: origin_x,
            y: origin_y,
            vx: angle.cos() * barrage.speed,
            vy: angle.sin() * barrage.speed,
            lifespan: tuning.enemy_life_time,
            radius: 0.0,
            special: None,
        });
    }
    barrage.count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::BossPhase;
    use crate::domain::tuning::RaidTuning;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn always_fire() -> RaidTuning {
        let mut tuning = RaidTuning::default();
        tuning.boss.barrage_chance = 1.0;
        tuning
    }

    #[test]
    fn burst_grows_with_phase() {
        let tuning = always_fire();
        let mut rng = StdRng::seed_from_u64(11);
        let mut counts = Vec::new();
        for phase in [BossPhase::One, BossPhase::Two, BossPhase::Three] {
            let mut room = Room::new("R", &tuning);
            room.phase = phase;
            counts.push(roll_barrage(&mut room, &mut rng, &tuning.boss));
            assert_eq!(room.enemy_projectiles.len() as u32, *counts.last().unwrap());
        }
        assert_eq!(counts, vec![10, 18, 24]);
    }

    #[test]
    fn burst_speed_matches_phase() {
        let tuning = always_fire();
        let mut rng = StdRng::seed_from_u64(5);
        let mut room = Room::new("R", &tuning);
        room.phase = BossPhase::Three;
        roll_barrage(&mut room, &mut rng, &tuning.boss);
        for p in &room.enemy_projectiles {
            assert!((p.vx.hypot(p.vy) - 5.0).abs() < 1e-3);
            assert_eq!(p.lifespan, 250);
            assert!(p.owner_id.is_none());
        }
    }

    #[test]
    fn zero_chance_never_fires() {
        let mut tuning = RaidTuning::default();
        tuning.boss.barrage_chance = 0.0;
        let mut rng = StdRng::seed_from_u64(9);
        let mut room = Room::new("R", &tuning);
        for _ in 0..1_000 {
            assert_eq!(roll_barrage(&mut room, &mut rng, &tuning.boss), 0);
        }
        assert!(room.enemy_projectiles.is_empty());
    }
}
