// Class ability table: what each class pays from the shared charge and what it gets.

use crate::domain::entities::{PlayerClass, Projectile, ProjectileKind, Room, Shield};
use crate::domain::tuning::AbilityTuning;

/// The player activating an ability, captured before the room is mutated.
#[derive(Debug, Clone, Copy)]
pub struct Caster<'a> {
    pub conn_id: &'a str,
    pub x: f32,
    pub y: f32,
}

impl Caster<'_> {
    /// Direction from the caster through the boss at the arena centre.
    pub fn aim_at_centre(&self) -> f32 {
        (-self.y).atan2(-self.x)
    }
}

pub type AbilityEffect = fn(&mut Room, Caster<'_>, &AbilityTuning, u64);

#[derive(Clone, Copy)]
pub struct AbilitySpec {
    pub class: PlayerClass,
    /// Shared charge consumed on activation.
    pub cost: u32,
    pub effect: AbilityEffect,
}

impl std::fmt::Debug for AbilitySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilitySpec")
            .field("class", &self.class)
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

pub fn ability_for(class: PlayerClass) -> AbilitySpec {
    match class {
        PlayerClass::Healer => AbilitySpec {
            class,
            cost: 5,
            effect: heal_room,
        },
        PlayerClass::Tank => AbilitySpec {
            class,
            cost: 3,
            effect: raise_shield,
        },
        PlayerClass::Sniper => AbilitySpec {
            class,
            cost: 4,
            effect: fire_sniper_round,
        },
        PlayerClass::Assault => AbilitySpec {
            class,
            cost: 4,
            effect: fire_assault_spread,
        },
    }
}

fn heal_room(room: &mut Room, _caster: Caster<'_>, tuning: &AbilityTuning, _now: u64) {
    for player in room.players.values_mut() {
        player.heal(tuning.heal_amount);
    }
}

fn raise_shield(room: &mut Room, caster: Caster<'_>, tuning: &AbilityTuning, now: u64) {
    // Overwrites any active shield.
    room.shield = Some(Shield {
        x: caster.x,
        y: caster.y,
        radius: tuning.shield_radius,
        expires_at: now.saturating_add(tuning.shield_duration_ms),
    });
}

fn fire_sniper_round(room: &mut Room, caster: Caster<'_>, tuning: &AbilityTuning, _now: u64) {
    let angle = caster.aim_at_centre();
    let id = room.next_projectile_id();
    room.projectiles.push(Projectile {
        id,
        owner_id: Some(caster.conn_id.to_string()),
        x: caster.x,
        y: caster.y,
        vx: angle.cos() * tuning.sniper_speed,
        vy: angle.sin() * tuning.sniper_speed,
        lifespan: tuning.life_time,
        radius: tuning.sniper_radius,
        special: Some(ProjectileKind::Sniper),
    });
}

fn fire_assault_spread(room: &mut Room, caster: Caster<'_>, tuning: &AbilityTuning, _now: u64) {
    let angle = caster.aim_at_centre();
    for offset in [-tuning.assault_spread, 0.0, tuning.assault_spread] {
        let heading = angle + offset;
        let id = room.next_projectile_id();
        room.projectiles.push(Projectile {
            id,
            owner_id: Some(caster.conn_id.to_string()),
            x: caster.x,
            y: caster.y,
            vx: heading.cos() * tuning.assault_speed,
            vy: heading.sin() * tuning.assault_speed,
            lifespan: tuning.life_time,
            radius: 0.0,
            special: Some(ProjectileKind::Assault),
        });
    }
}
