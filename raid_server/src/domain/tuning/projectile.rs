// Gameplay tuning for player-fired projectiles.

/// Velocities are world units per tick; lifetimes are ticks.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Client-supplied shot velocity is clamped to this magnitude.
    pub max_speed: f32,

    /// Ticks before a shot is despawned.
    pub life_time: i32,

    /// Boss health removed per hit.
    pub boss_damage: u32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            life_time: 200,
            boss_damage: 10,
        }
    }
}
