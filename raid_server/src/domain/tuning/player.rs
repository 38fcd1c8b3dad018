// Gameplay tuning for orbiting players.

/// Distances are world units, durations are milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Radius of the circle every player orbits on, centred on the boss.
    pub orbit_radius: f32,

    /// Distance at which an enemy projectile hits a player.
    pub hit_radius: f32,

    /// Invincibility window granted after taking a hit.
    pub invincibility_ms: u64,

    /// Minimum angular gap (radians) between spawn angles.
    pub min_spawn_separation: f32,

    /// Random spawn angles tried before accepting the last candidate.
    pub spawn_attempts: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            orbit_radius: 400.0,
            hit_radius: 20.0,
            invincibility_ms: 2000,
            min_spawn_separation: 0.2,
            spawn_attempts: 100,
        }
    }
}
