// Gameplay tuning for class ability effects.

/// Effect strength of each class ability. Costs live in the ability table.
#[derive(Debug, Clone, Copy)]
pub struct AbilityTuning {
    /// Health restored to each wounded player by the Healer.
    pub heal_amount: u32,

    pub shield_radius: f32,
    pub shield_duration_ms: u64,

    pub sniper_speed: f32,
    /// Extra collision radius of the sniper round.
    pub sniper_radius: f32,

    pub assault_speed: f32,
    /// Angular offset of the outer assault shots (radians).
    pub assault_spread: f32,

    /// Lifetime in ticks of ability-fired projectiles.
    pub life_time: i32,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            heal_amount: 1,
            shield_radius: 80.0,
            shield_duration_ms: 5000,
            sniper_speed: 12.0,
            sniper_radius: 12.0,
            assault_speed: 6.0,
            assault_spread: 0.1,
            life_time: 200,
        }
    }
}
