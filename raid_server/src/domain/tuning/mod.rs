// Gameplay tuning, kept apart from runtime/server configuration.

pub mod ability;
pub mod boss;
pub mod player;
pub mod projectile;

pub use ability::AbilityTuning;
pub use boss::{BarrageTuning, BossTuning};
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;

/// Every gameplay knob a room needs, bundled so rooms and the engine share one copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaidTuning {
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub boss: BossTuning,
    pub ability: AbilityTuning,
}
