use crate::domain::entities::BossPhase;

/// Size and speed of one boss barrage.
#[derive(Debug, Clone, Copy)]
pub struct BarrageTuning {
    pub count: u32,
    pub speed: f32,
}

/// Gameplay tuning for the boss and its attack pattern.
#[derive(Debug, Clone, Copy)]
pub struct BossTuning {
    pub radius: f32,
    pub max_health: u32,

    /// Per-tick probability of firing a barrage (0.0..=1.0).
    pub barrage_chance: f64,

    /// Barrage per phase, indexed by phase number - 1.
    pub barrages: [BarrageTuning; 3],

    /// Ticks before an enemy projectile is despawned.
    pub enemy_life_time: i32,
}

impl BossTuning {
    pub fn barrage_for(&self, phase: BossPhase) -> BarrageTuning {
        self.barrages[usize::from(phase.number() - 1)]
    }
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            radius: 50.0,
            max_health: 5000,
            barrage_chance: 0.05,
            barrages: [
                BarrageTuning {
                    count: 10,
                    speed: 3.0,
                },
                BarrageTuning {
                    count: 18,
                    speed: 4.0,
                },
                BarrageTuning {
                    count: 24,
                    speed: 5.0,
                },
            ],
            enemy_life_time: 250,
        }
    }
}
