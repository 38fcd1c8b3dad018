// Domain layer: core simulation types and rules.

pub mod abilities;
pub mod entities;
pub mod ports;
pub mod spawn;
pub mod state;
pub mod systems;
pub mod tuning;

pub use entities::{
    Boss, BossPhase, ConnId, Outcome, Player, PlayerClass, Projectile, ProjectileKind, Room,
    Shield,
};
pub use ports::Clock;
pub use state::{BossSnapshot, PlayerSnapshot, ProjectileSnapshot, ShieldSnapshot};
pub use tuning::RaidTuning;
