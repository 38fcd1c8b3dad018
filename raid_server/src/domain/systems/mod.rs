// Per-tick simulation systems operating on a room's entities.

pub mod barrage;
pub mod enemy_fire;
pub mod projectiles;
