// Spawn angle allocation on the orbit circle.

use rand::Rng;
use std::f32::consts::TAU;

/// Result of picking a spawn angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnAngle {
    /// Clear of every occupied angle by at least the minimum separation.
    Separated(f32),
    /// Retry budget ran out; this is the last candidate tried.
    Fallback(f32),
}

impl SpawnAngle {
    pub fn angle(self) -> f32 {
        match self {
            SpawnAngle::Separated(angle) | SpawnAngle::Fallback(angle) => angle,
        }
    }
}

/// Shortest distance between two angles around the circle, in `0..=PI`.
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

/// Draws random angles in `[0, 2π)` until one clears every occupied angle.
///
/// Overlapping spawns are cosmetic, so after `attempts` draws the last one is used.
pub fn allocate_spawn_angle<R: Rng + ?Sized>(
    rng: &mut R,
    occupied: &[f32],
    min_separation: f32,
    attempts: u32,
) -> SpawnAngle {
    let mut candidate = 0.0;
    for _ in 0..attempts.max(1) {
        candidate = rng.gen_range(0.0..TAU);
        if occupied
            .iter()
            .all(|&taken| angular_distance(taken, candidate) >= min_separation)
        {
            return SpawnAngle::Separated(candidate);
        }
    }
    SpawnAngle::Fallback(candidate)
}
