// Read-only views of room entities handed to the broadcaster.

use crate::domain::entities::{Boss, Player, PlayerClass, Projectile, ProjectileKind, Shield};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub angle: f32,
    pub x: f32,
    pub y: f32,
    pub class: PlayerClass,
    pub health: u32,
    pub max_health: u32,
    pub invincible_until: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub owner_id: Option<String>,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub lifespan: i32,
    pub special: Option<ProjectileKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossSnapshot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub max_health: u32,
    pub current_health: u32,
    pub phase: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShieldSnapshot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub expires_at: u64,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            angle: p.angle(),
            x: p.x(),
            y: p.y(),
            class: p.class,
            health: p.health,
            max_health: p.max_health,
            invincible_until: p.invincible_until,
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id.clone(),
            x: p.x,
            y: p.y,
            vx: p.vx,
            vy: p.vy,
            lifespan: p.lifespan,
            special: p.special,
        }
    }
}

impl From<&Boss> for BossSnapshot {
    fn from(b: &Boss) -> Self {
        Self {
            x: b.x,
            y: b.y,
            radius: b.radius,
            max_health: b.max_health,
            current_health: b.current_health(),
            phase: b.phase().number(),
        }
    }
}

impl From<&Shield> for ShieldSnapshot {
    fn from(s: &Shield) -> Self {
        Self {
            x: s.x,
            y: s.y,
            radius: s.radius,
            expires_at: s.expires_at,
        }
    }
}
