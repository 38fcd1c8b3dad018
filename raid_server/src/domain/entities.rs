// Domain entities for one boss encounter.

use crate::domain::tuning::RaidTuning;
use std::collections::HashMap;

/// Transport-assigned identity of a connected participant.
pub type ConnId = String;

/// Euclidean distance between two points.
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (ax - bx).hypot(ay - by)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerClass {
    Tank,
    Assault,
    Healer,
    Sniper,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 4] = [
        PlayerClass::Tank,
        PlayerClass::Assault,
        PlayerClass::Healer,
        PlayerClass::Sniper,
    ];

    /// Class used when a client sends a tag we do not know.
    pub const DEFAULT: PlayerClass = PlayerClass::Assault;

    /// Parses a client class tag, substituting the default class for unknown tags.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "Tank" => PlayerClass::Tank,
            "Assault" => PlayerClass::Assault,
            "Healer" => PlayerClass::Healer,
            "Sniper" => PlayerClass::Sniper,
            _ => PlayerClass::DEFAULT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerClass::Tank => "Tank",
            PlayerClass::Assault => "Assault",
            PlayerClass::Healer => "Healer",
            PlayerClass::Sniper => "Sniper",
        }
    }

    /// Health a player of this class spawns with.
    pub fn max_health(self) -> u32 {
        match self {
            PlayerClass::Tank => 10,
            PlayerClass::Assault => 5,
            PlayerClass::Healer => 4,
            PlayerClass::Sniper => 3,
        }
    }
}

/// A participant pinned to the orbit circle.
///
/// Position is derived from the angle and is only written through [`Player::set_angle`].
#[derive(Debug, Clone)]
pub struct Player {
    angle: f32,
    x: f32,
    y: f32,
    orbit_radius: f32,

    pub class: PlayerClass,
    pub health: u32,
    pub max_health: u32,
    /// Hits are ignored until the clock passes this timestamp (ms). `None` until
    /// the first hit.
    pub invincible_until: Option<u64>,
}

impl Player {
    pub fn spawn(class: PlayerClass, angle: f32, orbit_radius: f32) -> Self {
        let max_health = class.max_health();
        let mut player = Self {
            angle,
            x: 0.0,
            y: 0.0,
            orbit_radius,
            class,
            health: max_health,
            max_health,
            invincible_until: None,
        };
        player.set_angle(angle);
        player
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.x = self.orbit_radius * angle.cos();
        self.y = self.orbit_radius * angle.sin();
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_invincible(&self, now: u64) -> bool {
        self.invincible_until.is_some_and(|until| now <= until)
    }

    /// Restores up to `amount` health; returns true if anything was restored.
    pub fn heal(&mut self, amount: u32) -> bool {
        if self.health >= self.max_health {
            return false;
        }
        self.health = self.health.saturating_add(amount).min(self.max_health);
        true
    }

    /// Applies one enemy hit and opens the invincibility window.
    pub fn take_hit(&mut self, now: u64, invincibility_ms: u64) {
        self.health = self.health.saturating_sub(1);
        self.invincible_until = Some(now.saturating_add(invincibility_ms));
    }
}

/// Tag carried by ability-fired projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Sniper,
    Assault,
}

impl ProjectileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectileKind::Sniper => "sniper",
            ProjectileKind::Assault => "assault",
        }
    }
}

/// Player shot or boss bullet. Boss bullets have no owner.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u64,
    pub owner_id: Option<ConnId>,
    pub x: f32,
    pub y: f32,
    /// Velocity in world units per tick.
    pub vx: f32,
    pub vy: f32,
    /// Remaining ticks.
    pub lifespan: i32,
    /// Collision radius added to the target radius.
    pub radius: f32,
    pub special: Option<ProjectileKind>,
}

impl Projectile {
    /// Moves one tick along the velocity and burns one tick of lifespan.
    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.lifespan -= 1;
    }

    pub fn is_expired(&self) -> bool {
        self.lifespan <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BossPhase {
    One,
    Two,
    Three,
}

impl BossPhase {
    /// Phase for a remaining-health ratio: below 0.3 is phase 3, below 0.6 is phase 2.
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio < 0.3 {
            BossPhase::Three
        } else if ratio < 0.6 {
            BossPhase::Two
        } else {
            BossPhase::One
        }
    }

    pub fn number(self) -> u8 {
        match self {
            BossPhase::One => 1,
            BossPhase::Two => 2,
            BossPhase::Three => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Boss {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub max_health: u32,
    current_health: u32,
}

impl Boss {
    pub fn new(radius: f32, max_health: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius,
            max_health,
            current_health: max_health,
        }
    }

    pub fn current_health(&self) -> u32 {
        self.current_health
    }

    /// Sets health, clamped to `0..=max_health`.
    pub fn set_health(&mut self, health: u32) {
        self.current_health = health.min(self.max_health);
    }

    pub fn apply_damage(&mut self, amount: u32) {
        self.current_health = self.current_health.saturating_sub(amount);
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.current_health as f32 / self.max_health as f32
    }

    pub fn phase(&self) -> BossPhase {
        BossPhase::from_ratio(self.health_ratio())
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }
}

/// Temporary area in which players ignore enemy hits.
#[derive(Debug, Clone)]
pub struct Shield {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub expires_at: u64,
}

impl Shield {
    pub fn covers(&self, x: f32, y: f32) -> bool {
        distance(self.x, self.y, x, y) < self.radius
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Victory => "victory",
            Outcome::Defeat => "defeat",
        }
    }
}

/// One isolated boss encounter and everyone in it.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: String,
    pub players: HashMap<ConnId, Player>,
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub boss: Boss,
    pub shared_charge: u32,
    pub shield: Option<Shield>,
    pub phase: BossPhase,
    /// Set once the room reached a terminal state; no simulation runs afterwards.
    pub ended: bool,
    pub outcome: Option<Outcome>,
    pub orbit_radius: f32,
    next_projectile_id: u64,
}

impl Room {
    pub fn new(code: impl Into<String>, tuning: &RaidTuning) -> Self {
        Self {
            code: code.into(),
            players: HashMap::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            boss: Boss::new(tuning.boss.radius, tuning.boss.max_health),
            shared_charge: 0,
            shield: None,
            phase: BossPhase::One,
            ended: false,
            outcome: None,
            orbit_radius: tuning.player.orbit_radius,
            next_projectile_id: 1,
        }
    }

    pub fn next_projectile_id(&mut self) -> u64 {
        let id = self.next_projectile_id;
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        id
    }

    pub fn occupied_angles(&self) -> Vec<f32> {
        self.players.values().map(Player::angle).collect()
    }

    /// True only for a non-empty room where nobody has health left.
    pub fn all_players_down(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| !p.is_alive())
    }

    /// Marks the room terminal.
    pub fn end(&mut self, outcome: Option<Outcome>) {
        self.ended = true;
        self.outcome = outcome;
    }
}
