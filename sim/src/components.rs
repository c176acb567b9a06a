//! ECS Components for the Arcade Invaders simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use crate::config::{DivingConfig, GameConfig};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in canvas pixels (x grows right, y grows down).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Per-frame velocity in pixels.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }
}

/// Which point of the bounding box `Position` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Anchor {
    /// `x` is the horizontal center, `y` the top edge.
    #[default]
    TopCenter,
    /// `x` and `y` are both the box center.
    Center,
}

/// Bounding box size plus the anchor convention of its owner.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Hitbox {
    pub width: f32,
    pub height: f32,
    pub anchor: Anchor,
}

impl Hitbox {
    pub fn top_center(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            anchor: Anchor::TopCenter,
        }
    }

    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            anchor: Anchor::Center,
        }
    }

    /// World-space box for an entity at `pos`.
    pub fn aabb(&self, pos: &Position) -> Aabb {
        let left = pos.x - self.width / 2.0;
        let top = match self.anchor {
            Anchor::TopCenter => pos.y,
            Anchor::Center => pos.y - self.height / 2.0,
        };
        Aabb {
            left,
            top,
            right: left + self.width,
            bottom: top + self.height,
        }
    }
}

/// Axis-aligned box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    /// Strict overlap: boxes that only touch along an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

// ============================================================================
// LIVENESS
// ============================================================================

/// Monotone alive/active flag. There is no way to revive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness(bool);

impl Liveness {
    pub fn alive() -> Self {
        Self(true)
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.0
    }

    /// Mark dead. Returns `true` only for the call that actually killed it,
    /// so repeated kills are no-ops.
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.0, false)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::alive()
    }
}

// ============================================================================
// PRESENTATION
// ============================================================================

/// 24-bit RGB color used for effects and fallback drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const PLAYER: Color = Color::rgb(0x00, 0xff, 0x00);
    pub const SHIELD: Color = Color::rgb(0x00, 0xcc, 0xff);
    pub const BONUS_FLYER: Color = Color::rgb(0xff, 0x00, 0x80);
    pub const PLAYER_SHOT: Color = Color::rgb(0x00, 0xff, 0x00);
    pub const ENEMY_SHOT: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);

    /// Formation row palette, repeating for grids deeper than four rows.
    pub const ROWS: [Color; 4] = [
        Color::rgb(0xff, 0x00, 0x00),
        Color::rgb(0xff, 0x66, 0x00),
        Color::rgb(0xff, 0xff, 0x00),
        Color::rgb(0xff, 0x00, 0xff),
    ];

    pub fn for_row(row: u32) -> Color {
        Self::ROWS[row as usize % Self::ROWS.len()]
    }
}

// ============================================================================
// PLAYER
// ============================================================================

/// The closed set of collectible power-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    RapidFire,
    Shield,
    MultiShot,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::RapidFire,
        PowerUpKind::Shield,
        PowerUpKind::MultiShot,
    ];
}

/// Timed power-up flags. Each holds the clock time (ms) at which it expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUps {
    pub shield_until: Option<f64>,
    pub rapid_fire_until: Option<f64>,
    pub multi_shot_until: Option<f64>,
}

impl PowerUps {
    fn slot_mut(&mut self, kind: PowerUpKind) -> &mut Option<f64> {
        match kind {
            PowerUpKind::RapidFire => &mut self.rapid_fire_until,
            PowerUpKind::Shield => &mut self.shield_until,
            PowerUpKind::MultiShot => &mut self.multi_shot_until,
        }
    }

    pub fn has(&self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::RapidFire => self.rapid_fire_until.is_some(),
            PowerUpKind::Shield => self.shield_until.is_some(),
            PowerUpKind::MultiShot => self.multi_shot_until.is_some(),
        }
    }

    /// Activate (or refresh) a power-up until `expires_at`.
    pub fn activate(&mut self, kind: PowerUpKind, expires_at: f64) {
        *self.slot_mut(kind) = Some(expires_at);
    }

    /// Clear every flag whose expiry lies strictly before `now`.
    pub fn expire(&mut self, now: f64) {
        for kind in PowerUpKind::ALL {
            let slot = self.slot_mut(kind);
            if slot.is_some_and(|until| now > until) {
                *slot = None;
            }
        }
    }

    /// Spend the shield on a hit. Returns whether one was available.
    pub fn consume_shield(&mut self) -> bool {
        self.shield_until.take().is_some()
    }
}

/// The player's ship.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player {
    pub power_ups: PowerUps,
}

// ============================================================================
// ENEMIES
// ============================================================================

/// Cell of the formation grid an enemy was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridSlot {
    pub row: u32,
    pub col: u32,
}

/// A member of the lockstep formation.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FormationEnemy {
    pub slot: GridSlot,
    /// Set when the enemy was converted into a diver; never cleared.
    pub diving: bool,
    pub live: Liveness,
}

impl FormationEnemy {
    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }

    /// Eligible for a dive: still in formation and not already diving.
    pub fn can_dive(&self) -> bool {
        self.is_live() && !self.diving
    }
}

/// Which half of the dive the attacker is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivePhase {
    /// Circling a drifting arc center.
    Arc,
    /// Straight, wobbling descent.
    Descent,
}

/// Two-phase dive trajectory state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DivePath {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// +1 curls right, -1 curls left.
    pub direction: f32,
    pub angle: f32,
    pub angle_step: f32,
    /// Accumulated angle; the arc ends once this exceeds a full turn.
    pub progress: f32,
    pub speed: f32,
    pub lateral_drift: f32,
}

impl DivePath {
    pub fn new(origin: Position, direction: f32, config: &DivingConfig) -> Self {
        Self {
            center_x: origin.x + direction * config.arc_center_dx,
            center_y: origin.y + config.arc_center_dy,
            radius: config.arc_radius,
            direction,
            angle: 0.0,
            angle_step: config.angle_step,
            progress: 0.0,
            speed: config.speed,
            lateral_drift: config.speed * config.lateral_drift_ratio,
        }
    }

    pub fn phase(&self) -> DivePhase {
        if self.progress <= TAU {
            DivePhase::Arc
        } else {
            DivePhase::Descent
        }
    }

    /// Advance one frame and write the new position into `pos`.
    pub fn advance(&mut self, pos: &mut Position) {
        self.angle += self.angle_step;
        self.progress += self.angle_step;

        match self.phase() {
            DivePhase::Arc => {
                pos.x = self.center_x + self.angle.cos() * self.radius;
                pos.y = self.center_y + self.angle.sin() * self.radius;
                self.center_y += self.speed;
                self.center_x += self.direction * self.lateral_drift;
            }
            DivePhase::Descent => {
                pos.y += self.speed * 1.5;
                pos.x += (pos.y * 0.02).sin() * 2.0;
            }
        }
    }
}

/// A formation member that broke away to attack.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DivingEnemy {
    /// Launch order; collision scans credit the earliest diver first.
    pub seq: u64,
    pub row: u32,
    pub path: DivePath,
    pub live: Liveness,
}

impl DivingEnemy {
    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }
}

/// Horizontally crossing high-value target.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BonusFlyer {
    /// +1 enters from the left, -1 from the right.
    pub direction: f32,
    pub speed: f32,
    pub points: u32,
    pub live: Liveness,
}

impl BonusFlyer {
    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }
}

// ============================================================================
// PROJECTILES & PICKUPS
// ============================================================================

/// Who fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: Owner,
    /// Signed vertical speed: negative travels up.
    pub speed: f32,
    pub live: Liveness,
}

impl Projectile {
    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }
}

/// A falling power-up.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerUpPickup {
    pub kind: PowerUpKind,
    pub speed: f32,
    /// Presentation only.
    pub rotation: f32,
    /// Presentation only.
    pub pulse_phase: f32,
    pub live: Liveness,
}

impl PowerUpPickup {
    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }
}

// ============================================================================
// EFFECTS
// ============================================================================

/// What a particle looks like.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark { color: Color, size: f32 },
    ScorePopup { points: u32 },
}

/// Short-lived visual effect. Never collides.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    pub fn is_expired(&self) -> bool {
        self.life == 0
    }

    /// Remaining life as a 0..=1 fade factor.
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning the player ship at its start position.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub position: Position,
    pub velocity: Velocity,
    pub hitbox: Hitbox,
}

impl PlayerBundle {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player: Player::default(),
            position: player_spawn_point(config),
            velocity: Velocity::default(),
            hitbox: Hitbox::top_center(config.player.width, config.player.height),
        }
    }
}

/// Where the player (re)appears.
pub fn player_spawn_point(config: &GameConfig) -> Position {
    Position::new(
        config.canvas.width / 2.0,
        config.canvas.height - config.player.spawn_offset_y,
    )
}

/// Bundle for one formation grid cell.
#[derive(Bundle)]
pub struct FormationEnemyBundle {
    pub enemy: FormationEnemy,
    pub position: Position,
    pub hitbox: Hitbox,
}

impl FormationEnemyBundle {
    pub fn new(slot: GridSlot, config: &GameConfig) -> Self {
        let e = &config.enemy;
        Self {
            enemy: FormationEnemy {
                slot,
                diving: false,
                live: Liveness::alive(),
            },
            position: Position::new(
                e.offset_x + slot.col as f32 * (e.width + e.padding),
                e.offset_y + slot.row as f32 * (e.height + e.padding),
            ),
            hitbox: Hitbox::top_center(e.width, e.height),
        }
    }
}

/// Bundle for a diver launched from a formation member.
#[derive(Bundle)]
pub struct DivingEnemyBundle {
    pub enemy: DivingEnemy,
    pub position: Position,
    pub hitbox: Hitbox,
}

impl DivingEnemyBundle {
    pub fn launch(
        seq: u64,
        row: u32,
        origin: Position,
        hitbox: Hitbox,
        direction: f32,
        config: &DivingConfig,
    ) -> Self {
        Self {
            enemy: DivingEnemy {
                seq,
                row,
                path: DivePath::new(origin, direction, config),
                live: Liveness::alive(),
            },
            position: origin,
            hitbox,
        }
    }
}

#[derive(Bundle)]
pub struct ProjectileBundle {
    pub projectile: Projectile,
    pub position: Position,
    pub hitbox: Hitbox,
}

impl ProjectileBundle {
    pub fn player(x: f32, y: f32, config: &GameConfig) -> Self {
        let p = &config.player_projectile;
        Self {
            projectile: Projectile {
                owner: Owner::Player,
                speed: -p.speed,
                live: Liveness::alive(),
            },
            position: Position::new(x, y),
            hitbox: Hitbox::top_center(p.width, p.height),
        }
    }

    pub fn enemy(x: f32, y: f32, config: &GameConfig) -> Self {
        let p = &config.enemy_projectile;
        Self {
            projectile: Projectile {
                owner: Owner::Enemy,
                speed: p.speed,
                live: Liveness::alive(),
            },
            position: Position::new(x, y),
            hitbox: Hitbox::top_center(p.width, p.height),
        }
    }
}

#[derive(Bundle)]
pub struct PowerUpPickupBundle {
    pub pickup: PowerUpPickup,
    pub position: Position,
    pub hitbox: Hitbox,
}

impl PowerUpPickupBundle {
    pub fn new(kind: PowerUpKind, x: f32, y: f32, config: &GameConfig) -> Self {
        let p = &config.power_up;
        Self {
            pickup: PowerUpPickup {
                kind,
                speed: p.speed,
                rotation: 0.0,
                pulse_phase: 0.0,
                live: Liveness::alive(),
            },
            position: Position::new(x, y),
            hitbox: Hitbox::centered(p.width, p.height),
        }
    }
}

#[derive(Bundle)]
pub struct BonusFlyerBundle {
    pub flyer: BonusFlyer,
    pub position: Position,
    pub hitbox: Hitbox,
}

impl BonusFlyerBundle {
    /// Place a flyer just outside the edge it enters from.
    pub fn enter(direction: f32, points: u32, config: &GameConfig) -> Self {
        let b = &config.bonus_flyer;
        let x = if direction > 0.0 {
            -b.width
        } else {
            config.canvas.width + b.width
        };
        Self {
            flyer: BonusFlyer {
                direction,
                speed: b.speed,
                points,
                live: Liveness::alive(),
            },
            position: Position::new(x, b.y),
            hitbox: Hitbox::top_center(b.width, b.height),
        }
    }
}

#[derive(Bundle)]
pub struct ParticleBundle {
    pub particle: Particle,
    pub position: Position,
    pub velocity: Velocity,
}
