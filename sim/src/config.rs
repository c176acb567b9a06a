//! Game configuration.
//!
//! One immutable `GameConfig` is validated at construction and inserted into
//! the ECS world as a resource. Defaults reproduce the classic constant table
//! (800×600 canvas, 4×10 formation, 3 lives).

use crate::error::ConfigError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Play-area dimensions in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Player ship tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    /// Horizontal speed in pixels per frame.
    pub speed: f32,
    /// Distance of the spawn point above the bottom edge.
    pub spawn_offset_y: f32,
    /// Minimum time between shots (ms). Rapid fire divides this by 3.
    pub shoot_cooldown_ms: f64,
    /// Horizontal spacing of the outer multi-shot projectiles.
    pub multi_shot_spread: f32,
    /// Projectiles are spawned this far above the ship's top edge.
    pub muzzle_offset: f32,
    pub starting_lives: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 40.0,
            speed: 5.0,
            spawn_offset_y: 60.0,
            shoot_cooldown_ms: 300.0,
            multi_shot_spread: 15.0,
            muzzle_offset: 10.0,
            starting_lives: 3,
        }
    }
}

/// Formation grid and enemy fire tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub width: f32,
    pub height: f32,
    pub rows: u32,
    pub cols: u32,
    pub padding: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Formation speed at level 1 (pixels per frame).
    pub base_speed: f32,
    /// Added to the formation speed for every level past the first.
    pub speed_per_level: f32,
    pub drop_distance: f32,
    /// Minimum time between enemy shots (ms).
    pub shot_interval_ms: f64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 30.0,
            rows: 4,
            cols: 10,
            padding: 10.0,
            offset_x: 50.0,
            offset_y: 50.0,
            base_speed: 1.0,
            speed_per_level: 0.3,
            drop_distance: 20.0,
            shot_interval_ms: 1000.0,
        }
    }
}

impl EnemyConfig {
    /// Shared formation speed for a level (levels start at 1).
    pub fn speed_for_level(&self, level: u32) -> f32 {
        self.base_speed + level.saturating_sub(1) as f32 * self.speed_per_level
    }
}

/// Size and signed-less speed of one projectile family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            width: 4.0,
            height: 15.0,
            speed: 7.0,
        }
    }
}

/// Power-up drop and effect tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub width: f32,
    pub height: f32,
    /// Fall speed (pixels per frame).
    pub speed: f32,
    /// Chance of a drop per enemy kill.
    pub spawn_chance: f64,
    /// How long a collected power-up stays active (ms).
    pub duration_ms: f64,
    /// Flat score for collecting any pickup.
    pub pickup_score: u32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 30.0,
            speed: 2.0,
            spawn_chance: 0.15,
            duration_ms: 10_000.0,
            pickup_score: 50,
        }
    }
}

/// Bonus flyer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusFlyerConfig {
    pub width: f32,
    pub height: f32,
    pub y: f32,
    pub speed: f32,
    pub spawn_interval_ms: f64,
    /// Point values a flyer may carry; drawn uniformly.
    pub point_values: Vec<u32>,
}

impl Default for BonusFlyerConfig {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 25.0,
            y: 30.0,
            speed: 2.0,
            spawn_interval_ms: 15_000.0,
            point_values: vec![50, 100, 150, 200],
        }
    }
}

/// Diving attack tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DivingConfig {
    pub spawn_interval_ms: f64,
    pub speed: f32,
    pub arc_radius: f32,
    /// Radians added to the arc angle each frame.
    pub angle_step: f32,
    /// Horizontal offset of the arc center from the launch point.
    pub arc_center_dx: f32,
    /// Vertical offset of the arc center from the launch point.
    pub arc_center_dy: f32,
    /// Sideways arc-center drift as a fraction of the diving speed.
    pub lateral_drift_ratio: f32,
    /// Chance of preferring the back rows when selecting a diver.
    pub back_row_preference: f64,
    /// First row index counted as a back row.
    pub back_row_min: u32,
}

impl Default for DivingConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 5_000.0,
            speed: 2.5,
            arc_radius: 100.0,
            angle_step: 0.04,
            arc_center_dx: 150.0,
            arc_center_dy: 80.0,
            lateral_drift_ratio: 0.2,
            back_row_preference: 0.7,
            back_row_min: 2,
        }
    }
}

/// Complete, immutable simulation configuration.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (1/60 matches one animation frame).
    pub fixed_timestep: f32,
    /// Upper bound on fixed updates run by a single `step` call.
    pub max_steps_per_call: u32,
    /// Seed for every random choice the simulation makes.
    pub seed: u64,
    pub canvas: CanvasConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub player_projectile: ProjectileConfig,
    pub enemy_projectile: ProjectileConfig,
    pub power_up: PowerUpConfig,
    pub bonus_flyer: BonusFlyerConfig,
    pub diving: DivingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_steps_per_call: 5,
            seed: 0x5EED_1A7E,
            canvas: CanvasConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            player_projectile: ProjectileConfig::default(),
            enemy_projectile: ProjectileConfig {
                speed: 4.0,
                ..ProjectileConfig::default()
            },
            power_up: PowerUpConfig::default(),
            bonus_flyer: BonusFlyerConfig::default(),
            diving: DivingConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Fixed timestep expressed in milliseconds of simulation clock.
    pub fn timestep_ms(&self) -> f64 {
        f64::from(self.fixed_timestep) * 1000.0
    }

    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fixed_timestep", f64::from(self.fixed_timestep))?;
        if self.max_steps_per_call == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_steps_per_call",
                value: 0.0,
            });
        }

        positive("canvas.width", f64::from(self.canvas.width))?;
        positive("canvas.height", f64::from(self.canvas.height))?;

        positive("player.width", f64::from(self.player.width))?;
        positive("player.height", f64::from(self.player.height))?;
        positive("player.speed", f64::from(self.player.speed))?;
        positive("player.shoot_cooldown_ms", self.player.shoot_cooldown_ms)?;
        if self.player.starting_lives == 0 {
            return Err(ConfigError::NonPositive {
                field: "player.starting_lives",
                value: 0.0,
            });
        }

        positive("enemy.width", f64::from(self.enemy.width))?;
        positive("enemy.height", f64::from(self.enemy.height))?;
        positive("enemy.base_speed", f64::from(self.enemy.base_speed))?;
        positive("enemy.shot_interval_ms", self.enemy.shot_interval_ms)?;
        positive("enemy.drop_distance", f64::from(self.enemy.drop_distance))?;
        if self.enemy.rows == 0 || self.enemy.cols == 0 {
            return Err(ConfigError::EmptyFormation {
                rows: self.enemy.rows,
                cols: self.enemy.cols,
            });
        }

        positive("player_projectile.width", f64::from(self.player_projectile.width))?;
        positive("player_projectile.height", f64::from(self.player_projectile.height))?;
        positive("player_projectile.speed", f64::from(self.player_projectile.speed))?;
        positive("enemy_projectile.width", f64::from(self.enemy_projectile.width))?;
        positive("enemy_projectile.height", f64::from(self.enemy_projectile.height))?;
        positive("enemy_projectile.speed", f64::from(self.enemy_projectile.speed))?;

        positive("power_up.width", f64::from(self.power_up.width))?;
        positive("power_up.height", f64::from(self.power_up.height))?;
        positive("power_up.speed", f64::from(self.power_up.speed))?;
        positive("power_up.duration_ms", self.power_up.duration_ms)?;
        probability("power_up.spawn_chance", self.power_up.spawn_chance)?;

        positive("bonus_flyer.width", f64::from(self.bonus_flyer.width))?;
        positive("bonus_flyer.height", f64::from(self.bonus_flyer.height))?;
        positive("bonus_flyer.speed", f64::from(self.bonus_flyer.speed))?;
        positive("bonus_flyer.spawn_interval_ms", self.bonus_flyer.spawn_interval_ms)?;
        if self.bonus_flyer.point_values.is_empty() {
            return Err(ConfigError::EmptyPointTable);
        }

        positive("diving.spawn_interval_ms", self.diving.spawn_interval_ms)?;
        positive("diving.speed", f64::from(self.diving.speed))?;
        positive("diving.angle_step", f64::from(self.diving.angle_step))?;
        positive("diving.arc_radius", f64::from(self.diving.arc_radius))?;
        probability("diving.back_row_preference", self.diving.back_row_preference)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails this comparison as well.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}
