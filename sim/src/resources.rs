//! World-level state shared by the systems: clock, scoreboard, game status,
//! formation motion, cooldown timers and the seeded RNG.

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Simulation clock. Advances only while the game is being stepped.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    /// Elapsed simulation time in milliseconds.
    pub now_ms: f64,
    /// Fixed updates run so far.
    pub frame: u64,
}

impl SimClock {
    pub fn advance(&mut self, dt_ms: f64) {
        self.now_ms += dt_ms;
        self.frame = self.frame.wrapping_add(1);
    }
}

/// High-level lifecycle state.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Constructed but never started.
    #[default]
    Idle,
    Running,
    Paused,
    LevelComplete,
    GameOver,
}

impl GameStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, GameStatus::Running)
    }
}

/// Score, lives and level.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
}

impl Scoreboard {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            level: 1,
        }
    }

    /// Score only ever grows.
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Remove one life. Returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

/// Direction and speed shared by every formation member.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FormationMotion {
    /// +1 moving right, -1 moving left.
    pub direction: f32,
    pub speed: f32,
}

impl Default for FormationMotion {
    fn default() -> Self {
        Self {
            direction: 1.0,
            speed: 1.0,
        }
    }
}

/// Clock times of the last spawn of each time-gated kind.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SpawnTimers {
    /// `None` until the first enemy shot, so the first one is never gated.
    pub last_enemy_shot: Option<f64>,
    pub last_dive: f64,
    pub last_bonus_flyer: f64,
    /// Launch counter for divers.
    pub dive_seq: u64,
}

impl SpawnTimers {
    /// Re-arm the level-scoped cooldowns.
    pub fn rearm(&mut self, now: f64) {
        self.last_dive = now;
        self.last_bonus_flyer = now;
    }

    pub fn enemy_shot_ready(&self, now: f64, interval: f64) -> bool {
        self.last_enemy_shot.map_or(true, |last| now - last >= interval)
    }

    pub fn dive_ready(&self, now: f64, interval: f64) -> bool {
        now - self.last_dive >= interval
    }

    pub fn bonus_flyer_ready(&self, now: f64, interval: f64) -> bool {
        now - self.last_bonus_flyer >= interval
    }
}

/// Player shooting cooldown, counted down each frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FireControl {
    pub cooldown_remaining_ms: f64,
}

impl FireControl {
    pub fn can_fire(&self) -> bool {
        self.cooldown_remaining_ms <= 0.0
    }

    pub fn tick(&mut self, dt_ms: f64) {
        self.cooldown_remaining_ms = (self.cooldown_remaining_ms - dt_ms).max(0.0);
    }
}

/// The one source of randomness in the simulation.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index into a non-empty collection of `len` items.
    pub fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    /// +1.0 or -1.0 with equal probability.
    pub fn sign(&mut self) -> f32 {
        if self.0.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }

    pub fn range(&mut self, low: f32, high: f32) -> f32 {
        self.0.gen_range(low..high)
    }
}
