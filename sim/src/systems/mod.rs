//! ECS systems for the invaders simulation.
//!
//! Systems contain the game logic that operates on components. All of them
//! run in one fixed order per frame (see `SimWorld`):
//!
//! **Group 1 (Player)**:
//! - `player_motion_system` - Applies horizontal input, clamps to the canvas
//! - `power_up_expiry_system` - Clears expired power-up flags
//! - `fire_cooldown_system` - Counts the shooting cooldown down
//! - `player_fire_system` - Fires on a fresh fire press
//!
//! **Group 2 (Motion)**:
//! - `formation_motion_system` - Lockstep march, edge drop and reversal
//! - `diving_motion_system` - Arc then descent
//! - `bonus_flyer_motion_system`
//! - `projectile_motion_system`
//! - `pickup_motion_system`
//! - `particle_system`
//!
//! **Group 3 (Spawning)** - Time-gated on the simulation clock:
//! - `enemy_fire_system` - Random front-line shooter
//! - `bonus_flyer_spawn_system`
//! - `dive_attack_system` - Back-row preferred dive launch
//!
//! **Group 4 (Collision)** - Fixed precedence:
//! - `player_projectile_hits_system`
//! - `power_up_pickup_system`
//! - `player_hit_system`
//! - `formation_reach_system`
//!
//! **Group 5 (Lifecycle)**:
//! - `level_complete_system`
//! - `despawn_dead_system`

pub mod collision;
pub mod effects;
pub mod lifecycle;
pub mod motion;
pub mod player;
pub mod serialization;
pub mod spawning;

pub use collision::*;
pub use effects::*;
pub use lifecycle::*;
pub use motion::*;
pub use player::*;
pub use serialization::*;
pub use spawning::*;
