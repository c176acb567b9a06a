//! Flat buffer bridge
//!
//! Converts a `Snapshot` into a contiguous `f32` buffer for hosts that
//! cannot consume JSON cheaply (engine plugins, WASM canvases, FFI).
//!
//! # Stable Contract
//!
//! The buffer is a header followed by one fixed-stride record per entity.
//! Field order and count are part of the contract; change them only
//! together with the constants below.
//!
//! # Buffer Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ HEADER (HEADER_SIZE = 5 elements)                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ [0] entity_count   [1] score   [2] lives   [3] level            │
//! │ [4] status (see STATUS_* constants)                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ ENTITY RECORDS (entity_count × ENTITY_STRIDE elements)          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ For each entity i (offset = HEADER_SIZE + i * ENTITY_STRIDE):   │
//! │   [+0] kind     - KIND_* constant                               │
//! │   [+1] x        - center x                                      │
//! │   [+2] y        - top y (pickups and particles: center y)       │
//! │   [+3] width                                                    │
//! │   [+4] height                                                   │
//! │   [+5] variant  - row, power-up kind, points or spark size      │
//! │   [+6] aux      - see per-kind table                            │
//! │   [+7] aux2     - see per-kind table                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Per-kind fields
//!
//! | Kind         | variant          | aux                  | aux2        |
//! |--------------|------------------|----------------------|-------------|
//! | Player       | 0                | power-up bitmask     | vx          |
//! | Enemy        | row              | col                  | 0           |
//! | Diver        | row              | phase (0 arc, 1 descent) | seq     |
//! | PlayerShot   | 0                | 0                    | 0           |
//! | EnemyShot    | 0                | 0                    | 0           |
//! | Pickup       | POWER_UP_* id    | rotation             | pulse phase |
//! | BonusFlyer   | points           | direction            | 0           |
//! | Spark        | size             | alpha                | packed rgb  |
//! | ScorePopup   | points           | alpha                | 0           |
//!
//! # Determinism
//!
//! The same `Snapshot` always produces the same buffer. Records follow the
//! snapshot order: player, formation (grid order), divers (launch order),
//! projectiles, pickups, bonus flyer, particles.

use crate::components::{DivePhase, Owner, ParticleKind, PowerUpKind};
use crate::resources::GameStatus;
use crate::world::Snapshot;

// ============================================================================
// CONSTANTS - STABLE CONTRACT
// ============================================================================

/// Number of f32 values per entity record.
pub const ENTITY_STRIDE: usize = 8;

/// Number of f32 values in the buffer header.
pub const HEADER_SIZE: usize = 5;

pub const KIND_PLAYER: f32 = 0.0;
pub const KIND_ENEMY: f32 = 1.0;
pub const KIND_DIVER: f32 = 2.0;
pub const KIND_PLAYER_SHOT: f32 = 3.0;
pub const KIND_ENEMY_SHOT: f32 = 4.0;
pub const KIND_PICKUP: f32 = 5.0;
pub const KIND_BONUS_FLYER: f32 = 6.0;
pub const KIND_SPARK: f32 = 7.0;
pub const KIND_SCORE_POPUP: f32 = 8.0;

pub const STATUS_IDLE: f32 = 0.0;
pub const STATUS_RUNNING: f32 = 1.0;
pub const STATUS_PAUSED: f32 = 2.0;
pub const STATUS_LEVEL_COMPLETE: f32 = 3.0;
pub const STATUS_GAME_OVER: f32 = 4.0;

pub const POWER_UP_RAPID_FIRE: f32 = 0.0;
pub const POWER_UP_SHIELD: f32 = 1.0;
pub const POWER_UP_MULTI_SHOT: f32 = 2.0;

/// Player power-up bitmask bits (stored in `aux`).
pub const FLAG_SHIELD: u32 = 1;
pub const FLAG_RAPID_FIRE: u32 = 1 << 1;
pub const FLAG_MULTI_SHOT: u32 = 1 << 2;

// ============================================================================
// FIELD OFFSET CONSTANTS
// ============================================================================

pub const FIELD_KIND: usize = 0;
pub const FIELD_X: usize = 1;
pub const FIELD_Y: usize = 2;
pub const FIELD_WIDTH: usize = 3;
pub const FIELD_HEIGHT: usize = 4;
pub const FIELD_VARIANT: usize = 5;
pub const FIELD_AUX: usize = 6;
pub const FIELD_AUX2: usize = 7;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

#[inline]
pub fn status_to_id(status: GameStatus) -> f32 {
    match status {
        GameStatus::Idle => STATUS_IDLE,
        GameStatus::Running => STATUS_RUNNING,
        GameStatus::Paused => STATUS_PAUSED,
        GameStatus::LevelComplete => STATUS_LEVEL_COMPLETE,
        GameStatus::GameOver => STATUS_GAME_OVER,
    }
}

#[inline]
pub fn power_up_to_id(kind: PowerUpKind) -> f32 {
    match kind {
        PowerUpKind::RapidFire => POWER_UP_RAPID_FIRE,
        PowerUpKind::Shield => POWER_UP_SHIELD,
        PowerUpKind::MultiShot => POWER_UP_MULTI_SHOT,
    }
}

#[inline]
fn phase_to_id(phase: DivePhase) -> f32 {
    match phase {
        DivePhase::Arc => 0.0,
        DivePhase::Descent => 1.0,
    }
}

#[inline]
fn owner_to_kind(owner: Owner) -> f32 {
    match owner {
        Owner::Player => KIND_PLAYER_SHOT,
        Owner::Enemy => KIND_ENEMY_SHOT,
    }
}

// ============================================================================
// MAIN SERIALIZATION FUNCTION
// ============================================================================

/// Convert a snapshot to a flat buffer. See the module docs for the layout.
pub fn snapshot_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let entity_count = snapshot.entity_count() + snapshot.particles.len();
    let buffer_size = calculate_buffer_size(entity_count);
    let mut buffer = Vec::with_capacity(buffer_size);

    buffer.push(entity_count as f32);
    buffer.push(snapshot.score as f32);
    buffer.push(snapshot.lives as f32);
    buffer.push(snapshot.level as f32);
    buffer.push(status_to_id(snapshot.status));

    let mut record = |fields: [f32; ENTITY_STRIDE]| buffer.extend_from_slice(&fields);

    if let Some(p) = &snapshot.player {
        let mut flags = 0;
        if p.shield {
            flags |= FLAG_SHIELD;
        }
        if p.rapid_fire {
            flags |= FLAG_RAPID_FIRE;
        }
        if p.multi_shot {
            flags |= FLAG_MULTI_SHOT;
        }
        record([KIND_PLAYER, p.x, p.y, p.width, p.height, 0.0, flags as f32, p.vx]);
    }
    for e in &snapshot.enemies {
        record([KIND_ENEMY, e.x, e.y, e.width, e.height, e.row as f32, e.col as f32, 0.0]);
    }
    for d in &snapshot.divers {
        record([
            KIND_DIVER,
            d.x,
            d.y,
            d.width,
            d.height,
            d.row as f32,
            phase_to_id(d.phase),
            d.seq as f32,
        ]);
    }
    for p in &snapshot.projectiles {
        record([owner_to_kind(p.owner), p.x, p.y, p.width, p.height, 0.0, 0.0, 0.0]);
    }
    for p in &snapshot.pickups {
        record([
            KIND_PICKUP,
            p.x,
            p.y,
            p.width,
            p.height,
            power_up_to_id(p.kind),
            p.rotation,
            p.pulse_phase,
        ]);
    }
    if let Some(f) = &snapshot.bonus_flyer {
        record([KIND_BONUS_FLYER, f.x, f.y, f.width, f.height, f.points as f32, f.direction, 0.0]);
    }
    for p in &snapshot.particles {
        match p.kind {
            ParticleKind::Spark { color, size } => {
                let rgb = (u32::from(color.r) << 16) | (u32::from(color.g) << 8) | u32::from(color.b);
                record([KIND_SPARK, p.x, p.y, size, size, size, p.alpha, rgb as f32]);
            }
            ParticleKind::ScorePopup { points } => {
                record([KIND_SCORE_POPUP, p.x, p.y, 0.0, 0.0, points as f32, p.alpha, 0.0]);
            }
        }
    }

    debug_assert_eq!(buffer.len(), buffer_size, "Buffer size mismatch");
    buffer
}

#[inline]
pub fn calculate_buffer_size(entity_count: usize) -> usize {
    HEADER_SIZE + entity_count * ENTITY_STRIDE
}

/// Entity count from a flat buffer, `None` if the header is missing.
#[inline]
pub fn parse_entity_count(buffer: &[f32]) -> Option<usize> {
    if buffer.len() < HEADER_SIZE {
        return None;
    }
    Some(buffer[0] as usize)
}

#[inline]
pub const fn entity_offset(index: usize) -> usize {
    HEADER_SIZE + index * ENTITY_STRIDE
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SimWorld;
    use crate::components::Color;
    use crate::world::{ParticleSnapshot, ProjectileSnapshot};

    #[test]
    fn test_idle_world_has_header_only() {
        let mut sim = SimWorld::new();
        let buffer = snapshot_to_flatbuffer(&sim.snapshot());
        assert_eq!(buffer.len(), HEADER_SIZE);
        assert_eq!(buffer[0], 0.0);
        assert_eq!(buffer[4], STATUS_IDLE);
    }

    #[test]
    fn test_started_world_layout() {
        let mut sim = SimWorld::new();
        sim.start();
        let snapshot = sim.snapshot();
        let buffer = snapshot_to_flatbuffer(&snapshot);

        // Player plus the full 4x10 grid.
        assert_eq!(parse_entity_count(&buffer), Some(41));
        assert_eq!(buffer.len(), calculate_buffer_size(41));
        assert_eq!(buffer[2], 3.0, "lives");
        assert_eq!(buffer[3], 1.0, "level");
        assert_eq!(buffer[4], STATUS_RUNNING);

        let player = entity_offset(0);
        assert_eq!(buffer[player + FIELD_KIND], KIND_PLAYER);
        assert_eq!(buffer[player + FIELD_X], 400.0);
        assert_eq!(buffer[player + FIELD_Y], 540.0);

        let last_enemy = entity_offset(40);
        assert_eq!(buffer[last_enemy + FIELD_KIND], KIND_ENEMY);
        assert_eq!(buffer[last_enemy + FIELD_VARIANT], 3.0, "row");
        assert_eq!(buffer[last_enemy + FIELD_AUX], 9.0, "col");
    }

    #[test]
    fn test_projectile_and_particle_records() {
        let snapshot = Snapshot {
            projectiles: vec![ProjectileSnapshot {
                owner: Owner::Enemy,
                x: 10.0,
                y: 20.0,
                width: 4.0,
                height: 15.0,
            }],
            particles: vec![ParticleSnapshot {
                kind: ParticleKind::Spark {
                    color: Color::rgb(0x01, 0x02, 0x03),
                    size: 3.0,
                },
                x: 1.0,
                y: 2.0,
                alpha: 0.5,
            }],
            ..Snapshot::default()
        };
        let buffer = snapshot_to_flatbuffer(&snapshot);
        assert_eq!(parse_entity_count(&buffer), Some(2));
        assert_eq!(buffer[entity_offset(0) + FIELD_KIND], KIND_ENEMY_SHOT);
        let spark = entity_offset(1);
        assert_eq!(buffer[spark + FIELD_KIND], KIND_SPARK);
        assert_eq!(buffer[spark + FIELD_AUX], 0.5);
        assert_eq!(buffer[spark + FIELD_AUX2], 0x010203 as f32);
    }

    #[test]
    fn test_flatbuffer_determinism() {
        let mut a = SimWorld::new();
        let mut b = SimWorld::new();
        a.start();
        b.start();
        for _ in 0..120 {
            a.step_frame();
            b.step_frame();
        }
        assert_eq!(
            snapshot_to_flatbuffer(&a.snapshot()),
            snapshot_to_flatbuffer(&b.snapshot())
        );
    }

    #[test]
    fn test_parse_entity_count_needs_header() {
        assert_eq!(parse_entity_count(&[]), None);
        assert_eq!(parse_entity_count(&[2.0, 0.0, 3.0, 1.0, 1.0]), Some(2));
    }

    #[test]
    fn test_field_offsets_are_valid() {
        assert_eq!(ENTITY_STRIDE, FIELD_AUX2 + 1);
        assert_eq!(entity_offset(0), HEADER_SIZE);
        assert_eq!(entity_offset(3), HEADER_SIZE + 3 * ENTITY_STRIDE);
    }
}
