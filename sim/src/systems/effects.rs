//! Visual effects: explosion sparks and floating score popups.
//!
//! Particles never collide and never affect game state. Spark velocities
//! and sizes come from `SimRng`.

use crate::components::*;
use crate::resources::SimRng;
use bevy_ecs::prelude::*;

const SPARKS_PER_EXPLOSION: usize = 15;
const SPARK_LIFE: u32 = 30;
const SPARK_MAX_SPEED: f32 = 2.0;
const SPARK_MIN_SIZE: f32 = 2.0;
const SPARK_MAX_SIZE: f32 = 5.0;
const POPUP_LIFE: u32 = 60;
const POPUP_RISE: f32 = 1.0;

/// Burst of sparks at `(x, y)` in `color`.
pub fn spawn_explosion(commands: &mut Commands, rng: &mut SimRng, x: f32, y: f32, color: Color) {
    for _ in 0..SPARKS_PER_EXPLOSION {
        let vx = rng.range(-SPARK_MAX_SPEED, SPARK_MAX_SPEED);
        let vy = rng.range(-SPARK_MAX_SPEED, SPARK_MAX_SPEED);
        let size = rng.range(SPARK_MIN_SIZE, SPARK_MAX_SIZE);
        commands.spawn(ParticleBundle {
            particle: Particle {
                kind: ParticleKind::Spark { color, size },
                life: SPARK_LIFE,
                max_life: SPARK_LIFE,
            },
            position: Position::new(x, y),
            velocity: Velocity::new(vx, vy),
        });
    }
}

/// Rising "+points" label.
pub fn spawn_score_popup(commands: &mut Commands, x: f32, y: f32, points: u32) {
    commands.spawn(ParticleBundle {
        particle: Particle {
            kind: ParticleKind::ScorePopup { points },
            life: POPUP_LIFE,
            max_life: POPUP_LIFE,
        },
        position: Position::new(x, y),
        velocity: Velocity::new(0.0, -POPUP_RISE),
    });
}

/// Moves particles and ages them by one frame.
pub fn particle_system(mut query: Query<(&mut Position, &Velocity, &mut Particle)>) {
    for (mut pos, vel, mut particle) in query.iter_mut() {
        if particle.is_expired() {
            continue;
        }
        pos.x += vel.vx;
        pos.y += vel.vy;
        particle.life -= 1;
    }
}
