//! Motion systems - per-kind position updates and boundary culling.
//!
//! Every system only touches live entities. Leaving the play area kills an
//! entity through its `Liveness`; the actual despawn happens at the end of
//! the frame in `despawn_dead_system`.

use crate::components::*;
use crate::config::GameConfig;
use crate::resources::FormationMotion;
use bevy_ecs::prelude::*;

/// Rotation added to a falling pickup each frame (radians).
const PICKUP_SPIN: f32 = 0.05;
/// Pulse phase added to a falling pickup each frame.
const PICKUP_PULSE: f32 = 0.1;

/// Moves the formation in lockstep.
///
/// If the shared displacement would push any live member past a side edge
/// (allowing for half the sprite width), the whole formation drops instead
/// and the direction flips. No member moves horizontally on a drop frame.
pub fn formation_motion_system(
    config: Res<GameConfig>,
    mut motion: ResMut<FormationMotion>,
    mut query: Query<(&mut Position, &FormationEnemy)>,
) {
    let step = motion.speed * motion.direction;
    let half = config.enemy.width / 2.0;
    let max_x = config.canvas.width - half;

    let hits_edge = query
        .iter()
        .filter(|(_, enemy)| enemy.is_live())
        .any(|(pos, _)| {
            let next_x = pos.x + step;
            next_x > max_x || next_x < half
        });

    for (mut pos, enemy) in query.iter_mut() {
        if !enemy.is_live() {
            continue;
        }
        if hits_edge {
            pos.y += config.enemy.drop_distance;
        } else {
            pos.x += step;
        }
    }

    if hits_edge {
        motion.direction = -motion.direction;
    }
}

/// Advances divers along their dive path and kills those that leave the
/// left, right or bottom edge by more than half their size.
pub fn diving_motion_system(
    config: Res<GameConfig>,
    mut query: Query<(&mut Position, &mut DivingEnemy, &Hitbox)>,
) {
    let (width, height) = (config.canvas.width, config.canvas.height);
    for (mut pos, mut diver, hitbox) in query.iter_mut() {
        if !diver.is_live() {
            continue;
        }
        diver.path.advance(&mut pos);

        let half_w = hitbox.width / 2.0;
        let half_h = hitbox.height / 2.0;
        if pos.y > height + half_h || pos.x < -half_w || pos.x > width + half_w {
            diver.live.kill();
        }
    }
}

pub fn bonus_flyer_motion_system(
    config: Res<GameConfig>,
    mut query: Query<(&mut Position, &mut BonusFlyer, &Hitbox)>,
) {
    for (mut pos, mut flyer, hitbox) in query.iter_mut() {
        if !flyer.is_live() {
            continue;
        }
        pos.x += flyer.speed * flyer.direction;

        let gone = if flyer.direction > 0.0 {
            pos.x > config.canvas.width + hitbox.width
        } else {
            pos.x < -hitbox.width
        };
        if gone {
            flyer.live.kill();
        }
    }
}

/// Moves projectiles vertically; they die once outside the canvas rows.
pub fn projectile_motion_system(
    config: Res<GameConfig>,
    mut query: Query<(&mut Position, &mut Projectile)>,
) {
    for (mut pos, mut projectile) in query.iter_mut() {
        if !projectile.is_live() {
            continue;
        }
        pos.y += projectile.speed;
        if pos.y < 0.0 || pos.y > config.canvas.height {
            projectile.live.kill();
        }
    }
}

pub fn pickup_motion_system(
    config: Res<GameConfig>,
    mut query: Query<(&mut Position, &mut PowerUpPickup, &Hitbox)>,
) {
    for (mut pos, mut pickup, hitbox) in query.iter_mut() {
        if !pickup.is_live() {
            continue;
        }
        pos.y += pickup.speed;
        pickup.rotation += PICKUP_SPIN;
        pickup.pulse_phase += PICKUP_PULSE;

        if pos.y > config.canvas.height + hitbox.height {
            pickup.live.kill();
        }
    }
}
