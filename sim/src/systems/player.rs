//! Player systems - movement, power-up expiry and firing.

use crate::components::*;
use crate::config::GameConfig;
use crate::input::{InputState, Key};
use crate::resources::{FireControl, SimClock};
use bevy_ecs::prelude::*;

/// Applies the held direction and clamps the ship inside the canvas.
pub fn player_motion_system(
    config: Res<GameConfig>,
    input: Res<InputState>,
    mut query: Query<(&mut Position, &mut Velocity, &Hitbox), With<Player>>,
) {
    let canvas_width = config.canvas.width;
    for (mut pos, mut vel, hitbox) in query.iter_mut() {
        vel.vx = input.horizontal() * config.player.speed;
        pos.x += vel.vx;

        let half = hitbox.width / 2.0;
        pos.x = pos.x.clamp(half, (canvas_width - half).max(half));
    }
}

/// Clears power-ups whose expiry time has passed.
pub fn power_up_expiry_system(clock: Res<SimClock>, mut query: Query<&mut Player>) {
    for mut player in query.iter_mut() {
        player.power_ups.expire(clock.now_ms);
    }
}

/// Counts the shooting cooldown down by one frame.
pub fn fire_cooldown_system(config: Res<GameConfig>, mut fire: ResMut<FireControl>) {
    fire.tick(config.timestep_ms());
}

/// Fires on a fresh press of the fire key when the cooldown allows it.
pub fn player_fire_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut input: ResMut<InputState>,
    mut fire: ResMut<FireControl>,
    query: Query<(&Position, &Player)>,
) {
    if !input.take_press(Key::Fire) || !fire.can_fire() {
        return;
    }
    let Ok((pos, player)) = query.get_single() else {
        return;
    };

    let y = pos.y - config.player.muzzle_offset;
    if player.power_ups.has(PowerUpKind::MultiShot) {
        let spread = config.player.multi_shot_spread;
        for dx in [-spread, 0.0, spread] {
            commands.spawn(ProjectileBundle::player(pos.x + dx, y, &config));
        }
    } else {
        commands.spawn(ProjectileBundle::player(pos.x, y, &config));
    }

    fire.cooldown_remaining_ms = if player.power_ups.has(PowerUpKind::RapidFire) {
        config.player.shoot_cooldown_ms / 3.0
    } else {
        config.player.shoot_cooldown_ms
    };
}
