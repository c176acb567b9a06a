//! Collision & scoring resolver.
//!
//! Runs once per frame after motion and spawning, in a fixed precedence:
//!
//! 1. `player_projectile_hits_system` - player shots vs formation, then
//!    divers, then the bonus flyer. First match wins.
//! 2. `power_up_pickup_system` - pickups vs the player.
//! 3. `player_hit_system` - enemy shots, then diver contact, vs the player.
//! 4. `formation_reach_system` - formation bottom edge vs the player row.
//!
//! ## Determinism
//!
//! ECS storage order is not a gameplay order. Candidate targets are sorted
//! by grid slot (formation) or launch sequence (divers) before scanning, and
//! shots are sorted by entity, so the credited target and the RNG draw order
//! only depend on the seed and the inputs.

use crate::components::*;
use crate::config::GameConfig;
use crate::resources::{GameStatus, Scoreboard, SimClock, SimRng};
use crate::systems::effects::{spawn_explosion, spawn_score_popup};
use crate::systems::spawning::roll_power_up_drop;
use bevy_ecs::prelude::*;
use tracing::{debug, info};

/// Points for a formation kill, multiplied by the level.
pub const FORMATION_KILL_POINTS: u32 = 10;
/// Points for a diver kill, multiplied by the level.
pub const DIVER_KILL_POINTS: u32 = 25;

/// A live target captured before the scan. `taken` marks targets already
/// credited to an earlier shot this frame.
struct Target<K> {
    key: K,
    entity: Entity,
    pos: Position,
    aabb: Aabb,
    taken: bool,
}

impl<K: Ord> Target<K> {
    fn sorted(mut targets: Vec<Target<K>>) -> Vec<Target<K>> {
        targets.sort_by(|a, b| a.key.cmp(&b.key));
        targets
    }
}

/// First untaken target overlapping `shot`, marked as taken.
fn claim_first<K>(targets: &mut [Target<K>], shot: &Aabb) -> Option<(Entity, Position)> {
    let target = targets
        .iter_mut()
        .find(|t| !t.taken && t.aabb.overlaps(shot))?;
    target.taken = true;
    Some((target.entity, target.pos))
}

/// Resolves player projectiles against every enemy kind.
#[allow(clippy::too_many_arguments)]
pub fn player_projectile_hits_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut scoreboard: ResMut<Scoreboard>,
    mut rng: ResMut<SimRng>,
    mut shots: Query<(Entity, &Position, &Hitbox, &mut Projectile)>,
    mut formation: Query<(Entity, &Position, &Hitbox, &mut FormationEnemy)>,
    mut divers: Query<(Entity, &Position, &Hitbox, &mut DivingEnemy)>,
    mut flyers: Query<(Entity, &Position, &Hitbox, &mut BonusFlyer)>,
) {
    let mut player_shots: Vec<(Entity, Aabb)> = shots
        .iter()
        .filter(|(_, _, _, p)| p.is_live() && p.owner == Owner::Player)
        .map(|(e, pos, hitbox, _)| (e, hitbox.aabb(pos)))
        .collect();
    if player_shots.is_empty() {
        return;
    }
    player_shots.sort_by_key(|(e, _)| *e);

    let mut formation_targets = Target::sorted(
        formation
            .iter()
            .filter(|(_, _, _, enemy)| enemy.is_live())
            .map(|(entity, pos, hitbox, enemy)| Target {
                key: enemy.slot,
                entity,
                pos: *pos,
                aabb: hitbox.aabb(pos),
                taken: false,
            })
            .collect(),
    );
    let mut diver_targets = Target::sorted(
        divers
            .iter()
            .filter(|(_, _, _, diver)| diver.is_live())
            .map(|(entity, pos, hitbox, diver)| Target {
                key: diver.seq,
                entity,
                pos: *pos,
                aabb: hitbox.aabb(pos),
                taken: false,
            })
            .collect(),
    );
    let mut flyer_targets = Target::sorted(
        flyers
            .iter()
            .filter(|(_, _, _, flyer)| flyer.is_live())
            .map(|(entity, pos, hitbox, _)| Target {
                key: entity,
                entity,
                pos: *pos,
                aabb: hitbox.aabb(pos),
                taken: false,
            })
            .collect(),
    );

    let level = scoreboard.level;
    for (shot_entity, shot_box) in player_shots {
        let hit = if let Some((entity, pos)) = claim_first(&mut formation_targets, &shot_box) {
            if let Ok((_, _, _, mut enemy)) = formation.get_mut(entity) {
                enemy.live.kill();
                scoreboard.award(FORMATION_KILL_POINTS * level);
                spawn_explosion(&mut commands, &mut rng, pos.x, pos.y, Color::for_row(enemy.slot.row));
                roll_power_up_drop(&mut commands, &mut rng, &config, pos.x, pos.y);
            }
            true
        } else if let Some((entity, pos)) = claim_first(&mut diver_targets, &shot_box) {
            if let Ok((_, _, _, mut diver)) = divers.get_mut(entity) {
                diver.live.kill();
                scoreboard.award(DIVER_KILL_POINTS * level);
                spawn_explosion(&mut commands, &mut rng, pos.x, pos.y, Color::for_row(diver.row));
                roll_power_up_drop(&mut commands, &mut rng, &config, pos.x, pos.y);
            }
            true
        } else if let Some((entity, pos)) = claim_first(&mut flyer_targets, &shot_box) {
            if let Ok((_, _, _, mut flyer)) = flyers.get_mut(entity) {
                flyer.live.kill();
                scoreboard.award(flyer.points);
                spawn_explosion(&mut commands, &mut rng, pos.x, pos.y, Color::BONUS_FLYER);
                spawn_score_popup(&mut commands, pos.x, pos.y, flyer.points);
                debug!(points = flyer.points, "Bonus flyer destroyed");
            }
            true
        } else {
            false
        };

        if hit {
            if let Ok((_, _, _, mut projectile)) = shots.get_mut(shot_entity) {
                projectile.live.kill();
            }
        }
    }
}

/// Collects falling pickups that overlap the player.
pub fn power_up_pickup_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut scoreboard: ResMut<Scoreboard>,
    mut rng: ResMut<SimRng>,
    mut players: Query<(&Position, &Hitbox, &mut Player)>,
    mut pickups: Query<(Entity, &Position, &Hitbox, &mut PowerUpPickup)>,
) {
    let Ok((player_pos, player_hitbox, mut player)) = players.get_single_mut() else {
        return;
    };
    let player_box = player_hitbox.aabb(player_pos);

    let mut collected: Vec<(Entity, Position)> = pickups
        .iter()
        .filter(|(_, pos, hitbox, pickup)| pickup.is_live() && hitbox.aabb(pos).overlaps(&player_box))
        .map(|(entity, pos, _, _)| (entity, *pos))
        .collect();
    collected.sort_by_key(|(e, _)| *e);

    for (entity, pos) in collected {
        let Ok((_, _, _, mut pickup)) = pickups.get_mut(entity) else {
            continue;
        };
        if !pickup.live.kill() {
            continue;
        }
        player
            .power_ups
            .activate(pickup.kind, clock.now_ms + config.power_up.duration_ms);
        scoreboard.award(config.power_up.pickup_score);
        spawn_explosion(&mut commands, &mut rng, pos.x, pos.y, Color::WHITE);
        debug!(kind = ?pickup.kind, "Power-up collected");
    }
}

/// What a single hit on the player did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    ShieldAbsorbed,
    Respawned,
    GameOver,
}

/// Applies one hit: spend the shield if any, else a life. Respawns the
/// player at the start position (power-ups cleared) while lives remain.
#[allow(clippy::too_many_arguments)]
fn resolve_player_hit(
    commands: &mut Commands,
    rng: &mut SimRng,
    config: &GameConfig,
    scoreboard: &mut Scoreboard,
    status: &mut GameStatus,
    pos: &mut Position,
    vel: &mut Velocity,
    player: &mut Player,
) -> HitOutcome {
    if player.power_ups.consume_shield() {
        spawn_explosion(commands, rng, pos.x, pos.y, Color::SHIELD);
        debug!("Shield absorbed hit");
        return HitOutcome::ShieldAbsorbed;
    }

    let lives = scoreboard.lose_life();
    spawn_explosion(commands, rng, pos.x, pos.y, Color::PLAYER);
    if lives == 0 {
        *status = GameStatus::GameOver;
        info!(score = scoreboard.score, level = scoreboard.level, "Game over: no lives left");
        return HitOutcome::GameOver;
    }

    *pos = player_spawn_point(config);
    *vel = Velocity::default();
    *player = Player::default();
    debug!(lives, "Life lost, player respawned");
    HitOutcome::Respawned
}

/// Enemy shots and diver contact against the player.
///
/// Diver contact kills the diver without awarding score or rolling a drop.
/// Once a hit ends the game, later hits in the same frame are ignored.
#[allow(clippy::too_many_arguments)]
pub fn player_hit_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut scoreboard: ResMut<Scoreboard>,
    mut status: ResMut<GameStatus>,
    mut rng: ResMut<SimRng>,
    mut players: Query<(&mut Position, &mut Velocity, &Hitbox, &mut Player)>,
    mut shots: Query<(Entity, &Position, &Hitbox, &mut Projectile), Without<Player>>,
    mut divers: Query<(&Position, &Hitbox, &mut DivingEnemy), Without<Player>>,
) {
    if *status == GameStatus::GameOver {
        return;
    }
    let Ok((mut pos, mut vel, hitbox, mut player)) = players.get_single_mut() else {
        return;
    };

    let mut enemy_shots: Vec<Entity> = shots
        .iter()
        .filter(|(_, _, _, p)| p.is_live() && p.owner == Owner::Enemy)
        .map(|(e, _, _, _)| e)
        .collect();
    enemy_shots.sort();

    for entity in enemy_shots {
        let player_box = hitbox.aabb(&pos);
        let Ok((_, shot_pos, shot_hitbox, mut shot)) = shots.get_mut(entity) else {
            continue;
        };
        if !shot_hitbox.aabb(shot_pos).overlaps(&player_box) {
            continue;
        }
        shot.live.kill();
        let outcome = resolve_player_hit(
            &mut commands,
            &mut rng,
            &config,
            &mut scoreboard,
            &mut status,
            &mut pos,
            &mut vel,
            &mut player,
        );
        if outcome == HitOutcome::GameOver {
            return;
        }
    }

    let mut ordered: Vec<_> = divers
        .iter_mut()
        .filter(|(_, _, diver)| diver.is_live())
        .collect();
    ordered.sort_by_key(|(_, _, diver)| diver.seq);

    for (diver_pos, diver_hitbox, mut diver) in ordered {
        let player_box = hitbox.aabb(&pos);
        if !diver_hitbox.aabb(diver_pos).overlaps(&player_box) {
            continue;
        }
        diver.live.kill();
        spawn_explosion(&mut commands, &mut rng, diver_pos.x, diver_pos.y, Color::for_row(diver.row));
        let outcome = resolve_player_hit(
            &mut commands,
            &mut rng,
            &config,
            &mut scoreboard,
            &mut status,
            &mut pos,
            &mut vel,
            &mut player,
        );
        if outcome == HitOutcome::GameOver {
            return;
        }
    }
}

/// Game over as soon as any live formation member's bottom edge reaches the
/// player's row, whatever else happened this frame.
pub fn formation_reach_system(
    mut status: ResMut<GameStatus>,
    scoreboard: Res<Scoreboard>,
    players: Query<&Position, With<Player>>,
    formation: Query<(&Position, &Hitbox, &FormationEnemy)>,
) {
    let Ok(player_pos) = players.get_single() else {
        return;
    };
    let reached = formation
        .iter()
        .any(|(pos, hitbox, enemy)| enemy.is_live() && pos.y + hitbox.height >= player_pos.y);
    if reached && *status != GameStatus::GameOver {
        *status = GameStatus::GameOver;
        info!(score = scoreboard.score, level = scoreboard.level, "Game over: formation reached the player");
    }
}
