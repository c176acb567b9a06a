//! Snapshot types.
//!
//! The `Snapshot` struct is a serializable, render-ready view of one frame:
//! every live entity plus the scoreboard and lifecycle status. Hosts either
//! draw it with `render::draw_frame`, ship it as JSON, or flatten it with
//! the `bridge` module.

use crate::components::*;
use crate::config::GameConfig;
use crate::resources::{GameStatus, Scoreboard, SimClock};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub shield: bool,
    pub rapid_fire: bool,
    pub multi_shot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub row: u32,
    pub col: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiverSnapshot {
    pub seq: u64,
    pub row: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub phase: DivePhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub owner: Owner,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupSnapshot {
    pub kind: PowerUpKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub pulse_phase: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusFlyerSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub direction: f32,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub kind: ParticleKind,
    pub x: f32,
    pub y: f32,
    /// Fade factor, 1.0 when fresh.
    pub alpha: f32,
}

/// Complete per-frame state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Fixed updates run so far.
    pub frame: u64,
    /// Simulation clock in milliseconds.
    pub time_ms: f64,
    pub status: GameStatus,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub player: Option<PlayerSnapshot>,
    /// Live formation members in grid order.
    pub enemies: Vec<EnemySnapshot>,
    /// Live divers in launch order.
    pub divers: Vec<DiverSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub pickups: Vec<PickupSnapshot>,
    pub bonus_flyer: Option<BonusFlyerSnapshot>,
    pub particles: Vec<ParticleSnapshot>,
}

impl Snapshot {
    /// Capture the current state of the ECS world.
    pub fn from_world(world: &mut World) -> Self {
        let clock = world.get_resource::<SimClock>().copied().unwrap_or_default();
        let status = world.get_resource::<GameStatus>().copied().unwrap_or_default();
        let scoreboard = world
            .get_resource::<Scoreboard>()
            .copied()
            .unwrap_or(Scoreboard::new(0));
        let (canvas_width, canvas_height) = world
            .get_resource::<GameConfig>()
            .map(|c| (c.canvas.width, c.canvas.height))
            .unwrap_or_default();

        let player = world
            .query::<(&Position, &Velocity, &Hitbox, &Player)>()
            .iter(world)
            .next()
            .map(|(pos, vel, hitbox, player)| PlayerSnapshot {
                x: pos.x,
                y: pos.y,
                width: hitbox.width,
                height: hitbox.height,
                vx: vel.vx,
                shield: player.power_ups.has(PowerUpKind::Shield),
                rapid_fire: player.power_ups.has(PowerUpKind::RapidFire),
                multi_shot: player.power_ups.has(PowerUpKind::MultiShot),
            });

        let mut enemies: Vec<EnemySnapshot> = world
            .query::<(&Position, &Hitbox, &FormationEnemy)>()
            .iter(world)
            .filter(|(_, _, enemy)| enemy.is_live())
            .map(|(pos, hitbox, enemy)| EnemySnapshot {
                row: enemy.slot.row,
                col: enemy.slot.col,
                x: pos.x,
                y: pos.y,
                width: hitbox.width,
                height: hitbox.height,
            })
            .collect();
        enemies.sort_by_key(|e| (e.row, e.col));

        let mut divers: Vec<DiverSnapshot> = world
            .query::<(&Position, &Hitbox, &DivingEnemy)>()
            .iter(world)
            .filter(|(_, _, diver)| diver.is_live())
            .map(|(pos, hitbox, diver)| DiverSnapshot {
                seq: diver.seq,
                row: diver.row,
                x: pos.x,
                y: pos.y,
                width: hitbox.width,
                height: hitbox.height,
                phase: diver.path.phase(),
            })
            .collect();
        divers.sort_by_key(|d| d.seq);

        let mut projectiles: Vec<(Entity, ProjectileSnapshot)> = world
            .query::<(Entity, &Position, &Hitbox, &Projectile)>()
            .iter(world)
            .filter(|(_, _, _, p)| p.is_live())
            .map(|(entity, pos, hitbox, p)| {
                (
                    entity,
                    ProjectileSnapshot {
                        owner: p.owner,
                        x: pos.x,
                        y: pos.y,
                        width: hitbox.width,
                        height: hitbox.height,
                    },
                )
            })
            .collect();
        projectiles.sort_by_key(|(entity, _)| *entity);

        let mut pickups: Vec<(Entity, PickupSnapshot)> = world
            .query::<(Entity, &Position, &Hitbox, &PowerUpPickup)>()
            .iter(world)
            .filter(|(_, _, _, p)| p.is_live())
            .map(|(entity, pos, hitbox, p)| {
                (
                    entity,
                    PickupSnapshot {
                        kind: p.kind,
                        x: pos.x,
                        y: pos.y,
                        width: hitbox.width,
                        height: hitbox.height,
                        rotation: p.rotation,
                        pulse_phase: p.pulse_phase,
                    },
                )
            })
            .collect();
        pickups.sort_by_key(|(entity, _)| *entity);

        let bonus_flyer = world
            .query::<(&Position, &Hitbox, &BonusFlyer)>()
            .iter(world)
            .find(|(_, _, flyer)| flyer.is_live())
            .map(|(pos, hitbox, flyer)| BonusFlyerSnapshot {
                x: pos.x,
                y: pos.y,
                width: hitbox.width,
                height: hitbox.height,
                direction: flyer.direction,
                points: flyer.points,
            });

        let mut particles: Vec<(Entity, ParticleSnapshot)> = world
            .query::<(Entity, &Position, &Particle)>()
            .iter(world)
            .filter(|(_, _, p)| !p.is_expired())
            .map(|(entity, pos, p)| {
                (
                    entity,
                    ParticleSnapshot {
                        kind: p.kind,
                        x: pos.x,
                        y: pos.y,
                        alpha: p.alpha(),
                    },
                )
            })
            .collect();
        particles.sort_by_key(|(entity, _)| *entity);

        Self {
            frame: clock.frame,
            time_ms: clock.now_ms,
            status,
            score: scoreboard.score,
            lives: scoreboard.lives,
            level: scoreboard.level,
            canvas_width,
            canvas_height,
            player,
            enemies,
            divers,
            projectiles: projectiles.into_iter().map(|(_, p)| p).collect(),
            pickups: pickups.into_iter().map(|(_, p)| p).collect(),
            bonus_flyer,
            particles: particles.into_iter().map(|(_, p)| p).collect(),
        }
    }

    /// Number of live gameplay entities (particles excluded).
    pub fn entity_count(&self) -> usize {
        usize::from(self.player.is_some())
            + self.enemies.len()
            + self.divers.len()
            + self.projectiles.len()
            + self.pickups.len()
            + usize::from(self.bonus_flyer.is_some())
    }
}
