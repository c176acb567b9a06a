//! End-of-frame bookkeeping: the level-complete check and removal of dead
//! entities.

use crate::components::*;
use crate::resources::{GameStatus, Scoreboard};
use bevy_ecs::prelude::*;
use tracing::info;

/// Level complete once no formation member is left alive. A frame that
/// already ended in game over stays game over.
pub fn level_complete_system(
    mut status: ResMut<GameStatus>,
    scoreboard: Res<Scoreboard>,
    formation: Query<&FormationEnemy>,
) {
    if !status.is_running() {
        return;
    }
    if formation.iter().any(|enemy| enemy.is_live()) {
        return;
    }
    *status = GameStatus::LevelComplete;
    info!(level = scoreboard.level, score = scoreboard.score, "Level complete");
}

/// Despawns every entity whose liveness flag dropped this frame, plus
/// expired particles.
pub fn despawn_dead_system(
    mut commands: Commands,
    formation: Query<(Entity, &FormationEnemy)>,
    divers: Query<(Entity, &DivingEnemy)>,
    flyers: Query<(Entity, &BonusFlyer)>,
    projectiles: Query<(Entity, &Projectile)>,
    pickups: Query<(Entity, &PowerUpPickup)>,
    particles: Query<(Entity, &Particle)>,
) {
    let dead = formation
        .iter()
        .filter(|(_, e)| !e.is_live())
        .map(|(entity, _)| entity)
        .chain(divers.iter().filter(|(_, d)| !d.is_live()).map(|(entity, _)| entity))
        .chain(flyers.iter().filter(|(_, f)| !f.is_live()).map(|(entity, _)| entity))
        .chain(projectiles.iter().filter(|(_, p)| !p.is_live()).map(|(entity, _)| entity))
        .chain(pickups.iter().filter(|(_, p)| !p.is_live()).map(|(entity, _)| entity))
        .chain(particles.iter().filter(|(_, p)| p.is_expired()).map(|(entity, _)| entity));

    for entity in dead {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_level_complete_when_formation_cleared() {
        let config = GameConfig::default();
        let mut world = World::new();
        let enemy = world
            .spawn(FormationEnemyBundle::new(GridSlot { row: 0, col: 0 }, &config))
            .id();
        world.insert_resource(GameStatus::Running);
        world.insert_resource(Scoreboard::new(3));

        let mut schedule = Schedule::default();
        schedule.add_systems(level_complete_system);
        schedule.run(&mut world);
        assert_eq!(*world.resource::<GameStatus>(), GameStatus::Running);

        world.get_mut::<FormationEnemy>(enemy).unwrap().live.kill();
        schedule.run(&mut world);
        assert_eq!(*world.resource::<GameStatus>(), GameStatus::LevelComplete);
    }

    #[test]
    fn test_game_over_is_not_overridden() {
        let mut world = World::new();
        world.insert_resource(GameStatus::GameOver);
        world.insert_resource(Scoreboard::new(0));

        let mut schedule = Schedule::default();
        schedule.add_systems(level_complete_system);
        schedule.run(&mut world);
        assert_eq!(*world.resource::<GameStatus>(), GameStatus::GameOver);
    }

    #[test]
    fn test_dead_entities_are_despawned() {
        let config = GameConfig::default();
        let mut world = World::new();
        let live = world.spawn(ProjectileBundle::player(10.0, 10.0, &config)).id();
        let mut dead_bundle = ProjectileBundle::enemy(10.0, 10.0, &config);
        dead_bundle.projectile.live.kill();
        let dead = world.spawn(dead_bundle).id();
        let expired = world
            .spawn(ParticleBundle {
                particle: Particle {
                    kind: ParticleKind::ScorePopup { points: 50 },
                    life: 0,
                    max_life: 60,
                },
                position: Position::default(),
                velocity: Velocity::default(),
            })
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(despawn_dead_system);
        schedule.run(&mut world);

        assert!(world.get::<Projectile>(live).is_some());
        assert!(world.get::<Projectile>(dead).is_none());
        assert!(world.get::<Particle>(expired).is_none());
    }
}
