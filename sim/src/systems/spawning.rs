//! Spawner - time-gated creation of enemy fire, dive attacks, the bonus
//! flyer and power-up drops.
//!
//! Cooldowns are compared against `SimClock`, so a paused game never builds
//! up pending spawns. A spawn attempted before its cooldown has elapsed is a
//! silent no-op.
//!
//! ## Parallel Feature
//!
//! With `--features parallel` the front-line scan that finds eligible
//! shooters runs on rayon. It only reads positions, and the collected
//! result keeps grid order so the seeded pick is identical either way.

use crate::components::*;
use crate::config::GameConfig;
use crate::resources::{SimClock, SimRng, SpawnTimers};
use bevy_ecs::prelude::*;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Formation members that may shoot: no other live member sits within
/// `half_width` horizontally and lower on screen.
///
/// `members` holds live members only; the result preserves their order.
pub fn front_line(members: &[(GridSlot, Position)], half_width: f32) -> Vec<(GridSlot, Position)> {
    let blocked = |pos: &Position| {
        members
            .iter()
            .any(|(_, other)| (other.x - pos.x).abs() < half_width && other.y > pos.y)
    };

    #[cfg(feature = "parallel")]
    {
        members.par_iter().filter(|(_, pos)| !blocked(pos)).copied().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        members.iter().filter(|(_, pos)| !blocked(pos)).copied().collect()
    }
}

/// One enemy shot per interval from a random front-line member.
pub fn enemy_fire_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut timers: ResMut<SpawnTimers>,
    mut rng: ResMut<SimRng>,
    query: Query<(&Position, &FormationEnemy)>,
) {
    if !timers.enemy_shot_ready(clock.now_ms, config.enemy.shot_interval_ms) {
        return;
    }

    let mut members: Vec<(GridSlot, Position)> = query
        .iter()
        .filter(|(_, enemy)| enemy.is_live())
        .map(|(pos, enemy)| (enemy.slot, *pos))
        .collect();
    if members.is_empty() {
        return;
    }
    members.sort_by_key(|(slot, _)| *slot);

    let shooters = front_line(&members, config.enemy.width / 2.0);
    if shooters.is_empty() {
        return;
    }
    let (_, pos) = shooters[rng.index(shooters.len())];

    commands.spawn(ProjectileBundle::enemy(pos.x, pos.y + config.enemy.height, &config));
    timers.last_enemy_shot = Some(clock.now_ms);
}

/// Converts one formation member into a diver once per dive interval.
///
/// The source member is marked diving and killed in the same step that
/// spawns the diver, so it is never live in both populations.
pub fn dive_attack_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut timers: ResMut<SpawnTimers>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(Entity, &Position, &Hitbox, &mut FormationEnemy)>,
) {
    if !timers.dive_ready(clock.now_ms, config.diving.spawn_interval_ms) {
        return;
    }

    let mut eligible: Vec<(GridSlot, Entity)> = query
        .iter()
        .filter(|(_, _, _, enemy)| enemy.can_dive())
        .map(|(entity, _, _, enemy)| (enemy.slot, entity))
        .collect();
    if eligible.is_empty() {
        return;
    }
    eligible.sort_by_key(|(slot, _)| *slot);

    let back_rows: Vec<Entity> = eligible
        .iter()
        .filter(|(slot, _)| slot.row >= config.diving.back_row_min)
        .map(|(_, entity)| *entity)
        .collect();

    let prefer_back = rng.chance(config.diving.back_row_preference);
    let chosen = if prefer_back && !back_rows.is_empty() {
        back_rows[rng.index(back_rows.len())]
    } else {
        eligible[rng.index(eligible.len())].1
    };

    let Ok((_, pos, hitbox, mut enemy)) = query.get_mut(chosen) else {
        return;
    };
    enemy.diving = true;
    enemy.live.kill();

    let direction = rng.sign();
    let seq = timers.dive_seq;
    commands.spawn(DivingEnemyBundle::launch(
        seq,
        enemy.slot.row,
        *pos,
        *hitbox,
        direction,
        &config.diving,
    ));
    debug!(seq, row = enemy.slot.row, col = enemy.slot.col, direction, "Dive attack launched");

    timers.dive_seq += 1;
    timers.last_dive = clock.now_ms;
}

/// Sends a bonus flyer across once per interval when none is active.
pub fn bonus_flyer_spawn_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut timers: ResMut<SpawnTimers>,
    mut rng: ResMut<SimRng>,
    query: Query<&BonusFlyer>,
) {
    if query.iter().any(|flyer| flyer.is_live()) {
        return;
    }
    if !timers.bonus_flyer_ready(clock.now_ms, config.bonus_flyer.spawn_interval_ms) {
        return;
    }

    let points_table = &config.bonus_flyer.point_values;
    if points_table.is_empty() {
        return;
    }
    let direction = rng.sign();
    let points = points_table[rng.index(points_table.len())];

    commands.spawn(BonusFlyerBundle::enter(direction, points, &config));
    debug!(direction, points, "Bonus flyer spawned");
    timers.last_bonus_flyer = clock.now_ms;
}

/// Rolls the drop chance for a kill at `(x, y)` and spawns a pickup of a
/// uniformly chosen kind on success.
pub fn roll_power_up_drop(
    commands: &mut Commands,
    rng: &mut SimRng,
    config: &GameConfig,
    x: f32,
    y: f32,
) {
    if !rng.chance(config.power_up.spawn_chance) {
        return;
    }
    let kind = PowerUpKind::ALL[rng.index(PowerUpKind::ALL.len())];
    commands.spawn(PowerUpPickupBundle::new(kind, x, y, config));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawner_world(config: GameConfig) -> World {
        let mut world = World::new();
        for row in 0..config.enemy.rows {
            for col in 0..config.enemy.cols {
                world.spawn(FormationEnemyBundle::new(GridSlot { row, col }, &config));
            }
        }
        world.insert_resource(SimRng::seeded(config.seed));
        world.insert_resource(config);
        world.insert_resource(SimClock::default());
        world.insert_resource(SpawnTimers::default());
        world
    }

    fn run_once<M>(world: &mut World, system: impl IntoSystemConfigs<M>) {
        let mut schedule = Schedule::default();
        schedule.add_systems(system);
        schedule.run(world);
    }

    #[test]
    fn test_front_line_is_lowest_of_each_column() {
        let members = vec![
            (GridSlot { row: 0, col: 0 }, Position::new(50.0, 50.0)),
            (GridSlot { row: 0, col: 1 }, Position::new(100.0, 50.0)),
            (GridSlot { row: 1, col: 0 }, Position::new(50.0, 90.0)),
        ];
        let shooters = front_line(&members, 20.0);
        let slots: Vec<GridSlot> = shooters.iter().map(|(slot, _)| *slot).collect();
        assert_eq!(slots, vec![GridSlot { row: 0, col: 1 }, GridSlot { row: 1, col: 0 }]);
    }

    #[test]
    fn test_enemy_fire_respects_interval() {
        let mut world = spawner_world(GameConfig::default());
        run_once(&mut world, enemy_fire_system);

        let shots: Vec<(Position, Projectile)> = world
            .query::<(&Position, &Projectile)>()
            .iter(&world)
            .map(|(p, s)| (*p, *s))
            .collect();
        assert_eq!(shots.len(), 1, "first shot is never gated");
        let (pos, shot) = shots[0];
        assert_eq!(shot.owner, Owner::Enemy);
        // Fired from the bottom row: top y 50 + 3 * 40, plus the enemy height.
        assert_eq!(pos.y, 170.0 + 30.0);

        world.resource_mut::<SimClock>().now_ms = 999.0;
        run_once(&mut world, enemy_fire_system);
        assert_eq!(world.query::<&Projectile>().iter(&world).count(), 1);

        world.resource_mut::<SimClock>().now_ms = 1000.0;
        run_once(&mut world, enemy_fire_system);
        assert_eq!(world.query::<&Projectile>().iter(&world).count(), 2);
    }

    #[test]
    fn test_dive_converts_exactly_one_member() {
        let mut world = spawner_world(GameConfig::default());
        world.resource_mut::<SimClock>().now_ms = 5000.0;
        run_once(&mut world, dive_attack_system);

        let divers: Vec<DivingEnemy> = world.query::<&DivingEnemy>().iter(&world).copied().collect();
        assert_eq!(divers.len(), 1);
        assert_eq!(divers[0].seq, 0);

        let converted: Vec<FormationEnemy> = world
            .query::<&FormationEnemy>()
            .iter(&world)
            .filter(|e| e.diving)
            .copied()
            .collect();
        assert_eq!(converted.len(), 1);
        assert!(!converted[0].is_live(), "source leaves the formation");
        assert_eq!(converted[0].slot.row, divers[0].row);

        let timers = *world.resource::<SpawnTimers>();
        assert_eq!(timers.last_dive, 5000.0);
        assert_eq!(timers.dive_seq, 1);

        // Still cooling down.
        world.resource_mut::<SimClock>().now_ms = 9999.0;
        run_once(&mut world, dive_attack_system);
        assert_eq!(world.query::<&DivingEnemy>().iter(&world).count(), 1);
    }

    #[test]
    fn test_dive_prefers_back_rows_when_certain() {
        let mut config = GameConfig::default();
        config.diving.back_row_preference = 1.0;
        let mut world = spawner_world(config);
        world.resource_mut::<SimClock>().now_ms = 5000.0;

        run_once(&mut world, dive_attack_system);
        let diver = world.query::<&DivingEnemy>().single(&world);
        assert!(diver.row >= 2);
    }

    #[test]
    fn test_dive_needs_an_eligible_member() {
        let mut world = spawner_world(GameConfig::default());
        for mut enemy in world.query::<&mut FormationEnemy>().iter_mut(&mut world) {
            enemy.live.kill();
        }
        world.resource_mut::<SimClock>().now_ms = 5000.0;
        run_once(&mut world, dive_attack_system);

        assert_eq!(world.query::<&DivingEnemy>().iter(&world).count(), 0);
        assert_eq!(world.resource::<SpawnTimers>().last_dive, 0.0);
    }

    #[test]
    fn test_only_one_bonus_flyer_at_a_time() {
        let mut world = spawner_world(GameConfig::default());
        world.resource_mut::<SimClock>().now_ms = 15_000.0;
        run_once(&mut world, bonus_flyer_spawn_system);

        let flyer = *world.query::<&BonusFlyer>().single(&world);
        assert!([50, 100, 150, 200].contains(&flyer.points));

        world.resource_mut::<SimClock>().now_ms = 60_000.0;
        run_once(&mut world, bonus_flyer_spawn_system);
        assert_eq!(world.query::<&BonusFlyer>().iter(&world).count(), 1);
    }

    #[test]
    fn test_power_up_drop_is_certain_at_full_chance() {
        let mut config = GameConfig::default();
        config.power_up.spawn_chance = 1.0;
        let mut world = World::new();
        world.insert_resource(SimRng::seeded(3));
        world.insert_resource(config);

        fn drop_at_fixed_spot(mut commands: Commands, mut rng: ResMut<SimRng>, config: Res<GameConfig>) {
            roll_power_up_drop(&mut commands, &mut rng, &config, 120.0, 80.0);
        }
        run_once(&mut world, drop_at_fixed_spot);

        let (pos, _) = world.query::<(&Position, &PowerUpPickup)>().single(&world);
        assert_eq!(*pos, Position::new(120.0, 80.0));
    }
}
