//! Public API for the simulation.
//!
//! This module provides the main interface for a host (browser canvas,
//! engine binding, headless test) to drive the game.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 60 Hz). When
//! `step(dt)` is called, the simulation accumulates time and runs fixed
//! updates as needed, at most `max_steps_per_call` per call. Every cooldown
//! is measured against the simulation clock, so pausing or a slow host never
//! makes spawns fire early.
//!
//! ## Lifecycle
//!
//! Idle -> Running <-> Paused; Running -> LevelComplete -> Running (next
//! level); Running -> GameOver -> Running (restart). Only Running advances
//! the simulation.

use crate::components::*;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::input::{InputState, Key};
use crate::resources::*;
use crate::systems::*;
use crate::ui::{UiEvent, UiSink};
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use tracing::{debug, info};

/// What the UI was last told, to report only changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reported {
    board: Scoreboard,
    status: GameStatus,
}

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Driving the game lifecycle (start, pause, restart, next level)
/// - Stepping the simulation forward
/// - Feeding input
/// - Extracting state snapshots and UI events
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
    reported: Option<Reported>,
    ui_sink: Option<Box<dyn UiSink>>,
    ui_events: Vec<UiEvent>,
}

impl SimWorld {
    /// Create a new simulation world with the default configuration.
    pub fn new() -> Self {
        Self::build(GameConfig::default())
    }

    /// Create a new simulation world with a custom configuration.
    pub fn with_config(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GameConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(SimClock::default());
        world.insert_resource(GameStatus::Idle);
        world.insert_resource(Scoreboard::new(config.player.starting_lives));
        world.insert_resource(FormationMotion {
            direction: 1.0,
            speed: config.enemy.speed_for_level(1),
        });
        world.insert_resource(SpawnTimers::default());
        world.insert_resource(FireControl::default());
        world.insert_resource(SimRng::seeded(config.seed));
        world.insert_resource(InputState::default());
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        // Several systems draw from SimRng; one thread keeps the draw order fixed.
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);

        // Group 1: Player input, power-up expiry and firing
        schedule.add_systems(
            (
                player_motion_system,
                power_up_expiry_system,
                fire_cooldown_system,
                player_fire_system,
            )
                .chain(),
        );

        // Group 2: Motion of every entity kind
        schedule.add_systems(
            (
                formation_motion_system,
                diving_motion_system,
                bonus_flyer_motion_system,
                projectile_motion_system,
                pickup_motion_system,
                particle_system,
            )
                .chain()
                .after(player_fire_system),
        );

        // Group 3: Time-gated spawns
        schedule.add_systems(
            (enemy_fire_system, bonus_flyer_spawn_system, dive_attack_system)
                .chain()
                .after(particle_system),
        );

        // Group 4: Collision and scoring, fixed precedence
        schedule.add_systems(
            (
                player_projectile_hits_system,
                power_up_pickup_system,
                player_hit_system,
                formation_reach_system,
            )
                .chain()
                .after(dive_attack_system),
        );

        // Group 5: Level-complete check and cleanup
        schedule.add_systems(
            (level_complete_system, despawn_dead_system)
                .chain()
                .after(formation_reach_system),
        );

        let mut sim = Self {
            world,
            schedule,
            time_accumulator: 0.0,
            reported: None,
            ui_sink: None,
            ui_events: Vec::new(),
        };
        sim.report_ui();
        sim
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start a game. Ignored while a game is in progress; after game over it
    /// behaves like `restart`.
    pub fn start(&mut self) {
        match self.status() {
            GameStatus::Idle => {
                self.set_status(GameStatus::Running);
                self.setup_level();
                self.report_ui();
            }
            GameStatus::GameOver => self.restart(),
            GameStatus::Running | GameStatus::Paused | GameStatus::LevelComplete => {}
        }
    }

    /// Flip between running and paused. Ignored in any other state.
    pub fn toggle_pause(&mut self) {
        let next = match self.status() {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            _ => return,
        };
        debug!(?next, "Pause toggled");
        self.time_accumulator = 0.0;
        self.set_status(next);
        self.report_ui();
    }

    /// Reset score, lives and level, then start level 1.
    pub fn restart(&mut self) {
        let lives = self.config().player.starting_lives;
        self.world.insert_resource(Scoreboard::new(lives));
        self.set_status(GameStatus::Running);
        self.setup_level();
        self.report_ui();
    }

    /// Advance to the next level. Only valid after a level was completed.
    pub fn next_level(&mut self) {
        if self.status() != GameStatus::LevelComplete {
            return;
        }
        self.world.resource_mut::<Scoreboard>().level += 1;
        self.set_status(GameStatus::Running);
        self.setup_level();
        self.report_ui();
    }

    /// Build a fresh entity set for the current level.
    fn setup_level(&mut self) {
        self.world.clear_entities();

        let config = self.world.resource::<GameConfig>().clone();
        let level = self.world.resource::<Scoreboard>().level;
        let now = self.world.resource::<SimClock>().now_ms;

        self.world.spawn(PlayerBundle::new(&config));
        for row in 0..config.enemy.rows {
            for col in 0..config.enemy.cols {
                self.world
                    .spawn(FormationEnemyBundle::new(GridSlot { row, col }, &config));
            }
        }

        self.world.insert_resource(FormationMotion {
            direction: 1.0,
            speed: config.enemy.speed_for_level(level),
        });
        self.world.resource_mut::<SpawnTimers>().rearm(now);
        self.world.insert_resource(FireControl::default());
        self.time_accumulator = 0.0;

        info!(
            level,
            enemies = config.enemy.rows * config.enemy.cols,
            "Level started"
        );
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Step the simulation forward by `dt` seconds of host time.
    ///
    /// Pause and restart key presses are handled first. Fixed updates only
    /// run while the game is running.
    pub fn step(&mut self, dt: f32) {
        self.handle_lifecycle_keys();
        if !self.status().is_running() {
            self.time_accumulator = 0.0;
            return;
        }

        let (fixed_dt, max_steps) = {
            let config = self.config();
            (config.fixed_timestep, config.max_steps_per_call)
        };
        self.time_accumulator += dt.max(0.0);

        let mut steps = 0;
        while self.time_accumulator >= fixed_dt {
            if steps == max_steps {
                self.time_accumulator = 0.0;
                break;
            }
            self.fixed_update();
            self.time_accumulator -= fixed_dt;
            steps += 1;
            if !self.status().is_running() {
                self.time_accumulator = 0.0;
                break;
            }
        }
    }

    /// Run exactly one fixed update, if the game is running.
    pub fn step_frame(&mut self) {
        self.handle_lifecycle_keys();
        if self.status().is_running() {
            self.fixed_update();
        }
    }

    /// Run one fixed timestep update.
    fn fixed_update(&mut self) {
        let dt_ms = self.config().timestep_ms();
        self.world.resource_mut::<SimClock>().advance(dt_ms);
        self.schedule.run(&mut self.world);
        self.report_ui();
    }

    fn handle_lifecycle_keys(&mut self) {
        let (pause, restart) = {
            let mut input = self.world.resource_mut::<InputState>();
            (input.take_press(Key::Pause), input.take_press(Key::Restart))
        };
        if pause {
            self.toggle_pause();
        }
        if restart && self.status() == GameStatus::GameOver {
            self.restart();
        }
        if !self.status().is_running() {
            // A fire press outside play must not carry over into it.
            self.world.resource_mut::<InputState>().take_press(Key::Fire);
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn press_key(&mut self, key: Key) {
        self.world.resource_mut::<InputState>().press(key);
    }

    pub fn release_key(&mut self, key: Key) {
        self.world.resource_mut::<InputState>().release(key);
    }

    /// Direct access to the input mapping.
    pub fn input_mut(&mut self) -> Mut<'_, InputState> {
        self.world.resource_mut::<InputState>()
    }

    // ========================================================================
    // UI
    // ========================================================================

    /// Route UI events to `sink` instead of the internal queue. Events
    /// queued so far are handed to the sink first, in order.
    pub fn set_ui_sink(&mut self, mut sink: Box<dyn UiSink>) {
        for event in self.ui_events.drain(..) {
            sink.handle(event);
        }
        self.ui_sink = Some(sink);
    }

    /// Drain queued UI events (only queued while no sink is installed).
    pub fn take_ui_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.ui_events)
    }

    fn emit(&mut self, event: UiEvent) {
        match self.ui_sink.as_mut() {
            Some(sink) => sink.handle(event),
            None => self.ui_events.push(event),
        }
    }

    /// Compare scoreboard and status against the last report and emit the
    /// differences.
    fn report_ui(&mut self) {
        let now = Reported {
            board: *self.world.resource::<Scoreboard>(),
            status: self.status(),
        };
        let previous = self.reported.replace(now);
        if previous == Some(now) {
            return;
        }

        if previous.map_or(true, |p| p.board != now.board) {
            self.emit(UiEvent::Hud {
                score: now.board.score,
                lives: now.board.lives,
                level: now.board.level,
            });
        }

        if previous.map_or(true, |p| p.status != now.status) {
            match now.status {
                GameStatus::GameOver => self.emit(UiEvent::GameOver {
                    final_score: now.board.score,
                }),
                GameStatus::LevelComplete => self.emit(UiEvent::LevelComplete {
                    score: now.board.score,
                }),
                _ => {}
            }
            let controls = controls_for(now.status);
            if previous.map(|p| controls_for(p.status)) != Some(controls) {
                self.emit(controls);
            }
        }
    }

    // ========================================================================
    // State access
    // ========================================================================

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world)
    }

    /// Get the current snapshot as JSON.
    pub fn snapshot_json(&mut self) -> String {
        snapshot_to_json_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn status(&self) -> GameStatus {
        *self.world.resource::<GameStatus>()
    }

    fn set_status(&mut self, status: GameStatus) {
        *self.world.resource_mut::<GameStatus>() = status;
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<Scoreboard>().score
    }

    pub fn lives(&self) -> u32 {
        self.world.resource::<Scoreboard>().lives
    }

    pub fn level(&self) -> u32 {
        self.world.resource::<Scoreboard>().level
    }

    pub fn config(&self) -> &GameConfig {
        self.world.resource::<GameConfig>()
    }

    /// Fixed updates run so far.
    pub fn current_frame(&self) -> u64 {
        self.world.resource::<SimClock>().frame
    }

    /// Simulation clock in milliseconds.
    pub fn current_time_ms(&self) -> f64 {
        self.world.resource::<SimClock>().now_ms
    }

    /// Get direct access to the ECS world (for advanced use).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced use).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn controls_for(status: GameStatus) -> UiEvent {
    UiEvent::Controls {
        start_enabled: matches!(status, GameStatus::Idle | GameStatus::GameOver),
        pause_enabled: matches!(status, GameStatus::Running | GameStatus::Paused),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.enemy.shot_interval_ms = 1.0e9;
        config.diving.spawn_interval_ms = 1.0e9;
        config.bonus_flyer.spawn_interval_ms = 1.0e9;
        config
    }

    fn kill_formation(sim: &mut SimWorld) {
        let world = sim.world_mut();
        let mut query = world.query::<&mut FormationEnemy>();
        for mut enemy in query.iter_mut(world) {
            enemy.live.kill();
        }
    }

    #[test]
    fn test_new_world_is_idle() {
        let mut sim = SimWorld::new();
        assert_eq!(sim.status(), GameStatus::Idle);
        assert_eq!((sim.score(), sim.lives(), sim.level()), (0, 3, 1));
        assert_eq!(sim.snapshot().entity_count(), 0);

        sim.step(0.5);
        assert_eq!(sim.current_frame(), 0, "idle world must not advance");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.enemy.rows = 0;
        assert!(SimWorld::with_config(config).is_err());
    }

    #[test]
    fn test_start_builds_level() {
        let mut sim = SimWorld::new();
        sim.start();
        assert_eq!(sim.status(), GameStatus::Running);

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.enemies.len(), 40);
        let player = snapshot.player.unwrap();
        assert_eq!((player.x, player.y), (400.0, 540.0));
    }

    #[test]
    fn test_step_runs_fixed_updates() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.start();
        sim.step(1.0 / 60.0);
        assert_eq!(sim.current_frame(), 1);
        assert!((sim.current_time_ms() - 1000.0 / 60.0).abs() < 1e-3);

        // Long host stall: capped at max_steps_per_call, excess dropped.
        sim.step(1.0);
        assert_eq!(sim.current_frame(), 6);
        sim.step(0.0);
        assert_eq!(sim.current_frame(), 6);
    }

    #[test]
    fn test_pause_halts_clock() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.start();
        sim.step_frame();
        sim.toggle_pause();
        assert_eq!(sim.status(), GameStatus::Paused);
        let frame = sim.current_frame();
        for _ in 0..10 {
            sim.step(0.1);
        }
        assert_eq!(sim.current_frame(), frame);

        sim.press_key(Key::Pause);
        sim.step_frame();
        assert_eq!(sim.status(), GameStatus::Running);
        assert_eq!(sim.current_frame(), frame + 1);
    }

    #[test]
    fn test_pause_ignored_when_idle() {
        let mut sim = SimWorld::new();
        sim.toggle_pause();
        assert_eq!(sim.status(), GameStatus::Idle);
    }

    #[test]
    fn test_tap_between_frames_fires_and_pauses() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.start();
        sim.press_key(Key::Fire);
        sim.release_key(Key::Fire);
        sim.step_frame();
        let player_shots = sim
            .snapshot()
            .projectiles
            .iter()
            .filter(|p| p.owner == Owner::Player)
            .count();
        assert_eq!(player_shots, 1);

        sim.press_key(Key::Pause);
        sim.release_key(Key::Pause);
        sim.step_frame();
        assert_eq!(sim.status(), GameStatus::Paused);
    }

    #[test]
    fn test_fire_key_spawns_one_shot_per_press() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.start();
        sim.press_key(Key::Fire);
        sim.step_frame();
        sim.step_frame();
        let player_shots = sim
            .snapshot()
            .projectiles
            .iter()
            .filter(|p| p.owner == Owner::Player)
            .count();
        assert_eq!(player_shots, 1);
    }

    #[test]
    fn test_level_complete_and_next_level() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.start();
        kill_formation(&mut sim);
        sim.step_frame();
        assert_eq!(sim.status(), GameStatus::LevelComplete);

        let frame = sim.current_frame();
        sim.step(0.5);
        assert_eq!(sim.current_frame(), frame);

        sim.next_level();
        assert_eq!(sim.status(), GameStatus::Running);
        assert_eq!(sim.level(), 2);
        assert_eq!(sim.snapshot().enemies.len(), 40);
        let speed = sim.world().resource::<FormationMotion>().speed;
        assert!((speed - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_next_level_requires_level_complete() {
        let mut sim = SimWorld::new();
        sim.start();
        sim.next_level();
        assert_eq!(sim.level(), 1);
    }

    #[test]
    fn test_restart_key_only_in_game_over() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.start();
        sim.world_mut().resource_mut::<Scoreboard>().award(120);

        sim.press_key(Key::Restart);
        sim.step_frame();
        assert_eq!(sim.score(), 120, "R is ignored while running");
        sim.release_key(Key::Restart);

        sim.world_mut().insert_resource(GameStatus::GameOver);
        sim.press_key(Key::Restart);
        sim.step_frame();
        assert_eq!(sim.status(), GameStatus::Running);
        assert_eq!((sim.score(), sim.lives(), sim.level()), (0, 3, 1));
    }

    #[test]
    fn test_ui_events_report_changes() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        let initial = sim.take_ui_events();
        assert_eq!(
            initial,
            vec![
                UiEvent::Hud { score: 0, lives: 3, level: 1 },
                UiEvent::Controls { start_enabled: true, pause_enabled: false },
            ]
        );

        sim.start();
        assert_eq!(
            sim.take_ui_events(),
            vec![UiEvent::Controls { start_enabled: false, pause_enabled: true }]
        );

        sim.step_frame();
        assert!(sim.take_ui_events().is_empty(), "no change, no event");

        kill_formation(&mut sim);
        sim.world_mut().resource_mut::<Scoreboard>().award(400);
        sim.step_frame();
        assert_eq!(
            sim.take_ui_events(),
            vec![
                UiEvent::Hud { score: 400, lives: 3, level: 1 },
                UiEvent::LevelComplete { score: 400 },
                UiEvent::Controls { start_enabled: false, pause_enabled: false },
            ]
        );
    }

    #[test]
    fn test_ui_sink_receives_game_over() {
        struct Shared(Rc<RefCell<Vec<UiEvent>>>);
        impl UiSink for Shared {
            fn handle(&mut self, event: UiEvent) {
                self.0.borrow_mut().push(event);
            }
        }

        let events = Rc::new(RefCell::new(Vec::new()));
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.set_ui_sink(Box::new(Shared(events.clone())));
        assert_eq!(
            events.borrow()[..],
            [
                UiEvent::Hud { score: 0, lives: 3, level: 1 },
                UiEvent::Controls { start_enabled: true, pause_enabled: false },
            ],
            "initial state reaches a late sink"
        );
        sim.start();

        // Drop a formation member onto the player row.
        {
            let world = sim.world_mut();
            let mut query = world.query::<(&mut Position, &FormationEnemy)>();
            if let Some((mut pos, _)) = query.iter_mut(world).next() {
                pos.y = 600.0;
            }
        }
        sim.step_frame();

        assert_eq!(sim.status(), GameStatus::GameOver);
        assert!(events
            .borrow()
            .contains(&UiEvent::GameOver { final_score: 0 }));
        assert!(sim.take_ui_events().is_empty());
    }

    #[test]
    fn test_fresh_level_collision_pass_only_moves_formation() {
        let mut sim = SimWorld::with_config(quiet_config()).unwrap();
        sim.start();
        let before = sim.snapshot();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                formation_motion_system,
                player_projectile_hits_system,
                power_up_pickup_system,
                player_hit_system,
                formation_reach_system,
            )
                .chain(),
        );
        schedule.run(sim.world_mut());

        let after = sim.snapshot();
        assert_eq!(after.status, GameStatus::Running);
        assert_eq!((after.score, after.lives), (before.score, before.lives));
        assert_eq!(after.enemies.len(), before.enemies.len());
        assert_eq!(after.player, before.player);
        assert!(after.projectiles.is_empty() && after.particles.is_empty());
        for (a, b) in after.enemies.iter().zip(&before.enemies) {
            assert_eq!(a.x, b.x + 1.0);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut sim = SimWorld::new();
            sim.start();
            sim.press_key(Key::Right);
            for i in 0..600 {
                if i % 20 == 0 {
                    sim.press_key(Key::Fire);
                } else {
                    sim.release_key(Key::Fire);
                }
                sim.step_frame();
            }
            sim.snapshot_json()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_snapshot_json() {
        let mut sim = SimWorld::new();
        sim.start();
        let json = sim.snapshot_json();
        assert!(json.contains("\"enemies\""));
        assert!(json.contains("\"status\":\"Running\""));
    }
}
