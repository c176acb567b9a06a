//! Invaders - Simulation Core
//!
//! A deterministic, fixed-timestep ECS simulation of an arcade invaders
//! game: a marching formation, dive attacks, a bonus flyer, power-ups and
//! the player's cannon. Uses `bevy_ecs` for the entity-component-system
//! architecture. Drawing and UI are delegated to host-provided traits.

pub mod api;
pub mod bridge;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod resources;
pub mod systems;
pub mod ui;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::GameConfig;
pub use error::ConfigError;
pub use input::{InputState, Key};
pub use render::{draw_frame, ImageProvider, RenderSurface, Sprite};
pub use resources::{GameStatus, Scoreboard};
pub use systems::*;
pub use ui::{UiEvent, UiSink};
pub use world::Snapshot;
