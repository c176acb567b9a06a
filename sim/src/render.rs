//! Rendering interface and frame drawing.
//!
//! The simulation never talks to a graphics API. Hosts implement
//! `RenderSurface` (2D primitives) and `ImageProvider` (sprite readiness),
//! and `draw_frame` paints a `Snapshot` onto them. Sprites are preferred
//! when ready; otherwise each kind falls back to a procedural shape.

use crate::components::{Color, Owner, ParticleKind, PowerUpKind};
use crate::resources::GameStatus;
use crate::world::{
    BonusFlyerSnapshot, DiverSnapshot, EnemySnapshot, PickupSnapshot, PlayerSnapshot, Snapshot,
};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

const CYAN: Color = Color::rgb(0x00, 0xff, 0xff);
const ORANGE: Color = Color::rgb(0xff, 0x88, 0x00);
const SHIELD_OUTLINE: Color = Color::rgb(0x00, 0x88, 0xff);
const MULTI_SHOT_OUTLINE: Color = Color::rgb(0x00, 0xaa, 0x00);
const RED: Color = Color::rgb(0xff, 0x00, 0x00);

const STAR_COUNT: u32 = 50;
/// Bonus flyer lights toggle every this many milliseconds.
const BLINK_PERIOD_MS: f64 = 200.0;

/// Image slots a host may supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Player,
    /// Enemy style for a formation row, `0..4`.
    Enemy(u32),
}

impl Sprite {
    pub fn for_row(row: u32) -> Self {
        Sprite::Enemy(row % 4)
    }
}

/// Supplies loaded-or-not sprites.
pub trait ImageProvider {
    /// Whether the image for `sprite` finished loading.
    fn is_ready(&self, sprite: Sprite) -> bool;
}

/// Provider with no images; everything draws procedurally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageProvider for NoImages {
    fn is_ready(&self, _sprite: Sprite) -> bool {
        false
    }
}

/// 2D drawing primitives in canvas pixels.
pub trait RenderSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);
    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Color);
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color);
    fn stroke_polygon(&mut self, points: &[(f32, f32)], color: Color, line_width: f32);
    fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color, line_width: f32);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32);
    /// Text horizontally centered on `x` with its baseline at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
    fn draw_image(&mut self, sprite: Sprite, x: f32, y: f32, width: f32, height: f32);
    /// Global alpha for subsequent draws, `0.0..=1.0`.
    fn set_alpha(&mut self, alpha: f32);
}

/// Paint one frame.
pub fn draw_frame<S, I>(surface: &mut S, images: &I, snapshot: &Snapshot)
where
    S: RenderSurface + ?Sized,
    I: ImageProvider + ?Sized,
{
    draw_background(surface, snapshot.canvas_width, snapshot.canvas_height);

    if let Some(player) = &snapshot.player {
        draw_player(surface, images, player);
    }
    for enemy in &snapshot.enemies {
        draw_enemy(surface, images, enemy);
    }
    for diver in &snapshot.divers {
        draw_diver(surface, images, diver);
    }
    if let Some(flyer) = &snapshot.bonus_flyer {
        draw_bonus_flyer(surface, flyer, snapshot.time_ms);
    }
    for p in &snapshot.projectiles {
        let color = match p.owner {
            Owner::Player => Color::PLAYER_SHOT,
            Owner::Enemy => Color::ENEMY_SHOT,
        };
        surface.fill_rect(p.x - p.width / 2.0, p.y, p.width, p.height, color);
    }
    for pickup in &snapshot.pickups {
        draw_pickup(surface, pickup);
    }
    for particle in &snapshot.particles {
        surface.set_alpha(particle.alpha);
        match particle.kind {
            ParticleKind::Spark { color, size } => {
                surface.fill_rect(particle.x, particle.y, size, size, color);
            }
            ParticleKind::ScorePopup { points } => {
                surface.fill_text(&format!("+{points}"), particle.x, particle.y, 20.0, Color::YELLOW);
            }
        }
    }
    surface.set_alpha(1.0);

    if snapshot.status == GameStatus::Paused {
        surface.set_alpha(0.8);
        surface.fill_text(
            "PAUSED",
            snapshot.canvas_width / 2.0,
            snapshot.canvas_height / 2.0,
            48.0,
            Color::PLAYER,
        );
        surface.set_alpha(1.0);
    }
}

fn draw_background<S: RenderSurface + ?Sized>(surface: &mut S, width: f32, height: f32) {
    surface.fill_rect(0.0, 0.0, width, height, Color::BLACK);
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    // Fixed star field.
    for i in 0..STAR_COUNT {
        let x = (i as f32 * 137.5) % width;
        let y = (i as f32 * 197.3) % height;
        let size = (i % 3 + 1) as f32;
        surface.fill_rect(x, y, size, size, Color::WHITE);
    }
}

fn draw_player<S, I>(surface: &mut S, images: &I, p: &PlayerSnapshot)
where
    S: RenderSurface + ?Sized,
    I: ImageProvider + ?Sized,
{
    if p.shield {
        surface.set_alpha(0.6);
        surface.stroke_circle(p.x, p.y + p.height / 2.0, p.width * 0.8, Color::SHIELD, 3.0);
        surface.set_alpha(1.0);
    }

    if images.is_ready(Sprite::Player) {
        surface.draw_image(Sprite::Player, p.x - p.width / 2.0, p.y, p.width, p.height);
    } else {
        let hull = [
            (p.x, p.y),
            (p.x - p.width / 2.0, p.y + p.height),
            (p.x + p.width / 2.0, p.y + p.height),
        ];
        surface.fill_polygon(&hull, Color::PLAYER);
        surface.fill_rect(p.x - 5.0, p.y + 10.0, 10.0, 10.0, Color::YELLOW);
    }

    if p.rapid_fire {
        surface.fill_rect(p.x - 3.0, p.y - 5.0, 6.0, 3.0, Color::YELLOW);
    }
    if p.multi_shot {
        for dx in [-8.0, -2.0, 4.0] {
            surface.fill_rect(p.x + dx, p.y + p.height + 2.0, 4.0, 3.0, Color::PLAYER);
        }
    }
}

/// Body, two eyes and three tentacles in the row color.
fn draw_invader<S: RenderSurface + ?Sized>(surface: &mut S, x: f32, y: f32, width: f32, height: f32, row: u32) {
    let color = Color::for_row(row);
    surface.fill_rect(x - width / 2.0, y, width, height * 0.6, color);
    surface.fill_rect(x - width / 3.0, y + 5.0, 8.0, 8.0, Color::BLACK);
    surface.fill_rect(x + width / 6.0, y + 5.0, 8.0, 8.0, Color::BLACK);
    for i in 0..3 {
        let tentacle_x = x - width / 3.0 + i as f32 * width / 3.0;
        surface.fill_rect(tentacle_x, y + height * 0.6, 6.0, height * 0.4, color);
    }
}

fn draw_enemy<S, I>(surface: &mut S, images: &I, e: &EnemySnapshot)
where
    S: RenderSurface + ?Sized,
    I: ImageProvider + ?Sized,
{
    let sprite = Sprite::for_row(e.row);
    if images.is_ready(sprite) {
        surface.draw_image(sprite, e.x - e.width / 2.0, e.y, e.width, e.height);
    } else {
        draw_invader(surface, e.x, e.y, e.width, e.height, e.row);
    }
}

fn draw_diver<S, I>(surface: &mut S, images: &I, d: &DiverSnapshot)
where
    S: RenderSurface + ?Sized,
    I: ImageProvider + ?Sized,
{
    let sprite = Sprite::for_row(d.row);
    if images.is_ready(sprite) {
        surface.draw_image(sprite, d.x - d.width / 2.0, d.y, d.width, d.height);
    } else {
        draw_invader(surface, d.x, d.y, d.width, d.height, d.row);
    }

    // Short trail under the attacker.
    surface.set_alpha(0.3);
    surface.stroke_line(
        (d.x, d.y + d.height),
        (d.x, d.y + d.height + 10.0),
        Color::for_row(d.row),
        2.0,
    );
    surface.set_alpha(1.0);
}

fn draw_bonus_flyer<S: RenderSurface + ?Sized>(surface: &mut S, f: &BonusFlyerSnapshot, time_ms: f64) {
    surface.fill_ellipse(f.x, f.y + 5.0, 12.0, 8.0, Color::BONUS_FLYER);
    surface.fill_ellipse(f.x, f.y + 12.0, 25.0, 10.0, Color::BONUS_FLYER);

    for i in 0..3 {
        surface.fill_rect(f.x - 15.0 + i as f32 * 12.0, f.y + 10.0, 6.0, 4.0, CYAN);
    }

    let lit = (time_ms / BLINK_PERIOD_MS).floor() as u64 % 2 == 0;
    let light = if lit { Color::YELLOW } else { RED };
    surface.fill_ellipse(f.x - 20.0, f.y + 15.0, 3.0, 3.0, light);
    surface.fill_ellipse(f.x + 20.0, f.y + 15.0, 3.0, 3.0, light);

    surface.fill_text(&f.points.to_string(), f.x, f.y - 5.0, 12.0, Color::WHITE);
}

/// Local icon outline rotated by `rotation` and moved to `(cx, cy)`.
fn place(points: &[(f32, f32)], cx: f32, cy: f32, rotation: f32) -> Vec<(f32, f32)> {
    let (sin, cos) = rotation.sin_cos();
    points
        .iter()
        .map(|(x, y)| (cx + x * cos - y * sin, cy + x * sin + y * cos))
        .collect()
}

fn star_outline() -> Vec<(f32, f32)> {
    (0..5)
        .map(|i| {
            let angle = i as f32 * 4.0 * PI / 5.0 - FRAC_PI_2;
            let radius = if i % 2 == 0 { 12.0 } else { 6.0 };
            (angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

fn hexagon_outline() -> Vec<(f32, f32)> {
    (0..6)
        .map(|i| {
            let angle = i as f32 * TAU / 6.0;
            (angle.cos() * 12.0, angle.sin() * 12.0)
        })
        .collect()
}

const SHIELD_OUTLINE_POINTS: [(f32, f32); 8] = [
    (0.0, -12.0),
    (10.0, -8.0),
    (10.0, 6.0),
    (7.0, 11.0),
    (0.0, 14.0),
    (-7.0, 11.0),
    (-10.0, 6.0),
    (-10.0, -8.0),
];

fn draw_pickup<S: RenderSurface + ?Sized>(surface: &mut S, p: &PickupSnapshot) {
    let (outline, fill, stroke, label, label_color) = match p.kind {
        PowerUpKind::RapidFire => (star_outline(), Color::YELLOW, ORANGE, "R", Color::BLACK),
        PowerUpKind::Shield => (
            SHIELD_OUTLINE_POINTS.to_vec(),
            Color::SHIELD,
            SHIELD_OUTLINE,
            "S",
            Color::WHITE,
        ),
        PowerUpKind::MultiShot => (hexagon_outline(), Color::PLAYER, MULTI_SHOT_OUTLINE, "3", Color::BLACK),
    };

    let pulse = p.pulse_phase.sin() * 0.3 + 0.7;
    surface.set_alpha(pulse);
    let placed = place(&outline, p.x, p.y, p.rotation);
    surface.fill_polygon(&placed, fill);
    surface.stroke_polygon(&placed, stroke, 2.0);
    surface.fill_text(label, p.x, p.y, 14.0, label_color);
    surface.set_alpha(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ParticleSnapshot, ProjectileSnapshot};

    /// Records draw calls by name.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        images: Vec<Sprite>,
        texts: Vec<String>,
    }

    impl RenderSurface for Recorder {
        fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _c: Color) {
            self.calls.push("rect".into());
        }
        fn fill_ellipse(&mut self, _cx: f32, _cy: f32, _rx: f32, _ry: f32, _c: Color) {
            self.calls.push("ellipse".into());
        }
        fn fill_polygon(&mut self, _points: &[(f32, f32)], _c: Color) {
            self.calls.push("polygon".into());
        }
        fn stroke_polygon(&mut self, _points: &[(f32, f32)], _c: Color, _w: f32) {
            self.calls.push("stroke_polygon".into());
        }
        fn stroke_circle(&mut self, _cx: f32, _cy: f32, _r: f32, _c: Color, _w: f32) {
            self.calls.push("circle".into());
        }
        fn stroke_line(&mut self, _from: (f32, f32), _to: (f32, f32), _c: Color, _w: f32) {
            self.calls.push("line".into());
        }
        fn fill_text(&mut self, text: &str, _x: f32, _y: f32, _size: f32, _c: Color) {
            self.texts.push(text.to_string());
        }
        fn draw_image(&mut self, sprite: Sprite, _x: f32, _y: f32, _w: f32, _h: f32) {
            self.images.push(sprite);
        }
        fn set_alpha(&mut self, _alpha: f32) {}
    }

    struct AllImages;

    impl ImageProvider for AllImages {
        fn is_ready(&self, _sprite: Sprite) -> bool {
            true
        }
    }

    fn frame_with_player_and_enemy() -> Snapshot {
        Snapshot {
            canvas_width: 800.0,
            canvas_height: 600.0,
            player: Some(PlayerSnapshot {
                x: 400.0,
                y: 540.0,
                width: 50.0,
                height: 40.0,
                vx: 0.0,
                shield: true,
                rapid_fire: false,
                multi_shot: false,
            }),
            enemies: vec![EnemySnapshot {
                row: 5,
                col: 0,
                x: 50.0,
                y: 50.0,
                width: 40.0,
                height: 30.0,
            }],
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_images_preferred_when_ready() {
        let mut surface = Recorder::default();
        draw_frame(&mut surface, &AllImages, &frame_with_player_and_enemy());
        assert_eq!(surface.images, vec![Sprite::Player, Sprite::Enemy(1)]);
        assert!(surface.calls.contains(&"circle".to_string()), "shield ring");
    }

    #[test]
    fn test_fallback_shapes_without_images() {
        let mut surface = Recorder::default();
        draw_frame(&mut surface, &NoImages, &frame_with_player_and_enemy());
        assert!(surface.images.is_empty());
        assert_eq!(surface.calls.iter().filter(|c| *c == "polygon").count(), 1, "player hull");
        // Background, 50 stars, cockpit, then body + 2 eyes + 3 tentacles.
        assert_eq!(surface.calls.iter().filter(|c| *c == "rect").count(), 1 + 50 + 1 + 6);
    }

    #[test]
    fn test_pause_overlay_and_popup_text() {
        let snapshot = Snapshot {
            status: GameStatus::Paused,
            canvas_width: 800.0,
            canvas_height: 600.0,
            projectiles: vec![ProjectileSnapshot {
                owner: Owner::Player,
                x: 1.0,
                y: 1.0,
                width: 4.0,
                height: 15.0,
            }],
            particles: vec![ParticleSnapshot {
                kind: ParticleKind::ScorePopup { points: 200 },
                x: 0.0,
                y: 0.0,
                alpha: 1.0,
            }],
            ..Snapshot::default()
        };
        let mut surface = Recorder::default();
        draw_frame(&mut surface, &NoImages, &snapshot);
        assert_eq!(surface.texts, vec!["+200".to_string(), "PAUSED".to_string()]);
    }

    #[test]
    fn test_pickup_icons_are_labelled() {
        let snapshot = Snapshot {
            pickups: PowerUpKind::ALL
                .iter()
                .map(|kind| PickupSnapshot {
                    kind: *kind,
                    x: 100.0,
                    y: 100.0,
                    width: 30.0,
                    height: 30.0,
                    rotation: 0.3,
                    pulse_phase: 0.0,
                })
                .collect(),
            ..Snapshot::default()
        };
        let mut surface = Recorder::default();
        draw_frame(&mut surface, &NoImages, &snapshot);
        assert_eq!(surface.texts, vec!["R", "S", "3"]);
    }

    #[test]
    fn test_place_rotates_about_center() {
        let placed = place(&[(10.0, 0.0)], 5.0, 5.0, FRAC_PI_2);
        assert!((placed[0].0 - 5.0).abs() < 1e-5);
        assert!((placed[0].1 - 15.0).abs() < 1e-5);
    }
}
