//! Read-only render pass over a host-provided 2D surface
//!
//! The core never touches a canvas directly: the host implements [`Surface`]
//! (draw an image, fill a shape, report sprite readiness) and the pass walks
//! the entity store in back-to-front order. Sprites that have not finished
//! loading skip their draw for the tick; gameplay state is never consulted
//! for cosmetics and never mutated here.

use glam::Vec2;

use crate::consts::*;
use crate::sim::{EnemyKind, GameState, GemKind, PowerUpKind};

/// Image handles the host is expected to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Ship,
    EnemyBasic,
    EnemyZigzag,
    EnemyFastShooter,
    EnemyTriShooter,
    GemScore,
    GemEnergy,
    PowerUpSpread,
}

impl SpriteId {
    pub fn for_enemy(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Basic => SpriteId::EnemyBasic,
            EnemyKind::Zigzag => SpriteId::EnemyZigzag,
            EnemyKind::FastShooter => SpriteId::EnemyFastShooter,
            EnemyKind::TriShooter => SpriteId::EnemyTriShooter,
        }
    }

    pub fn for_gem(kind: GemKind) -> Self {
        match kind {
            GemKind::Score => SpriteId::GemScore,
            GemKind::Energy => SpriteId::GemEnergy,
        }
    }

    /// Asset path relative to the page root
    pub fn asset_path(&self) -> &'static str {
        match self {
            SpriteId::Ship => "assets/ship.png",
            SpriteId::EnemyBasic => "assets/enemy_basic.png",
            SpriteId::EnemyZigzag => "assets/enemy_zigzag.png",
            SpriteId::EnemyFastShooter => "assets/enemy_fast.png",
            SpriteId::EnemyTriShooter => "assets/enemy_tri.png",
            SpriteId::GemScore => "assets/gem.png",
            SpriteId::GemEnergy => "assets/gem_energy.png",
            SpriteId::PowerUpSpread => "assets/powerup_spread.png",
        }
    }

    pub const ALL: [SpriteId; 8] = [
        SpriteId::Ship,
        SpriteId::EnemyBasic,
        SpriteId::EnemyZigzag,
        SpriteId::EnemyFastShooter,
        SpriteId::EnemyTriShooter,
        SpriteId::GemScore,
        SpriteId::GemEnergy,
        SpriteId::PowerUpSpread,
    ];
}

/// Straight-alpha color for shape fills
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS rgba() string for canvas contexts
    pub fn css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }
}

const PLAYER_SHOT_COLOR: Color = Color::rgb(0x7d, 0xf9, 0xff);
const ENEMY_SHOT_COLOR: Color = Color::rgb(0xff, 0x5d, 0x5d);

/// Debris palette, indexed by `Particle::color`
const DEBRIS_PALETTE: [Color; 4] = [
    Color::rgb(0xff, 0xb3, 0x47), // basic - amber
    Color::rgb(0xb7, 0x8c, 0xff), // zigzag - violet
    Color::rgb(0x6e, 0xe7, 0xd8), // fast shooter - teal
    Color::rgb(0xff, 0x6e, 0xc7), // tri shooter - magenta
];

pub fn debris_palette(index: u32) -> Color {
    DEBRIS_PALETTE[index as usize % DEBRIS_PALETTE.len()]
}

/// Host-provided 2D drawing capability. Positions are centers in field
/// coordinates; the host owns the scale to device pixels.
pub trait Surface {
    /// Whether an image handle has finished loading
    fn sprite_ready(&self, id: SpriteId) -> bool;
    fn draw_sprite(&mut self, id: SpriteId, center: Vec2, size: Vec2);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);
    fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Color);
}

/// Draw the current state, back to front. Strictly read-only with respect
/// to the store; runs after game-over too so the final frame persists.
pub fn render(state: &GameState, surface: &mut impl Surface) {
    let store = &state.store;

    for gem in &store.gems {
        let id = SpriteId::for_gem(gem.kind);
        if surface.sprite_ready(id) {
            surface.draw_sprite(id, gem.pos, Vec2::splat(36.0));
        }
    }

    for p in &store.powerups {
        let PowerUpKind::SpreadShot = p.kind;
        if surface.sprite_ready(SpriteId::PowerUpSpread) {
            surface.draw_sprite(SpriteId::PowerUpSpread, p.pos, Vec2::splat(44.0));
        }
    }

    for enemy in &store.enemies {
        let id = SpriteId::for_enemy(enemy.kind);
        if surface.sprite_ready(id) {
            surface.draw_sprite(id, enemy.pos, enemy.size);
        }
    }

    for shot in &store.player_shots {
        surface.fill_rect(
            shot.pos,
            Vec2::new(PLAYER_SHOT_W, PLAYER_SHOT_H),
            PLAYER_SHOT_COLOR,
        );
    }
    for shot in &store.enemy_shots {
        surface.fill_ellipse(
            shot.pos,
            Vec2::splat(ENEMY_SHOT_SIZE * 0.5),
            ENEMY_SHOT_COLOR,
        );
    }

    if surface.sprite_ready(SpriteId::Ship) {
        surface.draw_sprite(SpriteId::Ship, store.ship.pos, Vec2::new(SHIP_W, SHIP_H));
    }

    // Particles on top, fading out over their last 20 frames
    for particle in &store.particles {
        let alpha = (particle.life / 20.0).min(1.0);
        surface.fill_ellipse(
            particle.pos,
            Vec2::splat(particle.size * 0.5),
            debris_palette(particle.color).with_alpha(alpha),
        );
    }
}
