//! Gemfall - a vertical gem-chasing arcade shooter
//!
//! Core modules:
//! - `sim`: host-agnostic simulation (entities, collisions, spawning, progression)
//! - `render`: read-only draw pass over a host-provided 2D surface
//! - `settings`: quality presets and effect toggles
//! - `audio`: procedural sound effects (web only)

pub mod render;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use settings::{ParticleConfig, QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical play field, portrait orientation. All simulation coordinates
    /// live in this space; the host scales to the actual canvas.
    pub const FIELD_W: f32 = 720.0;
    pub const FIELD_H: f32 = 1000.0;

    /// One simulation frame at the reference rate (ms). Velocities are tuned
    /// in px/frame at 60 Hz; the tick normalizes real elapsed time to this.
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest delta fed into one tick (tab suspends produce huge gaps)
    pub const MAX_DELTA_MS: f64 = 100.0;

    /// Ship
    pub const SHIP_W: f32 = 64.0;
    pub const SHIP_H: f32 = 64.0;
    /// Collision ellipse, narrower than the sprite box
    pub const SHIP_HIT_W: f32 = 40.0;
    pub const SHIP_HIT_H: f32 = 50.0;
    /// Per-frame easing factor toward the pointer target while not held
    pub const SHIP_EASE: f32 = 0.18;
    /// Frames between player shots
    pub const SHIP_FIRE_INTERVAL: f32 = 16.0;

    /// Inset rectangle the ship is clamped to (lower half of the field)
    pub const SHIP_MIN_X: f32 = 40.0;
    pub const SHIP_MAX_X: f32 = FIELD_W - 40.0;
    pub const SHIP_MIN_Y: f32 = 520.0;
    pub const SHIP_MAX_Y: f32 = FIELD_H - 60.0;

    /// Projectiles (px/frame)
    pub const PLAYER_SHOT_SPEED: f32 = 14.0;
    pub const PLAYER_SHOT_W: f32 = 6.0;
    pub const PLAYER_SHOT_H: f32 = 18.0;
    pub const ENEMY_SHOT_SPEED: f32 = 4.5;
    pub const ENEMY_SHOT_SIZE: f32 = 12.0;

    /// Spread-shot buff
    pub const SPREAD_SHOT_COUNT: usize = 3;
    pub const SPREAD_SHOT_SPREAD_DEG: f32 = 15.0;
    pub const SPREAD_SHOT_DURATION_MS: f64 = 8000.0;

    /// Energy: one unit drains per real second; zero ends the run
    pub const INITIAL_ENERGY: f32 = 30.0;
    pub const ENERGY_GEM_RESTORE: f32 = 10.0;
    /// Energy gems only spawn below this fraction of max energy
    pub const ENERGY_GEM_THRESHOLD: f32 = 0.5;
    pub const MAX_ENERGY_GEMS: usize = 2;

    /// Progression
    pub const GEMS_BASE_QUOTA: u32 = 3;
    pub const MAX_LEVEL: u32 = 100;
    /// Post-level-up grace window with no spawning (frames)
    pub const TRANSITION_FRAMES: f32 = 120.0;
    pub const GEM_SCORE: u64 = 5;

    /// Capacity caps (back-pressure: spawns at cap are silently dropped)
    pub const MAX_OBJECTS: usize = 100;
    pub const MAX_GEMS: usize = 12;
    pub const MAX_POWERUPS: usize = 2;

    /// Entities farther than this outside the field are removed
    pub const CULL_MARGIN: f32 = 80.0;
}

/// Ease a value toward a target by a fixed per-frame factor, normalized so
/// the curve is identical regardless of actual frame rate.
#[inline]
pub fn ease_toward(current: Vec2, target: Vec2, per_frame: f32, delta_frames: f32) -> Vec2 {
    let t = 1.0 - (1.0 - per_frame).powf(delta_frames);
    current + (target - current) * t.clamp(0.0, 1.0)
}

/// Unit vector from one point toward another (straight down if coincident)
#[inline]
pub fn aim_dir(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or(Vec2::Y)
}

/// Clamp a pointer-derived position into the ship's playable rectangle
#[inline]
pub fn clamp_to_ship_rect(pos: Vec2) -> Vec2 {
    use consts::*;
    Vec2::new(
        pos.x.clamp(SHIP_MIN_X, SHIP_MAX_X),
        pos.y.clamp(SHIP_MIN_Y, SHIP_MAX_Y),
    )
}
