//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Ellipse;
use super::spawn::Spawner;
use crate::consts::*;
use crate::settings::ParticleConfig;

/// Pointer-derived input for a single tick.
///
/// The host translates raw device events into logical field coordinates
/// before the core ever sees them; multi-touch arbitration and coordinate
/// scaling are not the core's concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerInput {
    /// Pointer position in field coordinates (None = no reading this tick)
    pub pos: Option<Vec2>,
    /// Whether the pointer is currently down/dragging
    pub held: bool,
}

/// Discrete events emitted to the embedding host, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    /// First player input began the run
    GameStart,
    /// Score changed (host forwards to its leaderboard glue)
    ScoreUpdate { score: u64, level: u32 },
    /// Run ended; emitted exactly once per run
    GameOver { score: u64, level: u32 },
}

/// Sound requests, drained and played fire-and-forget by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Shoot,
    GemPickup,
    EnergyPickup,
    PowerUpCollect,
    EnemyHit,
    Explosion,
    LevelUp,
    GameOver,
}

/// Enemy variants, unlocked by level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    /// Falls straight down
    Basic,
    /// Sinusoidal lateral weave (level 5+)
    Zigzag,
    /// Falls fast, fires aimed shots (level 3+)
    FastShooter,
    /// Slow and tough, fires a 3-shot fan (level 7+)
    TriShooter,
}

impl EnemyKind {
    pub fn base_health(self) -> u8 {
        match self {
            EnemyKind::Basic => 1,
            EnemyKind::Zigzag => 2,
            EnemyKind::FastShooter => 1,
            EnemyKind::TriShooter => 3,
        }
    }

    pub fn score(self) -> u64 {
        match self {
            EnemyKind::Basic => 10,
            EnemyKind::FastShooter => 15,
            EnemyKind::Zigzag => 20,
            EnemyKind::TriShooter => 30,
        }
    }

    /// Frames between shots (shooter kinds only)
    pub fn fire_interval(self) -> Option<f32> {
        match self {
            EnemyKind::FastShooter => Some(110.0),
            EnemyKind::TriShooter => Some(150.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: EnemyKind,
    pub health: u8,
    /// Frames until the next shot (shooter kinds)
    pub fire_cooldown: f32,
    /// Zigzag phase accumulator
    pub phase: f32,
}

impl Enemy {
    /// Collision ellipse, slightly narrower than the sprite box
    pub fn hitbox(&self) -> Ellipse {
        Ellipse::new(self.pos, self.size.x * 0.85, self.size.y * 0.85)
    }
}

/// Gem variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemKind {
    /// Counts toward the level quota and scores
    Score,
    /// Restores energy when below max
    Energy,
}

#[derive(Debug, Clone)]
pub struct Gem {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: GemKind,
}

/// A projectile; the two populations (player, enemy) live in separate
/// collections so hit-test pairing stays explicit.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Temporary fan-shot weapon buff
    SpreadShot,
}

#[derive(Debug, Clone)]
pub struct PowerUp {
    pub pos: Vec2,
    /// Downward drift (px/frame)
    pub fall_speed: f32,
    /// Horizontal sweep: x = anchor_x + sin(phase) * amplitude
    pub anchor_x: f32,
    pub phase: f32,
    pub amplitude: f32,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn hitbox(&self) -> Ellipse {
        Ellipse::new(self.pos, 40.0, 40.0)
    }
}

/// A cosmetic debris particle; never affects gameplay state
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in frames
    pub life: f32,
    pub size: f32,
    /// Palette index for the render pass
    pub color: u32,
}

/// The player ship. Created once per run, never destroyed mid-run.
#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    /// Pointer-derived target position (already clamped to the play rect)
    pub target: Vec2,
    /// Whether the pointer is currently dragging the ship
    pub held: bool,
    /// Frames until the next shot
    pub fire_cooldown: f32,
    /// Spread-shot buff expiry timestamp in host ms; 0 = inactive
    pub spread_until_ms: f64,
}

impl Ship {
    pub fn new() -> Self {
        let start = Vec2::new(FIELD_W / 2.0, FIELD_H - 140.0);
        Self {
            pos: start,
            target: start,
            held: false,
            fire_cooldown: 0.0,
            spread_until_ms: 0.0,
        }
    }

    pub fn hitbox(&self) -> Ellipse {
        Ellipse::new(self.pos, SHIP_HIT_W, SHIP_HIT_H)
    }

    /// An expiry in the past is equivalent to "buff inactive"
    pub fn spread_active(&self, now_ms: f64) -> bool {
        self.spread_until_ms > now_ms
    }
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

/// All mutable entity collections. Exclusively owned and mutated by the
/// tick sequence; the render pass only reads it.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    pub ship: Ship,
    pub enemies: Vec<Enemy>,
    pub gems: Vec<Gem>,
    pub player_shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    pub powerups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live count against the global object cap
    pub fn object_count(&self) -> usize {
        self.enemies.len() + self.player_shots.len() + self.enemy_shots.len()
    }

    pub fn at_capacity(&self) -> bool {
        self.object_count() >= MAX_OBJECTS
    }

    pub fn energy_gem_count(&self) -> usize {
        self.gems
            .iter()
            .filter(|g| g.kind == GemKind::Energy)
            .count()
    }

    /// Level-up clears the combat field but leaves power-ups and particles
    pub fn clear_combat(&mut self) {
        self.enemies.clear();
        self.gems.clear();
        self.player_shots.clear();
        self.enemy_shots.clear();
    }

    /// Full teardown on stop()
    pub fn release(&mut self) {
        self.clear_combat();
        self.powerups.clear();
        self.particles.clear();
    }
}

/// Run-wide progression state
#[derive(Debug, Clone)]
pub struct RunState {
    pub level: u32,
    pub score: u64,
    /// Depleting resource in seconds-of-play; clamped to [0, INITIAL_ENERGY]
    pub energy: f32,
    pub gems_collected: u32,
    pub gems_required: u32,
    pub game_started: bool,
    pub game_over: bool,
    /// While > 0 the spawner produces nothing (post-level-up grace)
    pub transition_frames: f32,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            level: 1,
            score: 0,
            energy: INITIAL_ENERGY,
            gems_collected: 0,
            gems_required: Self::quota_for(1),
            game_started: false,
            game_over: false,
            transition_frames: 0.0,
        }
    }

    /// Arithmetic quota progression: 3 at level 1, +1 per level
    pub fn quota_for(level: u32) -> u32 {
        GEMS_BASE_QUOTA + level.saturating_sub(1)
    }

    pub fn in_transition(&self) -> bool {
        self.transition_frames > 0.0
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete engine state: run progression, entity store, spawner, and the
/// outbound event/sound queues the host drains after each tick.
#[derive(Debug)]
pub struct GameState {
    pub seed: u64,
    pub run: RunState,
    pub store: EntityStore,
    pub spawner: Spawner,
    pub particles_cfg: ParticleConfig,
    /// Tick counter (also seeds the cosmetic particle scatter)
    pub ticks: u64,
    /// Timestamp of the previous tick; None until the first tick lands
    pub last_tick_ms: Option<f64>,
    events: Vec<GameEvent>,
    sounds: Vec<SoundCue>,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            run: RunState::new(),
            store: EntityStore::new(),
            spawner: Spawner::new(seed),
            particles_cfg: ParticleConfig::default(),
            ticks: 0,
            last_tick_ms: None,
            events: Vec::new(),
            sounds: Vec::new(),
        }
    }

    pub fn with_particles(mut self, cfg: ParticleConfig) -> Self {
        self.particles_cfg = cfg;
        self
    }

    /// Begin the run. Idempotent; emits `game-start` exactly once. The time
    /// baseline is owned by the tick itself: the first tick after `start`
    /// observes a zero delta.
    pub fn start(&mut self) {
        if self.run.game_started || self.run.game_over {
            return;
        }
        self.run.game_started = true;
        self.events.push(GameEvent::GameStart);
        log::info!("run started (seed {})", self.seed);
    }

    /// Halt the run and release every collection. Safe to call repeatedly
    /// and before `start`; emits nothing.
    pub fn stop(&mut self) {
        self.run.game_started = false;
        self.run.game_over = true;
        self.store.release();
        self.events.clear();
        self.sounds.clear();
        self.last_tick_ms = None;
    }

    /// Take the pending host events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take the pending sound requests
    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    pub(crate) fn push_sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }

    /// Add score and notify the host
    pub(crate) fn award(&mut self, points: u64) {
        self.run.score += points;
        self.events.push(GameEvent::ScoreUpdate {
            score: self.run.score,
            level: self.run.level,
        });
    }

    /// One-shot run termination; the flag guards re-entry so repeated
    /// trigger paths produce a single `game-over` event.
    pub(crate) fn trigger_game_over(&mut self) {
        if self.run.game_over {
            return;
        }
        self.run.game_over = true;
        self.events.push(GameEvent::GameOver {
            score: self.run.score,
            level: self.run.level,
        });
        self.sounds.push(SoundCue::GameOver);
        log::info!(
            "game over: score {} level {}",
            self.run.score,
            self.run.level
        );
    }
}
