//! Procedural spawn scheduler
//!
//! Each population (score gems, energy gems, enemies, power-ups) has its own
//! interval accumulator. Intervals shrink linearly with level down to a
//! floor, so later levels spawn more often without ever going degenerate.
//! Spawning is wholly suppressed during the level-transition grace window,
//! and every spawn is a silent no-op at capacity.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{Enemy, EnemyKind, EntityStore, Gem, GemKind, PowerUp, PowerUpKind, RunState};
use crate::consts::*;

/// Frames between energy gem attempts (eligibility-gated on top)
const ENERGY_GEM_INTERVAL: f32 = 240.0;
/// Frames between power-up drops
const POWERUP_INTERVAL: f32 = 540.0;

fn enemy_interval(level: u32) -> f32 {
    (90.0 - level as f32 * 4.0).max(30.0)
}

fn gem_interval(level: u32) -> f32 {
    (80.0 - level as f32 * 2.0).max(45.0)
}

/// Time- and level-gated generator for all non-projectile populations
#[derive(Debug)]
pub struct Spawner {
    rng: Pcg32,
    gem_acc: f32,
    energy_acc: f32,
    enemy_acc: f32,
    powerup_acc: f32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            gem_acc: 0.0,
            energy_acc: 0.0,
            enemy_acc: 0.0,
            powerup_acc: 0.0,
        }
    }

    pub fn update(&mut self, delta_frames: f32, run: &RunState, store: &mut EntityStore) {
        if run.in_transition() {
            return;
        }

        self.gem_acc += delta_frames;
        let gem_rate = gem_interval(run.level);
        while self.gem_acc >= gem_rate {
            self.gem_acc -= gem_rate;
            self.spawn_gem(store, GemKind::Score);
        }

        self.energy_acc += delta_frames;
        while self.energy_acc >= ENERGY_GEM_INTERVAL {
            self.energy_acc -= ENERGY_GEM_INTERVAL;
            if run.energy < INITIAL_ENERGY * ENERGY_GEM_THRESHOLD {
                self.spawn_gem(store, GemKind::Energy);
            }
        }

        self.enemy_acc += delta_frames;
        let enemy_rate = enemy_interval(run.level);
        while self.enemy_acc >= enemy_rate {
            self.enemy_acc -= enemy_rate;
            self.spawn_enemy(store, run.level);
        }

        self.powerup_acc += delta_frames;
        while self.powerup_acc >= POWERUP_INTERVAL {
            self.powerup_acc -= POWERUP_INTERVAL;
            self.spawn_powerup(store);
        }
    }

    /// Weighted kind draw; variants unlock by level threshold
    fn roll_enemy_kind(&mut self, level: u32) -> EnemyKind {
        let roll = self.rng.random_range(0..100u32);
        if level >= 7 && roll < 12 {
            EnemyKind::TriShooter
        } else if level >= 5 && roll < 32 {
            EnemyKind::Zigzag
        } else if level >= 3 && roll < 55 {
            EnemyKind::FastShooter
        } else {
            EnemyKind::Basic
        }
    }

    fn spawn_enemy(&mut self, store: &mut EntityStore, level: u32) {
        if store.at_capacity() {
            return;
        }

        let kind = self.roll_enemy_kind(level);
        let (size, fall) = match kind {
            EnemyKind::Basic => (Vec2::new(56.0, 56.0), self.rng.random_range(2.2..3.2)),
            EnemyKind::Zigzag => (Vec2::new(60.0, 48.0), self.rng.random_range(1.8..2.4)),
            EnemyKind::FastShooter => (Vec2::new(48.0, 48.0), self.rng.random_range(2.8..3.8)),
            EnemyKind::TriShooter => (Vec2::new(72.0, 64.0), self.rng.random_range(1.2..1.8)),
        };
        let x = self.rng.random_range(size.x..FIELD_W - size.x);
        let fire_cooldown = match kind.fire_interval() {
            Some(interval) => self.rng.random_range(40.0..interval),
            None => 0.0,
        };

        store.enemies.push(Enemy {
            pos: Vec2::new(x, -size.y),
            vel: Vec2::new(0.0, fall),
            size,
            kind,
            health: kind.base_health(),
            fire_cooldown,
            phase: self.rng.random_range(0.0..std::f32::consts::TAU),
        });
    }

    /// Gems drift in diagonally from either vertical edge. Energy gems carry
    /// their own small concurrent cap, separate from the score-gem cap.
    fn spawn_gem(&mut self, store: &mut EntityStore, kind: GemKind) {
        let capped = match kind {
            GemKind::Score => store.gems.len() >= MAX_GEMS,
            GemKind::Energy => store.energy_gem_count() >= MAX_ENERGY_GEMS,
        };
        if capped {
            return;
        }

        let from_left = self.rng.random_bool(0.5);
        let x = if from_left { -30.0 } else { FIELD_W + 30.0 };
        let vx = self.rng.random_range(1.5..3.0) * if from_left { 1.0 } else { -1.0 };

        store.gems.push(Gem {
            pos: Vec2::new(x, self.rng.random_range(60.0..FIELD_H * 0.5)),
            vel: Vec2::new(vx, self.rng.random_range(0.8..1.8)),
            kind,
        });
    }

    fn spawn_powerup(&mut self, store: &mut EntityStore) {
        if store.powerups.len() >= MAX_POWERUPS {
            return;
        }

        let anchor_x = self.rng.random_range(80.0..FIELD_W - 80.0);
        store.powerups.push(PowerUp {
            pos: Vec2::new(anchor_x, -40.0),
            fall_speed: self.rng.random_range(1.4..2.0),
            anchor_x,
            phase: self.rng.random_range(0.0..std::f32::consts::TAU),
            amplitude: self.rng.random_range(60.0..140.0),
            kind: PowerUpKind::SpreadShot,
        });
        log::debug!("power-up spawned at x={anchor_x:.0}");
    }
}
