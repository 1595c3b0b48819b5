//! Ellipse hit-testing and per-tick collision resolution
//!
//! Sprites are visually narrower than their bounding boxes, so every hit
//! test uses ellipses rather than axis-aligned rectangles. The overlap
//! predicate is an approximation tuned for speed: bounding-circle reject,
//! mutual center containment, then the four axis-extreme points of each
//! ellipse sampled against the other. Ellipses that intersect only at
//! non-axis-extreme points can slip through; gameplay was balanced against
//! this behavior, so it is kept as-is.

use glam::Vec2;

use super::particles;
use super::state::{GameState, GemKind, PowerUpKind, SoundCue};
use crate::consts::*;

/// An axis-aligned ellipse hitbox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Ellipse {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Point containment: normalize to the unit circle and sum squares
    pub fn contains_point(&self, p: Vec2) -> bool {
        let nx = (p.x - self.center.x) / (self.width * 0.5);
        let ny = (p.y - self.center.y) / (self.height * 0.5);
        nx * nx + ny * ny <= 1.0
    }

    /// Largest semi-axis, used for the cheap bounding-circle reject
    #[inline]
    fn bounding_radius(&self) -> f32 {
        self.width.max(self.height) * 0.5
    }

    /// The four axis-extreme points (left/right/top/bottom)
    fn axis_points(&self) -> [Vec2; 4] {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        [
            self.center + Vec2::new(hw, 0.0),
            self.center - Vec2::new(hw, 0.0),
            self.center + Vec2::new(0.0, hh),
            self.center - Vec2::new(0.0, hh),
        ]
    }

    /// Approximate overlap test; symmetric by construction
    pub fn overlaps(&self, other: &Ellipse) -> bool {
        let max_dist = self.bounding_radius() + other.bounding_radius();
        if self.center.distance_squared(other.center) > max_dist * max_dist {
            return false;
        }

        if self.contains_point(other.center) || other.contains_point(self.center) {
            return true;
        }

        self.axis_points().iter().any(|p| other.contains_point(*p))
            || other.axis_points().iter().any(|p| self.contains_point(*p))
    }
}

/// Resolve all hit pairs for this tick, in fixed order: ship↔gem,
/// ship↔power-up, ship↔enemy-shot / ship↔enemy (lethal), then player
/// shots against enemies. Consumed transients are removed immediately so
/// nothing resolves twice within the tick.
pub fn resolve(state: &mut GameState, now_ms: f64) {
    let ship_hit = state.store.ship.hitbox();

    // Gems are points against the ship ellipse
    let mut collected: Vec<GemKind> = Vec::new();
    state.store.gems.retain(|gem| {
        if ship_hit.contains_point(gem.pos) {
            collected.push(gem.kind);
            false
        } else {
            true
        }
    });
    for kind in collected {
        match kind {
            GemKind::Score => {
                state.run.gems_collected += 1;
                state.award(GEM_SCORE);
                state.push_sound(SoundCue::GemPickup);
            }
            GemKind::Energy => {
                // Restore only below max; the gem is consumed either way
                if state.run.energy < INITIAL_ENERGY {
                    state.run.energy =
                        (state.run.energy + ENERGY_GEM_RESTORE).min(INITIAL_ENERGY);
                }
                state.push_sound(SoundCue::EnergyPickup);
            }
        }
    }

    let mut buffs: Vec<PowerUpKind> = Vec::new();
    state.store.powerups.retain(|p| {
        if ship_hit.overlaps(&p.hitbox()) {
            buffs.push(p.kind);
            false
        } else {
            true
        }
    });
    for kind in buffs {
        match kind {
            PowerUpKind::SpreadShot => {
                state.store.ship.spread_until_ms = now_ms + SPREAD_SHOT_DURATION_MS;
            }
        }
        state.push_sound(SoundCue::PowerUpCollect);
    }

    // Lethal contacts end the run; the guard inside trigger_game_over
    // keeps repeated hits within one tick down to a single event
    let mut lethal = false;
    state.store.enemy_shots.retain(|shot| {
        let hit = ship_hit.overlaps(&Ellipse::new(shot.pos, ENEMY_SHOT_SIZE, ENEMY_SHOT_SIZE));
        lethal |= hit;
        !hit
    });
    lethal |= state
        .store
        .enemies
        .iter()
        .any(|e| ship_hit.overlaps(&e.hitbox()));
    if lethal {
        state.trigger_game_over();
        return;
    }

    // Player shots are points against enemy ellipses. Reverse order with
    // swap_remove keeps indices valid while consuming shots mid-loop.
    let mut score = 0u64;
    let mut any_hit = false;
    let mut bursts: Vec<(Vec2, u32)> = Vec::new();
    for si in (0..state.store.player_shots.len()).rev() {
        let tip = state.store.player_shots[si].pos;
        let Some(ei) = state
            .store
            .enemies
            .iter()
            .position(|e| e.hitbox().contains_point(tip))
        else {
            continue;
        };

        state.store.player_shots.swap_remove(si);
        any_hit = true;
        let enemy = &mut state.store.enemies[ei];
        enemy.health = enemy.health.saturating_sub(1);
        if enemy.health == 0 {
            let dead = state.store.enemies.swap_remove(ei);
            score += dead.kind.score();
            bursts.push((dead.pos, particles::debris_color(dead.kind)));
        }
    }

    if any_hit {
        state.push_sound(SoundCue::EnemyHit);
    }
    if score > 0 {
        state.award(score);
    }
    for (i, (pos, color)) in bursts.into_iter().enumerate() {
        particles::spawn_burst(
            &mut state.store.particles,
            &state.particles_cfg,
            pos,
            color,
            state.ticks.wrapping_add(i as u64),
        );
        state.push_sound(SoundCue::Explosion);
    }
}
