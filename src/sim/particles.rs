//! Cosmetic debris particles
//!
//! Purely additive visuals: bursts on enemy destruction, a mild downward
//! drift, and a countdown life. Nothing here may influence gameplay state,
//! and the whole system can be disabled without changing a run's outcome.
//! Scatter randomness comes from an integer hash rather than the spawner's
//! RNG so cosmetics never perturb the gameplay stream.

use glam::Vec2;

use super::state::{EnemyKind, Particle};
use crate::settings::ParticleConfig;

/// Downward drift applied each frame (px/frame²)
const GRAVITY: f32 = 0.12;

/// Palette index for an enemy kind's debris
pub fn debris_color(kind: EnemyKind) -> u32 {
    match kind {
        EnemyKind::Basic => 0,
        EnemyKind::Zigzag => 1,
        EnemyKind::FastShooter => 2,
        EnemyKind::TriShooter => 3,
    }
}

/// Spawn a burst of debris around a point. The global cap is enforced by
/// trimming the oldest particles first.
pub fn spawn_burst(
    particles: &mut Vec<Particle>,
    cfg: &ParticleConfig,
    origin: Vec2,
    color: u32,
    seed: u64,
) {
    if !cfg.enabled || cfg.max == 0 {
        return;
    }

    for i in 0..cfg.burst {
        while particles.len() >= cfg.max {
            particles.remove(0);
        }

        let hash = (seed as u32)
            .wrapping_mul(2654435761)
            .wrapping_add(i as u32 * 7919);
        let r1 = (hash % 1000) as f32 / 1000.0;
        let r2 = ((hash >> 10) % 1000) as f32 / 1000.0;
        let r3 = ((hash >> 20) % 1000) as f32 / 1000.0;

        let angle = r1 * std::f32::consts::TAU;
        let speed = 1.5 + r2 * 3.5;
        particles.push(Particle {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 30.0 + r3 * 20.0,
            size: 3.0 + r2 * 4.0,
            color,
        });
    }
}

/// Advance and expire particles
pub fn update(particles: &mut Vec<Particle>, delta_frames: f32) {
    for p in particles.iter_mut() {
        p.pos += p.vel * delta_frames;
        p.vel.y += GRAVITY * delta_frames;
        p.life -= delta_frames;
    }
    particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(max: usize, burst: usize) -> ParticleConfig {
        ParticleConfig {
            enabled: true,
            max,
            burst,
        }
    }

    #[test]
    fn test_burst_spawns_and_expires() {
        let mut particles = Vec::new();
        spawn_burst(&mut particles, &cfg(100, 12), Vec2::new(100.0, 100.0), 0, 7);
        assert_eq!(particles.len(), 12);

        // Everything dies within the maximum lifetime
        update(&mut particles, 51.0);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_global_cap_trims_oldest(){
        let mut particles = Vec::new();
        spawn_burst(&mut particles, &cfg(20, 12), Vec2::ZERO, 0, 1);
        let oldest = particles[0].pos;
        assert_eq!(oldest, Vec2::ZERO);

        spawn_burst(&mut particles, &cfg(20, 12), Vec2::new(50.0, 50.0), 1, 2);
        assert_eq!(particles.len(), 20);
        // The survivors' tail must be the newest burst
        assert_eq!(particles.last().unwrap().pos, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_disabled_flag_spawns_nothing() {
        let mut particles = Vec::new();
        let cfg = ParticleConfig {
            enabled: false,
            max: 100,
            burst: 12,
        };
        spawn_burst(&mut particles, &cfg, Vec2::ZERO, 0, 1);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut particles = vec![Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, 0.0),
            life: 100.0,
            size: 3.0,
            color: 0,
        }];
        update(&mut particles, 1.0);
        update(&mut particles, 1.0);
        assert!(particles[0].vel.y > 0.0);
        assert!(particles[0].pos.y > 0.0);
    }
}
