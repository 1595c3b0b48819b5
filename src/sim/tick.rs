//! Per-frame simulation tick
//!
//! The host calls `tick(state, input, now_ms)` once per display refresh.
//! One tick runs the fixed sequence Spawner → kinematics → Collision →
//! Progression; the render pass reads the result afterwards. Elapsed wall
//! time is normalized to 60 Hz frame units so velocity constants keep their
//! tuning at any refresh rate.

use glam::Vec2;

use super::state::{
    EnemyKind, EntityStore, GameState, PointerInput, Projectile, RunState, SoundCue,
};
use super::{collision, particles};
use crate::consts::*;
use crate::{aim_dir, clamp_to_ship_rect, ease_toward};

/// Zigzag lateral amplitude (px/frame) and phase advance per frame
const ZIGZAG_LATERAL: f32 = 2.4;
const ZIGZAG_RATE: f32 = 0.08;
/// Power-up sweep phase advance per frame
const POWERUP_SWEEP_RATE: f32 = 0.05;
/// Fan half-angle for the tri-shooter volley (degrees)
const TRI_VOLLEY_DEG: f32 = 18.0;
/// Shooter enemies only fire while inside this vertical band
const ENEMY_FIRE_MAX_Y: f32 = FIELD_H * 0.55;

/// Advance the simulation by one frame.
///
/// No-op before `start()`; after game-over the state is frozen and only the
/// render pass still observes it. The first tick of a run establishes the
/// time baseline and sees a zero delta.
pub fn tick(state: &mut GameState, input: &PointerInput, now_ms: f64) {
    if !state.run.game_started {
        return;
    }

    let delta_ms = match state.last_tick_ms {
        None => {
            state.last_tick_ms = Some(now_ms);
            0.0
        }
        Some(last) => {
            let d = (now_ms - last).clamp(0.0, MAX_DELTA_MS);
            state.last_tick_ms = Some(now_ms);
            d
        }
    };

    if state.run.game_over {
        return;
    }

    let dt = (delta_ms / FRAME_MS) as f32;
    state.ticks += 1;

    if state.run.transition_frames > 0.0 {
        state.run.transition_frames = (state.run.transition_frames - dt).max(0.0);
    }

    {
        let GameState {
            spawner,
            run,
            store,
            ..
        } = state;
        spawner.update(dt, run, store);
    }

    update_ship(state, input, now_ms, dt);
    update_enemies(state, dt);
    integrate_transients(&mut state.store, dt);
    cull_out_of_bounds(&mut state.store);
    particles::update(&mut state.store.particles, dt);

    collision::resolve(state, now_ms);

    advance_progression(state, dt);
}

/// Ship motion and auto-fire. While held the ship pins to the (clamped)
/// pointer target; released, it eases back toward it.
fn update_ship(state: &mut GameState, input: &PointerInput, now_ms: f64, dt: f32) {
    let (origin, fire, spread) = {
        let ship = &mut state.store.ship;
        ship.held = input.held;
        if let Some(p) = input.pos {
            // Out-of-field readings clamp silently, never propagate
            ship.target = clamp_to_ship_rect(p);
        }
        if ship.held {
            ship.pos = ship.target;
        } else {
            ship.pos = ease_toward(ship.pos, ship.target, SHIP_EASE, dt);
        }
        ship.pos = clamp_to_ship_rect(ship.pos);

        ship.fire_cooldown = (ship.fire_cooldown - dt).max(0.0);
        let fire = ship.held && ship.fire_cooldown <= 0.0;
        if fire {
            ship.fire_cooldown = SHIP_FIRE_INTERVAL;
        }
        (
            ship.pos + Vec2::new(0.0, -SHIP_H * 0.5),
            fire,
            ship.spread_active(now_ms),
        )
    };

    if !fire {
        return;
    }

    // Back-pressure applies per projectile, so a spread volley can never
    // push the object count past the cap
    let base = Vec2::new(0.0, -PLAYER_SHOT_SPEED);
    let mut spawned = 0;
    if spread {
        for i in 0..SPREAD_SHOT_COUNT {
            if state.store.at_capacity() {
                break;
            }
            let t = i as f32 / (SPREAD_SHOT_COUNT - 1).max(1) as f32;
            let deg = -SPREAD_SHOT_SPREAD_DEG + t * 2.0 * SPREAD_SHOT_SPREAD_DEG;
            state.store.player_shots.push(Projectile {
                pos: origin,
                vel: Vec2::from_angle(deg.to_radians()).rotate(base),
            });
            spawned += 1;
        }
    } else if !state.store.at_capacity() {
        state.store.player_shots.push(Projectile {
            pos: origin,
            vel: base,
        });
        spawned += 1;
    }
    if spawned > 0 {
        state.push_sound(SoundCue::Shoot);
    }
}

/// Enemy kinematics plus shooter volleys aimed at the ship's current position
fn update_enemies(state: &mut GameState, dt: f32) {
    let ship_pos = state.store.ship.pos;
    let mut volleys: Vec<(Vec2, EnemyKind)> = Vec::new();

    for enemy in &mut state.store.enemies {
        enemy.pos += enemy.vel * dt;
        if enemy.kind == EnemyKind::Zigzag {
            enemy.phase += ZIGZAG_RATE * dt;
            enemy.pos.x += enemy.phase.sin() * ZIGZAG_LATERAL * dt;
        }

        if let Some(interval) = enemy.kind.fire_interval() {
            enemy.fire_cooldown -= dt;
            let in_band = enemy.pos.y > 0.0 && enemy.pos.y < ENEMY_FIRE_MAX_Y;
            if enemy.fire_cooldown <= 0.0 && in_band {
                enemy.fire_cooldown = interval;
                volleys.push((enemy.pos, enemy.kind));
            }
        }
    }

    for (from, kind) in volleys {
        fire_enemy_volley(&mut state.store, from, kind, ship_pos);
    }
}

fn fire_enemy_volley(store: &mut EntityStore, from: Vec2, kind: EnemyKind, ship_pos: Vec2) {
    let dir = aim_dir(from, ship_pos);
    let offsets: &[f32] = match kind {
        EnemyKind::TriShooter => &[-TRI_VOLLEY_DEG, 0.0, TRI_VOLLEY_DEG],
        _ => &[0.0],
    };
    for &deg in offsets {
        if store.at_capacity() {
            return;
        }
        store.enemy_shots.push(Projectile {
            pos: from,
            vel: Vec2::from_angle(deg.to_radians()).rotate(dir) * ENEMY_SHOT_SPEED,
        });
    }
}

/// Euler integration for gems, projectiles, and the power-up sweep
fn integrate_transients(store: &mut EntityStore, dt: f32) {
    for gem in &mut store.gems {
        gem.pos += gem.vel * dt;
    }
    for shot in &mut store.player_shots {
        shot.pos += shot.vel * dt;
    }
    for shot in &mut store.enemy_shots {
        shot.pos += shot.vel * dt;
    }
    for p in &mut store.powerups {
        p.phase += POWERUP_SWEEP_RATE * dt;
        p.pos.y += p.fall_speed * dt;
        p.pos.x = p.anchor_x + p.phase.sin() * p.amplitude;
    }
}

fn in_bounds(pos: Vec2) -> bool {
    pos.x > -CULL_MARGIN
        && pos.x < FIELD_W + CULL_MARGIN
        && pos.y > -CULL_MARGIN
        && pos.y < FIELD_H + CULL_MARGIN
}

/// Entities past the oversized margin are removed, not hidden
fn cull_out_of_bounds(store: &mut EntityStore) {
    store.enemies.retain(|e| in_bounds(e.pos));
    store.gems.retain(|g| in_bounds(g.pos));
    store.player_shots.retain(|s| in_bounds(s.pos));
    store.enemy_shots.retain(|s| in_bounds(s.pos));
    store.powerups.retain(|p| in_bounds(p.pos));
}

/// Energy clock and level progression, after collisions have settled
fn advance_progression(state: &mut GameState, dt: f32) {
    if state.run.game_over {
        return;
    }

    // One energy unit per real second
    state.run.energy -= dt / 60.0;
    if state.run.energy <= 0.0 {
        state.run.energy = 0.0;
        state.trigger_game_over();
        return;
    }

    if state.run.gems_collected >= state.run.gems_required {
        level_up(state);
    }
}

fn level_up(state: &mut GameState) {
    if state.run.level >= MAX_LEVEL {
        // Clearing the final level wins the run; same terminal event
        state.trigger_game_over();
        return;
    }

    state.run.level += 1;
    state.run.gems_collected = 0;
    state.run.gems_required = RunState::quota_for(state.run.level);
    state.run.energy = INITIAL_ENERGY;
    state.run.transition_frames = TRANSITION_FRAMES;
    state.store.clear_combat();
    state.push_sound(SoundCue::LevelUp);
    log::info!(
        "level up -> {} (quota {})",
        state.run.level,
        state.run.gems_required
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, GameEvent, Gem, GemKind, PowerUp, PowerUpKind};

    /// 100 ms steps land exactly on the delta clamp, so each tick advances
    /// the sim by 6 frames
    const STEP_MS: f64 = 100.0;

    fn started_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start();
        state.drain_events();
        state
    }

    /// Keep the field empty so a scenario only exercises the paths it means
    /// to: an unbounded transition window suppresses all spawning.
    fn suppress_spawning(state: &mut GameState) {
        state.run.transition_frames = f32::INFINITY;
    }

    fn make_enemy(pos: Vec2, kind: EnemyKind, health: u8) -> Enemy {
        Enemy {
            pos,
            vel: Vec2::new(0.0, 2.0),
            size: Vec2::new(56.0, 56.0),
            kind,
            health,
            fire_cooldown: 0.0,
            phase: 0.0,
        }
    }

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut state = GameState::new(1);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);
        tick(&mut state, &input, 100.0);
        assert_eq!(state.ticks, 0);
        assert!(state.last_tick_ms.is_none());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();

        tick(&mut state, &input, 5000.0);
        assert_eq!(state.run.energy, INITIAL_ENERGY);
        assert_eq!(state.last_tick_ms, Some(5000.0));

        // Second tick sees real elapsed time, clamped
        tick(&mut state, &input, 5000.0 + STEP_MS);
        assert!(state.run.energy < INITIAL_ENERGY);
    }

    #[test]
    fn test_delta_clamp_limits_suspend_jumps() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();

        tick(&mut state, &input, 0.0);
        // A 10-second gap (tab suspend) must cost at most MAX_DELTA_MS
        tick(&mut state, &input, 10_000.0);
        let max_drain = (MAX_DELTA_MS / FRAME_MS / 60.0) as f32;
        assert!(state.run.energy >= INITIAL_ENERGY - max_drain - 1e-4);
    }

    #[test]
    fn test_energy_depletes_to_single_game_over() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();

        let mut game_overs = Vec::new();
        let mut t = 0.0;
        // 30 energy at 0.1/tick: well past depletion
        for _ in 0..320 {
            tick(&mut state, &input, t);
            t += STEP_MS;
            game_overs.extend(
                state
                    .drain_events()
                    .into_iter()
                    .filter(|e| matches!(e, GameEvent::GameOver { .. })),
            );
        }

        assert!(state.run.game_over);
        assert_eq!(state.run.energy, 0.0);
        assert_eq!(game_overs, vec![GameEvent::GameOver { score: 0, level: 1 }]);
    }

    #[test]
    fn test_energy_never_increases_without_pickups() {
        let mut state = started_state(3);
        suppress_spawning(&mut state);
        let input = PointerInput::default();

        let mut t = 0.0;
        let mut prev = state.run.energy;
        for _ in 0..100 {
            tick(&mut state, &input, t);
            t += STEP_MS;
            assert!(state.run.energy <= prev);
            assert!(state.run.energy >= 0.0);
            prev = state.run.energy;
        }
    }

    #[test]
    fn test_basic_play_three_gems_levels_up() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        assert_eq!(state.run.gems_required, 3);
        let mut t = STEP_MS;
        for i in 0..3 {
            let ship_pos = state.store.ship.pos;
            state.store.gems.push(Gem {
                pos: ship_pos,
                vel: Vec2::ZERO,
                kind: GemKind::Score,
            });
            tick(&mut state, &input, t);
            t += STEP_MS;

            if i < 2 {
                assert_eq!(state.run.level, 1);
                assert_eq!(state.run.gems_collected, i + 1);
            }
        }

        assert_eq!(state.run.level, 2);
        assert_eq!(state.run.gems_collected, 0);
        assert_eq!(state.run.gems_required, 4);
        assert_eq!(state.run.energy, INITIAL_ENERGY);
        assert!(state.store.enemies.is_empty());
        assert!(state.store.gems.is_empty());
        assert!(state.store.player_shots.is_empty());
        assert!(state.store.enemy_shots.is_empty());
        assert!(state.run.in_transition());
        assert_eq!(state.run.score, 3 * GEM_SCORE);
    }

    #[test]
    fn test_level_up_fires_exactly_once_per_quota() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        // Overshoot the quota within one tick: still a single level-up
        state.run.gems_collected = state.run.gems_required + 2;
        tick(&mut state, &input, STEP_MS);
        assert_eq!(state.run.level, 2);
        tick(&mut state, &input, STEP_MS * 2.0);
        assert_eq!(state.run.level, 2);
    }

    #[test]
    fn test_energy_gem_restores_capped() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        state.run.energy = 5.0;
        state.store.gems.push(Gem {
            pos: state.store.ship.pos,
            vel: Vec2::ZERO,
            kind: GemKind::Energy,
        });
        tick(&mut state, &input, STEP_MS);
        let expected = 5.0 + ENERGY_GEM_RESTORE - STEP_MS as f32 / FRAME_MS as f32 / 60.0;
        assert!((state.run.energy - expected).abs() < 1e-3);
        // Energy gems never count toward the level quota
        assert_eq!(state.run.gems_collected, 0);
        assert_eq!(state.run.score, 0);
    }

    #[test]
    fn test_spread_shot_buff_expires() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let idle = PointerInput::default();
        tick(&mut state, &idle, 0.0);

        // Collect the power-up at t=100
        let ship_pos = state.store.ship.pos;
        state.store.powerups.push(PowerUp {
            pos: ship_pos,
            fall_speed: 0.0,
            anchor_x: ship_pos.x,
            phase: 0.0,
            amplitude: 0.0,
            kind: PowerUpKind::SpreadShot,
        });
        tick(&mut state, &idle, STEP_MS);
        assert!(state.store.powerups.is_empty());
        assert_eq!(
            state.store.ship.spread_until_ms,
            STEP_MS + SPREAD_SHOT_DURATION_MS
        );

        // Holding fires a fan while the buff is active
        let held = PointerInput {
            pos: Some(ship_pos),
            held: true,
        };
        tick(&mut state, &held, STEP_MS * 2.0);
        assert_eq!(state.store.player_shots.len(), SPREAD_SHOT_COUNT);
        assert!(state.store.player_shots.iter().any(|s| s.vel.x < 0.0));
        assert!(state.store.player_shots.iter().any(|s| s.vel.x > 0.0));

        // Past expiry the weapon reverts to a single straight shot
        state.store.player_shots.clear();
        let mut t = STEP_MS + SPREAD_SHOT_DURATION_MS + 1000.0;
        while state.store.player_shots.is_empty() {
            tick(&mut state, &held, t);
            t += STEP_MS;
        }
        assert_eq!(state.store.player_shots.len(), 1);
        assert_eq!(state.store.player_shots[0].vel.x, 0.0);
    }

    #[test]
    fn test_enemy_with_two_health_needs_two_hits() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        let enemy_pos = Vec2::new(200.0, 200.0);
        state
            .store
            .enemies
            .push(make_enemy(enemy_pos, EnemyKind::Zigzag, 2));

        // First hit: consumed shot, surviving enemy, no score, no burst
        state.store.player_shots.push(Projectile {
            pos: enemy_pos,
            vel: Vec2::ZERO,
        });
        collision::resolve(&mut state, 0.0);
        assert_eq!(state.store.enemies.len(), 1);
        assert_eq!(state.store.enemies[0].health, 1);
        assert!(state.store.player_shots.is_empty());
        assert_eq!(state.run.score, 0);
        assert!(state.store.particles.is_empty());

        // Second hit: removal, score, one particle burst
        state.store.player_shots.push(Projectile {
            pos: state.store.enemies[0].pos,
            vel: Vec2::ZERO,
        });
        collision::resolve(&mut state, 0.0);
        assert!(state.store.enemies.is_empty());
        assert_eq!(state.run.score, EnemyKind::Zigzag.score());
        assert_eq!(
            state.store.particles.len(),
            state.particles_cfg.burst.min(state.particles_cfg.max)
        );
    }

    #[test]
    fn test_lethal_contact_is_idempotent_game_over() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);
        state.drain_events();

        // Both an enemy and an enemy shot sit on the ship this tick
        let ship_pos = state.store.ship.pos;
        state
            .store
            .enemies
            .push(make_enemy(ship_pos, EnemyKind::Basic, 1));
        state.store.enemy_shots.push(Projectile {
            pos: ship_pos,
            vel: Vec2::ZERO,
        });

        tick(&mut state, &input, STEP_MS);
        assert!(state.run.game_over);
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);

        // Frozen afterwards: no more ticks, no more events
        let ticks = state.ticks;
        tick(&mut state, &input, STEP_MS * 2.0);
        tick(&mut state, &input, STEP_MS * 3.0);
        assert_eq!(state.ticks, ticks);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_win_past_max_level_ends_run() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);
        state.drain_events();

        state.run.level = MAX_LEVEL;
        state.run.gems_required = RunState::quota_for(MAX_LEVEL);
        state.run.gems_collected = state.run.gems_required;
        tick(&mut state, &input, STEP_MS);

        assert!(state.run.game_over);
        assert_eq!(state.run.level, MAX_LEVEL);
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_capacity_blocks_player_fire() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        for i in 0..MAX_OBJECTS {
            state.store.enemy_shots.push(Projectile {
                pos: Vec2::new(10.0 + i as f32, 10.0),
                vel: Vec2::ZERO,
            });
        }
        let held = PointerInput {
            pos: Some(state.store.ship.pos),
            held: true,
        };
        tick(&mut state, &held, STEP_MS);
        assert!(state.store.player_shots.is_empty());
        assert!(state.store.object_count() <= MAX_OBJECTS);
    }

    #[test]
    fn test_capacity_invariant_through_full_ticks() {
        let mut state = started_state(99);
        let mut input = PointerInput {
            pos: Some(Vec2::new(360.0, 900.0)),
            held: true,
        };
        state.run.level = 60; // fastest spawn rates

        let mut t = 0.0;
        for i in 0..600 {
            input.pos = Some(Vec2::new(100.0 + (i % 400) as f32, 900.0));
            tick(&mut state, &input, t);
            t += STEP_MS;
            assert!(state.store.object_count() <= MAX_OBJECTS);
            if state.run.game_over {
                break;
            }
        }
    }

    #[test]
    fn test_out_of_bounds_entities_are_removed() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        state
            .store
            .enemies
            .push(make_enemy(Vec2::new(360.0, FIELD_H + CULL_MARGIN + 1.0), EnemyKind::Basic, 1));
        state.store.player_shots.push(Projectile {
            pos: Vec2::new(360.0, -CULL_MARGIN - 1.0),
            vel: Vec2::ZERO,
        });
        tick(&mut state, &input, STEP_MS);
        assert!(state.store.enemies.is_empty());
        assert!(state.store.player_shots.is_empty());
    }

    #[test]
    fn test_pointer_outside_field_is_clamped() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput {
            pos: Some(Vec2::new(-500.0, 50.0)),
            held: true,
        };
        tick(&mut state, &input, 0.0);
        assert_eq!(state.store.ship.pos.x, SHIP_MIN_X);
        assert_eq!(state.store.ship.pos.y, SHIP_MIN_Y);
    }

    #[test]
    fn test_zigzag_weaves_laterally() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        let mut enemy = make_enemy(Vec2::new(360.0, 100.0), EnemyKind::Zigzag, 2);
        enemy.phase = std::f32::consts::FRAC_PI_2; // sin = 1, maximum drift
        state.store.enemies.push(enemy);

        tick(&mut state, &input, STEP_MS);
        let e = &state.store.enemies[0];
        assert!(e.pos.x != 360.0);
        assert!(e.pos.y > 100.0);
    }

    #[test]
    fn test_shooter_volley_aims_at_ship() {
        let mut state = started_state(1);
        suppress_spawning(&mut state);
        let input = PointerInput::default();
        tick(&mut state, &input, 0.0);

        let mut enemy = make_enemy(Vec2::new(360.0, 100.0), EnemyKind::TriShooter, 3);
        enemy.fire_cooldown = 0.0;
        state.store.enemies.push(enemy);

        tick(&mut state, &input, STEP_MS);
        assert_eq!(state.store.enemy_shots.len(), 3);
        // Ship sits below the shooter, so every shot heads downward
        assert!(state.store.enemy_shots.iter().all(|s| s.vel.y > 0.0));
        // The fan spreads horizontally
        assert!(state.store.enemy_shots.iter().any(|s| s.vel.x < 0.0));
        assert!(state.store.enemy_shots.iter().any(|s| s.vel.x > 0.0));
    }
}
