//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure and host-free:
//! - Variable timestep, normalized to 60 Hz frame units
//! - Seeded RNG only (spawner owns the stream)
//! - No rendering, DOM, or audio dependencies; the host drains event and
//!   sound queues after each tick

pub mod collision;
pub mod particles;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Ellipse;
pub use spawn::Spawner;
pub use state::{
    Enemy, EnemyKind, EntityStore, GameEvent, GameState, Gem, GemKind, Particle, PointerInput,
    PowerUp, PowerUpKind, Projectile, RunState, Ship, SoundCue,
};
pub use tick::tick;
