//! The engine/application shell
//!
//! The [`Engine`] owns the entity pool, the resource registry and the frame
//! clock, and drives the per-frame simulation: each [`Engine::step`] pulls
//! `(now, dt)` from the clock and hands it to the pool's update. That is
//! the whole control flow — the core is single-threaded and synchronous by
//! design, and an embedder that wants to call into it from multiple threads
//! has to bring its own synchronization (one exclusive lock around the
//! whole engine per frame is the obvious shape).
//!
//! Graphics, audio and input backends are collaborators on the far side of
//! this interface: a renderer reads the per-entity transform and render
//! color that the update refreshed, and never gets called from here.

use crate::entities::{Entity, EntityPool, PoolError, SpawnParams};
use log::*;
use talon_utils::AnyResult;

#[doc(inline)]
pub use clock::*;
mod clock;

#[doc(inline)]
pub use resources::*;
mod resources;

/// How often [`Engine::run`] logs a liveness line.
const STATS_INTERVAL: u64 = 120;

/// Initial engine parameters.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Entity pool capacity.
    pub capacity: usize,
    /// Seconds per frame for a deterministic fixed-step run, or `None` to
    /// follow the wall clock.
    pub fixed_step: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: crate::entities::DEFAULT_CAPACITY,
            fixed_step: None,
        }
    }
}

pub struct Engine {
    pool: EntityPool,
    resources: ResourceRegistry,
    clock: FrameClock,
    frame: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> AnyResult<Self> {
        let pool = EntityPool::new(config.capacity)?;
        let clock = match config.fixed_step {
            Some(step) => FrameClock::fixed(step),
            None => FrameClock::new(),
        };
        debug!(
            "engine up: {} entity slots, {} clock",
            config.capacity,
            if clock.is_fixed() { "fixed-step" } else { "wall" },
        );
        Ok(Self {
            pool,
            resources: ResourceRegistry::new(),
            clock,
            frame: 0,
        })
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut EntityPool {
        &mut self.pool
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    /// Frames simulated so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current frame time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Spawns an entity at the current frame time. Forwards the pool's
    /// failure modes; a full pool is expected traffic, not a fault.
    pub fn spawn(&mut self, params: SpawnParams) -> Result<&mut Entity, PoolError> {
        let now = self.clock.now();
        self.pool.spawn(now, params)
    }

    /// Advances the simulation by one frame.
    pub fn step(&mut self) {
        let (now, dt) = self.clock.tick();
        self.pool.update(now, dt);
        self.frame += 1;
    }

    /// Runs a bounded headless loop of `frames` steps.
    pub fn run(&mut self, frames: u64) {
        info!(
            "simulating {frames} frames, {} entities live",
            self.pool.len()
        );
        for _ in 0..frames {
            self.step();
            if self.frame % STATS_INTERVAL == 0 {
                trace!(
                    "frame {}: t={:.2}s, {} entities live",
                    self.frame,
                    self.clock.now(),
                    self.pool.len(),
                );
            }
        }
        info!(
            "simulation done: {} frames, t={:.2}s, {} entities live",
            self.frame,
            self.clock.now(),
            self.pool.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EntityCaps, FOREVER};

    #[test]
    fn fixed_step_run_advances_time_deterministically() {
        let mut engine = Engine::new(EngineConfig {
            capacity: 16,
            fixed_step: Some(0.5),
        })
        .unwrap();

        engine
            .spawn(SpawnParams {
                name: "pilot",
                caps: EntityCaps::PLAYER | EntityCaps::MOVER,
                lifetime: FOREVER,
                ..Default::default()
            })
            .unwrap();

        engine.run(4);
        assert_eq!(engine.frame(), 4);
        assert_eq!(engine.now(), 2.0);
        assert_eq!(engine.pool().len(), 1);
    }

    #[test]
    fn spawn_timestamps_follow_the_clock() {
        let mut engine = Engine::new(EngineConfig {
            capacity: 4,
            fixed_step: Some(1.0),
        })
        .unwrap();

        engine.step();
        engine.step();
        let spawned_at = engine
            .spawn(SpawnParams {
                name: "latecomer",
                caps: EntityCaps::MOVER,
                ..Default::default()
            })
            .unwrap()
            .spawned_at;
        assert_eq!(spawned_at, 2.0);
    }
}
