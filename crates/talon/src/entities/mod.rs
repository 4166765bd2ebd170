//! The Talon entity lifecycle and update system
//!
//! Entities live in a fixed-capacity [`EntityPool`]; what an entity *is* is
//! entirely a function of its [`EntityCaps`] bitmask, tested every frame by
//! the update pass table in [`update`]. There is no nested state machine:
//! a slot is either free (empty mask) or alive, and behavioral variation is
//! capability bits all the way down.

use bitflags::bitflags;
use glam::{Mat4, Vec3};
use talon_utils::{color::RGBA8, SmallStr};

#[doc(inline)]
pub use pool::*;
mod pool;

pub mod update;

pub mod snapshot;

/// Longest entity name kept at spawn time; longer names are truncated.
pub const NAME_MAX: usize = 31;

/// Lifetime sentinel meaning "never expires".
///
/// Kept as `0.0` rather than an `Option` so a zeroed entity record is a
/// valid immortal one.
pub const FOREVER: f64 = 0.0;

bitflags! {
    /// Independent boolean traits attached to an entity. Each bit opts the
    /// entity into one of the per-frame update passes; an empty mask marks
    /// a free pool slot.
    pub struct EntityCaps: u32 {
        const MOVER       = 1 << 0;
        const SHOOTER     = 1 << 1;
        const DESTROYABLE = 1 << 2;
        const COLLIDER    = 1 << 3;
        const SATELLITE   = 1 << 4;
        const BULLET      = 1 << 5;
        const PLAYER      = 1 << 6;
        const RENDERABLE  = 1 << 7;
        const ENEMY       = 1 << 8;
        const CAMERA      = 1 << 9;
    }
}

impl Default for EntityCaps {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Auxiliary per-entity state bits, maintained by the update passes.
    pub struct EntityFlags: u32 {
        /// Set while the collider pass holds the entity on the ground plane.
        const GROUNDED = 1 << 0;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single entity record. Fixed-size, owned by the pool; references
/// returned by pool lookups are only valid until the next pool mutation.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Slot identity. Equals the entity's position in the pool array and is
    /// stable for the entity's lifetime.
    pub index: u32,
    pub name: SmallStr,
    pub caps: EntityCaps,
    pub flags: EntityFlags,

    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Spawn origin; satellites orbit around it.
    pub home: Vec3,

    pub color: RGBA8,
    /// Per-frame render color (expiry fade applied); the renderer reads
    /// this, never `color`.
    pub render_color: RGBA8,
    /// Bounding sphere radius.
    pub radius: f32,
    pub angle: f32,
    /// Shooter fire timer, seconds until the next shot.
    pub cooldown: f32,

    /// Pool time at which the entity was spawned.
    pub spawned_at: f64,
    /// Seconds until expiry, or [`FOREVER`].
    pub lifetime: f64,

    /// Cached render transform, refreshed by the renderable pass.
    pub transform: Mat4,
}

impl Entity {
    pub(crate) fn free(index: u32) -> Self {
        Self {
            index,
            name: SmallStr::new(),
            caps: EntityCaps::empty(),
            flags: EntityFlags::empty(),
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            home: Vec3::ZERO,
            color: RGBA8::WHITE,
            render_color: RGBA8::WHITE,
            radius: 0.0,
            angle: 0.0,
            cooldown: 0.0,
            spawned_at: 0.0,
            lifetime: FOREVER,
            transform: Mat4::IDENTITY,
        }
    }

    /// Clears everything but the slot identity, returning the slot to the
    /// free pool.
    pub(crate) fn reset(&mut self) {
        *self = Self::free(self.index);
    }

    /// Whether the slot holds a live entity.
    pub fn is_alive(&self) -> bool {
        !self.caps.is_empty()
    }

    /// Absolute expiry time, or `None` for immortal entities.
    pub fn expires_at(&self) -> Option<f64> {
        (self.lifetime != FOREVER).then(|| self.spawned_at + self.lifetime)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        match self.expires_at() {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}
