use super::{Entity, EntityCaps, NAME_MAX};
use glam::Vec3;
use log::*;
use talon_utils::color::RGBA8;
use thiserror::Error;

/// Pool capacity used when the embedder doesn't specify one.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Every slot is occupied. This is a normal, per-frame condition — the
    /// caller is expected to drop or retry the spawn, not to treat it as
    /// fatal.
    #[error("the entity pool is full")]
    Full,
    #[error("entity pool capacity must be nonzero")]
    ZeroCapacity,
    #[error("cannot spawn an entity with an empty capability mask")]
    NoCaps,
}

/// Parameters for [`EntityPool::spawn`]. Everything not listed here
/// (velocity, cooldowns, flags) starts zeroed and is the caller's to set on
/// the returned entity.
#[derive(Debug, Clone, Copy)]
pub struct SpawnParams<'a> {
    pub name: &'a str,
    pub origin: Vec3,
    pub caps: EntityCaps,
    /// Seconds until expiry, or [`super::FOREVER`].
    pub lifetime: f64,
    pub color: RGBA8,
    pub radius: f32,
    pub angle: f32,
}

impl Default for SpawnParams<'_> {
    fn default() -> Self {
        Self {
            name: "",
            origin: Vec3::ZERO,
            caps: EntityCaps::empty(),
            lifetime: super::FOREVER,
            color: RGBA8::WHITE,
            radius: 0.5,
            angle: 0.0,
        }
    }
}

/// A fixed-capacity pool of entity slots.
///
/// Slots are allocated by scanning for the first free one (empty capability
/// mask) and returned by clearing the mask; no entity is ever individually
/// heap-allocated. The live-entity count and the most recent spawn are pool
/// state, owned here rather than living in process-wide globals.
#[derive(Debug, Clone)]
pub struct EntityPool {
    pub(crate) slots: Vec<Entity>,
    pub(crate) live: u32,
    last_spawned: Option<u32>,
}

impl EntityPool {
    /// Allocates a pool of `capacity` zeroed slots.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        Ok(Self {
            slots: (0..capacity as u32).map(Entity::free).collect(),
            live: 0,
            last_spawned: None,
        })
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY).expect("default capacity is nonzero")
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live as usize
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Index of the most recently spawned entity, if any spawn happened.
    pub fn last_spawned(&self) -> Option<u32> {
        self.last_spawned
    }

    /// Claims the first free slot and initializes it from `params`, with
    /// `now` recorded as the spawn timestamp. The returned borrow is valid
    /// until the next pool mutation.
    ///
    /// The name is truncated to [`NAME_MAX`] bytes.
    pub fn spawn(&mut self, now: f64, params: SpawnParams) -> Result<&mut Entity, PoolError> {
        if params.caps.is_empty() {
            return Err(PoolError::NoCaps);
        }
        let index = self
            .slots
            .iter()
            .position(|slot| !slot.is_alive())
            .ok_or(PoolError::Full)? as u32;

        let entity = &mut self.slots[index as usize];
        entity.name.copy_from_truncated(params.name, NAME_MAX);
        entity.caps = params.caps;
        entity.position = params.origin;
        entity.home = params.origin;
        entity.color = params.color;
        entity.render_color = params.color;
        entity.radius = params.radius;
        entity.angle = params.angle;
        entity.lifetime = params.lifetime;
        entity.spawned_at = now;

        self.live += 1;
        self.last_spawned = Some(index);
        trace!("spawned #{index} `{}`", self.slots[index as usize].name);
        Ok(&mut self.slots[index as usize])
    }

    /// Returns the slot to the free pool, zeroing its mutable state.
    /// Idempotent: despawning a free slot or an out-of-range index is a
    /// no-op.
    pub fn despawn(&mut self, index: u32) {
        let Some(entity) = self.slots.get_mut(index as usize) else {
            return;
        };
        if !entity.is_alive() {
            return;
        }
        trace!("despawning #{index} `{}`", entity.name);
        entity.reset();
        self.live -= 1;
    }

    /// Direct slot access; `None` for free slots and out-of-range indices.
    pub fn find_by_index(&self, index: u32) -> Option<&Entity> {
        self.slots.get(index as usize).filter(|e| e.is_alive())
    }

    pub fn find_by_index_mut(&mut self, index: u32) -> Option<&mut Entity> {
        self.slots
            .get_mut(index as usize)
            .filter(|e| e.is_alive())
    }

    /// Linear scan for the first live entity with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.iter().find(|e| e.name == name)
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.slots
            .iter_mut()
            .find(|e| e.is_alive() && e.name == name)
    }

    /// Iterates live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|e| e.is_alive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FOREVER;

    fn mover(name: &str) -> SpawnParams {
        SpawnParams {
            name,
            caps: EntityCaps::MOVER,
            ..Default::default()
        }
    }

    #[test]
    fn spawn_fills_slots_in_order() {
        let mut pool = EntityPool::new(4).unwrap();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            let e = pool.spawn(0.0, mover(name)).unwrap();
            assert_eq!(e.index, i as u32);
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.last_spawned(), Some(2));
    }

    #[test]
    fn full_pool_rejects_spawn_and_reuses_freed_slot() {
        // The canonical lifecycle scenario: fill a 4-slot pool, overflow,
        // free the second slot, watch it get reused.
        let mut pool = EntityPool::new(4).unwrap();
        for name in ["a", "b", "c", "d"] {
            pool.spawn(0.0, mover(name)).unwrap();
        }

        assert_eq!(pool.spawn(0.0, mover("overflow")).unwrap_err(), PoolError::Full);
        assert_eq!(pool.len(), 4);

        let b = pool.find_by_name("b").unwrap().index;
        pool.despawn(b);
        assert_eq!(pool.len(), 3);

        let e = pool.spawn(0.0, mover("e")).unwrap();
        assert_eq!(e.index, b);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn despawn_is_idempotent() {
        let mut pool = EntityPool::new(2).unwrap();
        let index = pool.spawn(0.0, mover("once")).unwrap().index;

        pool.despawn(index);
        pool.despawn(index);
        pool.despawn(999); // out of range, also a no-op
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn index_is_stable_while_alive() {
        let mut pool = EntityPool::new(8).unwrap();
        let index = pool.spawn(0.0, mover("stable")).unwrap().index;

        for _ in 0..32 {
            pool.update(1.0, 1.0 / 60.0);
        }
        let found = pool.find_by_index(index).unwrap();
        assert_eq!(found.index, index);
        assert_eq!(found.name, "stable");
    }

    #[test]
    fn lookups_return_none_when_absent() {
        let pool = EntityPool::new(4).unwrap();
        assert!(pool.find_by_index(0).is_none());
        assert!(pool.find_by_index(100).is_none());
        assert!(pool.find_by_name("ghost").is_none());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(EntityPool::new(0).unwrap_err(), PoolError::ZeroCapacity);
    }

    #[test]
    fn empty_caps_spawn_is_rejected() {
        let mut pool = EntityPool::new(4).unwrap();
        let params = SpawnParams {
            name: "capless",
            ..Default::default()
        };
        assert_eq!(pool.spawn(0.0, params).unwrap_err(), PoolError::NoCaps);
        assert!(pool.is_empty());
    }

    #[test]
    fn long_names_are_truncated() {
        let mut pool = EntityPool::new(1).unwrap();
        let long = "x".repeat(NAME_MAX + 20);
        let e = pool.spawn(0.0, mover(&long)).unwrap();
        assert_eq!(e.name.len(), NAME_MAX);
    }

    #[test]
    fn immortal_entities_never_expire() {
        let mut pool = EntityPool::new(1).unwrap();
        let params = SpawnParams {
            lifetime: FOREVER,
            ..mover("eternal")
        };
        pool.spawn(0.0, params).unwrap();
        pool.update(1.0e9, 1.0 / 60.0);
        assert!(pool.find_by_name("eternal").is_some());
    }
}
