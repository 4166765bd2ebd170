use log::*;
use talon_utils::AssocMap;

/// Hash seed for the resource name map, so resource hashes don't collide
/// with other FNV-1a users by construction.
const RESOURCE_SEED: u32 = 0x7A10;

/// An opaque ticket for something an asset system loaded. The engine core
/// has no idea what it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u64);

/// Maps resource names to opaque handles.
///
/// This is the engine-level consumer of [`AssocMap`]: a small registry that
/// asset and UI code query by name a handful of times per frame. Thanks to
/// the map's first-insert-wins lookup, re-registering an existing name hands
/// back the original handle instead of minting a shadowed duplicate.
#[derive(Debug)]
pub struct ResourceRegistry {
    map: AssocMap<ResourceHandle>,
    next_handle: u64,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            map: AssocMap::with_seed(RESOURCE_SEED),
            next_handle: 1,
        }
    }

    /// Returns the handle registered under `name`, minting a fresh one for
    /// names seen for the first time.
    pub fn register(&mut self, name: &str) -> ResourceHandle {
        if let Some(&existing) = self.map.get(name.as_bytes()) {
            return existing;
        }
        let handle = ResourceHandle(self.next_handle);
        self.next_handle += 1;
        self.map.insert(name.as_bytes(), handle);
        trace!("registered resource `{name}` as {handle:?}");
        handle
    }

    pub fn lookup(&self, name: &str) -> Option<ResourceHandle> {
        self.map.get(name.as_bytes()).copied()
    }

    /// Forgets a name. Returns whether anything was registered under it.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.map.remove(name.as_bytes()) > 0
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut registry = ResourceRegistry::new();
        let mesh = registry.register("models/walker");
        let texture = registry.register("textures/walker_diffuse");

        assert_ne!(mesh, texture);
        assert_eq!(registry.lookup("models/walker"), Some(mesh));
        assert_eq!(registry.lookup("models/ghost"), None);
    }

    #[test]
    fn reregistering_returns_the_original_handle() {
        let mut registry = ResourceRegistry::new();
        let first = registry.register("sounds/step");
        let second = registry.register("sounds/step");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_frees_the_name() {
        let mut registry = ResourceRegistry::new();
        let old = registry.register("shaders/sky");
        assert!(registry.unregister("shaders/sky"));
        assert!(!registry.unregister("shaders/sky"));

        let new = registry.register("shaders/sky");
        assert_ne!(old, new);
        assert_eq!(registry.lookup("shaders/sky"), Some(new));
    }
}
