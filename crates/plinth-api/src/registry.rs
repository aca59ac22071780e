//! Static component registry.
//!
//! Components register once at startup: a name (`cmp_<nnnn>_<slug>`), a
//! UUID, and the route they serve. The dispatcher consults the name→UUID
//! map when resolving neutral routes; there is no runtime discovery.

use std::collections::HashMap;

use uuid::Uuid;

/// One registered component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntry {
    pub name: String,
    pub uuid: Uuid,
    pub route: String,
}

/// Name→component table built during startup.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    by_name: HashMap<String, ComponentEntry>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component. Last registration for a name wins.
    pub fn register(&mut self, entry: ComponentEntry) {
        self.by_name.insert(entry.name.clone(), entry);
    }

    /// Convenience registration from parts.
    pub fn register_component(&mut self, name: &str, uuid: Uuid, route: &str) {
        self.register(ComponentEntry {
            name: name.to_string(),
            uuid,
            route: route.to_string(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&ComponentEntry> {
        self.by_name.get(name)
    }

    pub fn uuid_by_name(&self, name: &str) -> Option<Uuid> {
        self.by_name.get(name).map(|entry| entry.uuid)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterate registered components in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentEntry> {
        self.by_name.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        let uuid = Uuid::new_v4();
        registry.register_component("cmp_2300_ftoken", uuid, "/component/cmp_2300_ftoken");

        assert_eq!(registry.uuid_by_name("cmp_2300_ftoken"), Some(uuid));
        assert_eq!(registry.uuid_by_name("cmp_9999_missing"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ComponentRegistry::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        registry.register_component("cmp_0100_core", first, "/component/cmp_0100_core");
        registry.register_component("cmp_0100_core", second, "/component/cmp_0100_core");
        assert_eq!(registry.uuid_by_name("cmp_0100_core"), Some(second));
    }
}
