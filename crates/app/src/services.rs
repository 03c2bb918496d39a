//! Services injected into action bodies, looked up by type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Entry = Arc<dyn Any + Send + Sync>;

/// Type-keyed registry of shared services. Cheap to clone.
#[derive(Clone, Default)]
pub struct Services {
    entries: Arc<HashMap<TypeId, Entry>>,
}

impl Services {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service`, replacing any previous service of the same type.
    pub fn insert<S: Send + Sync + 'static>(&mut self, service: Arc<S>) {
        Arc::make_mut(&mut self.entries).insert(TypeId::of::<S>(), service);
    }

    #[must_use]
    pub fn get<S: Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        self.entries
            .get(&TypeId::of::<S>())
            .and_then(|entry| Arc::clone(entry).downcast::<S>().ok())
    }

    #[must_use]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains_key(&type_id)
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock(u32);

    #[test]
    fn should_return_registered_service_by_type() {
        let mut services = Services::new();
        services.insert(Arc::new(Clock(7)));
        assert_eq!(services.get::<Clock>().map(|c| c.0), Some(7));
        assert!(services.contains(TypeId::of::<Clock>()));
    }

    #[test]
    fn should_return_none_when_service_missing() {
        let services = Services::new();
        assert!(services.get::<Clock>().is_none());
    }

    #[test]
    fn should_not_affect_earlier_clones_when_inserting() {
        let mut services = Services::new();
        let before = services.clone();
        services.insert(Arc::new(Clock(1)));
        assert!(before.get::<Clock>().is_none());
        assert!(services.get::<Clock>().is_some());
    }
}
