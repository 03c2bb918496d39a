//! Runtime: registry of the Things served by one process.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use webthing_domain::error::{NotFoundError, RegistrationError, WebThingError};

use crate::config::RuntimeConfig;
use crate::context::ThingContext;
use crate::introspect::SchemaCache;
use crate::services::Services;
use crate::thing::Thing;

/// Owns every registered [`ThingContext`] and the services injected into
/// their actions.
pub struct Runtime {
    config: RuntimeConfig,
    services: Services,
    schemas: SchemaCache,
    things: RwLock<BTreeMap<String, ThingContext>>,
}

impl Runtime {
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            services: Services::new(),
            schemas: SchemaCache::new(),
            things: RwLock::new(BTreeMap::new()),
        }
    }

    /// Make `service` available to actions declaring `inject_service::<S>()`.
    #[must_use]
    pub fn with_service<S: Send + Sync + 'static>(mut self, service: Arc<S>) -> Self {
        self.services.insert(service);
        self
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Introspect `thing`, build its descriptor and tables and make it
    /// reachable under its name.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::Registration`] when the type is misdeclared or
    /// a Thing with the same name is already registered.
    #[tracing::instrument(skip_all, fields(thing = %thing.name()))]
    pub fn register<T: Thing>(&self, thing: T) -> Result<ThingContext, WebThingError> {
        let schema = self
            .schemas
            .get_or_introspect::<T>(&self.services, self.config.ignore_case)
            .inspect_err(|err| tracing::warn!(%err, "thing rejected"))?;

        let mut things = self.things.write().unwrap_or_else(PoisonError::into_inner);
        let Entry::Vacant(slot) = things.entry(thing.name()) else {
            tracing::warn!("thing name already taken");
            return Err(RegistrationError::DuplicateThing { name: thing.name() }.into());
        };
        let context = ThingContext::start(thing, &schema, &self.config, &self.services);
        slot.insert(context.clone());

        tracing::info!(href = context.href(), "thing registered");
        Ok(context)
    }

    /// Remove Thing `name`, cancelling its actions and closing its subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] when no Thing has that name.
    pub fn unregister(&self, name: &str) -> Result<(), WebThingError> {
        let removed = self
            .things
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .ok_or_else(|| NotFoundError::new("Thing", name))?;
        removed.close();
        tracing::info!(thing = name, "thing unregistered");
        Ok(())
    }

    /// Look up Thing `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no Thing has that name.
    pub fn get(&self, name: &str) -> Result<ThingContext, NotFoundError> {
        self.things
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| NotFoundError::new("Thing", name))
    }

    /// Every registered Thing, ordered by name.
    #[must_use]
    pub fn things(&self) -> Vec<ThingContext> {
        self.things
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Close every Thing. They stay registered but run nothing more.
    pub fn shutdown(&self) {
        let things = self.things();
        for thing in &things {
            thing.close();
        }
        tracing::info!(count = things.len(), "runtime shut down");
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("services", &self.services)
            .field("things", &self.things().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    use crate::action_table::ActionInvocation;
    use crate::thing::Members;

    struct Clock {
        name: &'static str,
    }

    impl Thing for Clock {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn declare(members: &mut Members<Self>) {
            members.property("label", |c: &Clock| c.name.to_string());
        }
    }

    struct Ledger {
        entries: Vec<String>,
    }

    struct Archiver;

    impl Thing for Archiver {
        fn name(&self) -> String {
            "archiver".to_string()
        }

        fn declare(members: &mut Members<Self>) {
            members
                .action("archive", |invocation: ActionInvocation<Archiver>| async move {
                    let ledger = invocation.service::<std::sync::Mutex<Ledger>>()?;
                    ledger
                        .lock()
                        .map_err(|_| webthing_domain::error::ActionFault::failed("ledger poisoned"))?
                        .entries
                        .push("archived".to_string());
                    Ok(())
                })
                .inject_service::<std::sync::Mutex<Ledger>>();
        }
    }

    struct Empty;

    impl Thing for Empty {
        fn name(&self) -> String {
            "empty".to_string()
        }

        fn declare(_members: &mut Members<Self>) {}
    }

    #[tokio::test]
    async fn should_register_and_list_things_by_name() {
        let runtime = Runtime::new(RuntimeConfig::default());
        runtime.register(Clock { name: "kitchen" }).unwrap();
        runtime.register(Clock { name: "hall" }).unwrap();

        let names: Vec<String> = runtime
            .things()
            .iter()
            .map(|thing| thing.name().to_string())
            .collect();
        assert_eq!(names, vec!["hall", "kitchen"]);
        assert_eq!(runtime.get("hall").unwrap().href(), "/things/hall");
    }

    #[tokio::test]
    async fn should_reject_duplicate_thing_name() {
        let runtime = Runtime::new(RuntimeConfig::default());
        runtime.register(Clock { name: "kitchen" }).unwrap();
        assert!(matches!(
            runtime.register(Clock { name: "kitchen" }),
            Err(WebThingError::Registration(RegistrationError::DuplicateThing { .. }))
        ));
    }

    #[tokio::test]
    async fn should_reject_thing_without_members() {
        let runtime = Runtime::new(RuntimeConfig::default());
        assert!(matches!(
            runtime.register(Empty),
            Err(WebThingError::Registration(RegistrationError::NoMembers { .. }))
        ));
        assert!(runtime.get("empty").is_err());
    }

    #[tokio::test]
    async fn should_require_injected_services_at_registration() {
        let bare = Runtime::new(RuntimeConfig::default());
        assert!(matches!(
            bare.register(Archiver),
            Err(WebThingError::Registration(RegistrationError::MissingService { .. }))
        ));

        let ledger = Arc::new(std::sync::Mutex::new(Ledger {
            entries: Vec::new(),
        }));
        let runtime = Runtime::new(RuntimeConfig::default()).with_service(Arc::clone(&ledger));
        let archiver = runtime.register(Archiver).unwrap();
        archiver.request_action("archive", &Map::new()).await.unwrap();

        for _ in 0..100 {
            if !ledger.lock().unwrap().entries.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(ledger.lock().unwrap().entries, vec!["archived"]);
    }

    #[tokio::test]
    async fn should_unregister_and_close_subscribers() {
        let runtime = Runtime::new(RuntimeConfig::default());
        let clock = runtime.register(Clock { name: "kitchen" }).unwrap();
        let mut sub = clock.attach();

        runtime.unregister("kitchen").unwrap();
        assert!(runtime.get("kitchen").is_err());
        assert!(sub.receiver.recv().await.is_none());
        assert!(matches!(
            runtime.unregister("kitchen"),
            Err(WebThingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_prefix_hrefs_with_base_path() {
        let runtime = Runtime::new(RuntimeConfig {
            base_path: "/api/things/".to_string(),
            ..RuntimeConfig::default()
        });
        let clock = runtime.register(Clock { name: "hall" }).unwrap();
        assert_eq!(clock.descriptor()["id"], json!("/api/things/hall"));
        assert_eq!(
            clock.descriptor()["properties"]["label"]["links"][0]["href"],
            "/api/things/hall/properties/label"
        );
    }
}
