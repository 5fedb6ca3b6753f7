use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Instance = Arc<dyn Any + Send + Sync>;

// ── ServiceRegistry ─────────────────────────────────────────────────────────

/// Builder that collects service instances and produces a [`ServiceProvider`].
///
/// Services are either registered for a type, or for a type plus a key.
/// Document generation uses the document name as the key, so a transformer
/// building the `"v2"` document can receive a different instance than one
/// building `"v1"`.
///
/// ```ignore
/// let services = ServiceRegistry::new()
///     .provide(Clock::system())
///     .provide_keyed("v1", Descriptions::english())
///     .provide_keyed("v2", Descriptions::french())
///     .build();
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    unkeyed: HashMap<TypeId, (&'static str, Instance)>,
    keyed: HashMap<(TypeId, String), (&'static str, Instance)>,
}

impl ServiceRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide an instance for type `T`, replacing any previous one.
    pub fn provide<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.unkeyed
            .insert(TypeId::of::<T>(), (type_name::<T>(), Arc::new(value)));
        self
    }

    /// Provide an instance for type `T` under `key`, replacing any previous one.
    pub fn provide_keyed<T: Clone + Send + Sync + 'static>(
        mut self,
        key: impl Into<String>,
        value: T,
    ) -> Self {
        self.keyed.insert(
            (TypeId::of::<T>(), key.into()),
            (type_name::<T>(), Arc::new(value)),
        );
        self
    }

    /// Freeze the registry into a read-only provider.
    pub fn build(self) -> ServiceProvider {
        ServiceProvider {
            unkeyed: self.unkeyed,
            keyed: self.keyed,
        }
    }
}

// ── ServiceProvider ─────────────────────────────────────────────────────────

/// Read-only container of service instances, shared by every transform
/// context of a document build.
#[derive(Default)]
pub struct ServiceProvider {
    unkeyed: HashMap<TypeId, (&'static str, Instance)>,
    keyed: HashMap<(TypeId, String), (&'static str, Instance)>,
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self
            .unkeyed
            .values()
            .chain(self.keyed.values())
            .map(|(name, _)| *name)
            .collect();
        names.sort_unstable();
        f.debug_struct("ServiceProvider")
            .field("services", &names)
            .finish()
    }
}

impl ServiceProvider {
    /// A provider without any service.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Retrieve the unkeyed service of type `T`, cloning it out.
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.unkeyed
            .get(&TypeId::of::<T>())
            .and_then(|(_, v)| v.downcast_ref::<T>())
            .cloned()
    }

    /// Retrieve the service of type `T` registered under `key`.
    ///
    /// Returns `None` when no instance was registered for that exact key;
    /// unkeyed registrations are not consulted.
    pub fn get_keyed<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.keyed
            .get(&(TypeId::of::<T>(), key.to_string()))
            .and_then(|(_, v)| v.downcast_ref::<T>())
            .cloned()
    }

    /// Whether a service of type `T` is registered under `key`.
    pub fn contains_keyed<T: 'static>(&self, key: &str) -> bool {
        self.keyed
            .contains_key(&(TypeId::of::<T>(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.unkeyed.len() + self.keyed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
