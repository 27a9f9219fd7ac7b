//! The resolution engine shared by both container front-ends.
//!
//! [`Core`] owns the registry and the metadata catalog and drives the
//! recursive argument resolution:
//!
//! ```text
//! resolve(key)
//!   ├─ cycle / depth check against the current path
//!   ├─ registry lookup (lock released before constructing)
//!   └─ registration.resolve(args)
//!         └─ args.arguments(target)
//!               ├─ dependency_types(target)       (metadata)
//!               ├─ is_injectable(dep) for each    (all checked first)
//!               └─ resolve(key_for(dep)) for each (declared order)
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{instrument, trace, warn};
use wiring_support::rendering::suggest_similar;

use crate::error::{
    CircularDependencyError, NotInjectableError, NotRegisteredError, Result, WiringError,
};
use crate::injectable::{Constructor, Instance, downcast};
use crate::key::{Key, TypeKey};
use crate::metadata::{Catalog, MetadataProvider};
use crate::registration::{self, ArgumentResolver, Registration};
use crate::registry::{Registry, Snapshot};
use crate::scope::Scope;
use crate::settings::Settings;

const MAX_SUGGESTIONS: usize = 3;

/// How declared dependency types map onto registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyScheme {
    /// A dependency is looked up by its type identity.
    Identity,
    /// A dependency is looked up by its class name.
    Name,
}

impl KeyScheme {
    pub fn key_for(&self, ty: &TypeKey) -> Key {
        match self {
            KeyScheme::Identity => Key::Type(*ty),
            KeyScheme::Name => Key::name(ty.class_name()),
        }
    }
}

/// Registry, metadata and settings of one container.
pub(crate) struct Core {
    registry: RwLock<Registry>,
    catalog: Catalog,
    settings: Settings,
    scheme: KeyScheme,
}

impl Core {
    pub fn new(scheme: KeyScheme, settings: Settings, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            catalog: Catalog::new(metadata),
            settings,
            scheme,
        }
    }

    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn replace(&self, key: Key, registration: Arc<dyn Registration>) {
        self.registry.write().replace(key, registration);
    }

    /// Stores a class registration, replacing any earlier one, and records
    /// the constructor's metadata.
    pub fn replace_class(&self, key: Key, constructor: Constructor, scope: Scope) {
        let mut registry = self.registry.write();
        registry.replace(key, registration::class(constructor, scope));
        self.catalog.record(constructor.describe());
    }

    /// Stores a class registration under a free key. Metadata is recorded
    /// only once the key is taken, before the lock is released, so no
    /// resolve sees the registration without it.
    ///
    /// # Errors
    /// [`WiringError::AlreadyRegistered`] if the key is present.
    pub fn try_insert_class(&self, key: Key, constructor: Constructor, scope: Scope) -> Result<()> {
        let mut registry = self.registry.write();
        registry.try_insert(key, registration::class(constructor, scope))?;
        self.catalog.record(constructor.describe());
        Ok(())
    }

    pub fn remove(&self, key: &Key) -> Option<Arc<dyn Registration>> {
        self.registry.write().remove(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.registry.read().contains(key)
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.registry.read().snapshot()
    }

    /// A new core holding `self`'s entries overlaid by `other`'s.
    pub fn merge(&self, other: &Core) -> Core {
        let base = self.registry.read().clone();
        let registry = base.overlay(&other.registry.read());

        Core {
            registry: RwLock::new(registry),
            catalog: self.catalog.overlay(&other.catalog),
            settings: self.settings,
            scheme: self.scheme,
        }
    }

    /// Resolves `key` and downcasts the result.
    ///
    /// # Errors
    /// - [`WiringError::NotRegistered`]: `key` or a dependency is missing
    /// - [`WiringError::NotInjectable`]: a dependency lacks the mark
    /// - [`WiringError::CircularDependency`]: the graph has a cycle
    /// - [`WiringError::TypeMismatch`]: the value is not an `Arc<T>`
    #[instrument(level = "trace", skip(self))]
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, key: &Key) -> Result<Arc<T>> {
        let instance = Resolution::new(self).resolve(key)?;

        downcast::<T>(&instance).ok_or_else(|| WiringError::TypeMismatch {
            key: key.clone(),
            expected: type_name::<T>(),
        })
    }

    /// Builds a `NotRegistered` error with suggestions from the current keys.
    pub fn not_registered(&self, key: &Key, required_by: Option<Key>) -> WiringError {
        let labels: Vec<String> = self.registry.read().keys().iter().map(Key::label).collect();
        let available: Vec<&str> = labels.iter().map(String::as_str).collect();

        WiringError::NotRegistered(NotRegisteredError {
            requested: key.clone(),
            required_by,
            suggestions: suggest_similar(&key.label(), &available, MAX_SUGGESTIONS),
        })
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("registered", &self.len())
            .field("scheme", &self.scheme)
            .field("settings", &self.settings)
            .finish()
    }
}

/// State of one top-level resolve call: the chain of keys being resolved.
struct Resolution<'c> {
    core: &'c Core,
    path: Vec<Key>,
}

impl<'c> Resolution<'c> {
    fn new(core: &'c Core) -> Self {
        Self {
            core,
            path: Vec::new(),
        }
    }

    fn resolve(&mut self, key: &Key) -> Result<Instance> {
        if let Some(start) = self.path.iter().position(|k| k == key) {
            let mut chain = self.path[start..].to_vec();
            chain.push(key.clone());
            warn!(cycle = ?chain, "Circular dependency detected");
            return Err(WiringError::CircularDependency(CircularDependencyError { chain }));
        }

        let limit = self.core.settings.max_depth;
        if self.path.len() >= limit {
            return Err(WiringError::DepthExceeded {
                key: key.clone(),
                limit,
            });
        }

        let found = self.core.registry.read().get(key);
        let Some(registration) = found else {
            return Err(self.core.not_registered(key, self.path.last().cloned()));
        };

        trace!(key = %key, kind = ?registration.kind(), depth = self.path.len(), "Resolving");
        self.path.push(key.clone());
        let result = registration.resolve(self);
        self.path.pop();
        result
    }
}

impl ArgumentResolver for Resolution<'_> {
    fn arguments(&mut self, target: &TypeKey) -> Result<Vec<(TypeKey, Instance)>> {
        let catalog = &self.core.catalog;
        let dependencies = catalog.dependency_types(target).unwrap_or_default();

        if let Some(dependency) = dependencies.iter().find(|d| !catalog.is_injectable(d)) {
            return Err(WiringError::NotInjectable(NotInjectableError {
                key: *dependency,
                required_by: *target,
            }));
        }

        let scheme = self.core.scheme;
        dependencies
            .into_iter()
            .map(|dependency| {
                let instance = self.resolve(&scheme.key_for(&dependency))?;
                Ok((dependency, instance))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injectable::{Arguments, Injectable, into_instance};
    use crate::metadata::{Declarations, TypeInfo};
    use crate::registration::InstanceRegistration;

    struct Leaf;

    impl Injectable for Leaf {
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Leaf)
        }
    }

    struct Branch {
        leaf: Arc<Leaf>,
    }

    impl Injectable for Branch {
        fn dependencies() -> Vec<TypeKey> {
            vec![TypeKey::of::<Leaf>()]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(Branch { leaf: args.next()? })
        }
    }

    struct Ping;
    struct Pong;

    impl Injectable for Ping {
        fn dependencies() -> Vec<TypeKey> {
            vec![TypeKey::of::<Pong>()]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            args.next::<Pong>()?;
            Ok(Ping)
        }
    }

    impl Injectable for Pong {
        fn dependencies() -> Vec<TypeKey> {
            vec![TypeKey::of::<Ping>()]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            args.next::<Ping>()?;
            Ok(Pong)
        }
    }

    fn core(scheme: KeyScheme) -> Core {
        Core::new(scheme, Settings::default(), Arc::new(Declarations::default()))
    }

    fn class<T: Injectable>(core: &Core, scope: Scope) {
        let key = core.scheme().key_for(&TypeKey::of::<T>());
        core.replace_class(key, Constructor::of::<T>(), scope);
    }

    #[test]
    fn key_schemes() {
        let ty = TypeKey::of::<Leaf>();
        assert_eq!(KeyScheme::Identity.key_for(&ty), Key::of::<Leaf>());
        assert_eq!(KeyScheme::Name.key_for(&ty), Key::name("Leaf"));
    }

    #[test]
    fn resolves_dependencies_by_identity() {
        let core = core(KeyScheme::Identity);
        class::<Leaf>(&core, Scope::Singleton);
        class::<Branch>(&core, Scope::Transient);

        let a: Arc<Branch> = core.resolve(&Key::of::<Branch>()).unwrap();
        let b: Arc<Branch> = core.resolve(&Key::of::<Branch>()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a.leaf, &b.leaf));
    }

    #[test]
    fn resolves_dependencies_by_name() {
        let core = core(KeyScheme::Name);
        class::<Leaf>(&core, Scope::Transient);
        class::<Branch>(&core, Scope::Transient);

        let branch: Arc<Branch> = core.resolve(&Key::name("Branch")).unwrap();
        let _leaf: &Leaf = &branch.leaf;
    }

    #[test]
    fn missing_dependency_names_its_consumer() {
        let core = core(KeyScheme::Identity);
        class::<Branch>(&core, Scope::Transient);
        core.catalog().record(TypeInfo::of::<Leaf>());

        match core.resolve::<Branch>(&Key::of::<Branch>()).err().unwrap() {
            WiringError::NotRegistered(err) => {
                assert_eq!(err.requested, Key::of::<Leaf>());
                assert_eq!(err.required_by, Some(Key::of::<Branch>()));
            }
            other => panic!("Expected NotRegistered, got: {other:?}"),
        }
    }

    #[test]
    fn dependency_must_be_injectable() {
        let core = core(KeyScheme::Identity);
        class::<Branch>(&core, Scope::Transient);
        // Leaf is registered as a plain instance, so no metadata marks it.
        core.replace(
            Key::of::<Leaf>(),
            Arc::new(InstanceRegistration::new(into_instance(Arc::new(Leaf)))),
        );

        match core.resolve::<Branch>(&Key::of::<Branch>()).err().unwrap() {
            WiringError::NotInjectable(err) => {
                assert_eq!(err.key, TypeKey::of::<Leaf>());
                assert_eq!(err.required_by, TypeKey::of::<Branch>());
            }
            other => panic!("Expected NotInjectable, got: {other:?}"),
        }
    }

    #[test]
    fn cycle_fails_fast() {
        let core = core(KeyScheme::Identity);
        class::<Ping>(&core, Scope::Singleton);
        class::<Pong>(&core, Scope::Transient);

        match core.resolve::<Ping>(&Key::of::<Ping>()).err().unwrap() {
            WiringError::CircularDependency(err) => {
                assert_eq!(
                    err.chain,
                    vec![Key::of::<Ping>(), Key::of::<Pong>(), Key::of::<Ping>()]
                );
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
    }

    #[test]
    fn depth_limit() {
        let core = Core::new(
            KeyScheme::Identity,
            Settings::default().with_max_depth(1),
            Arc::new(Declarations::default()),
        );
        class::<Leaf>(&core, Scope::Transient);
        class::<Branch>(&core, Scope::Transient);

        assert!(core.resolve::<Leaf>(&Key::of::<Leaf>()).is_ok());
        let err = core.resolve::<Branch>(&Key::of::<Branch>()).err().unwrap();
        assert!(matches!(err, WiringError::DepthExceeded { limit: 1, .. }));
    }

    #[test]
    fn wrong_requested_type_is_a_mismatch() {
        let core = core(KeyScheme::Identity);
        class::<Leaf>(&core, Scope::Transient);

        let err = core.resolve::<Branch>(&Key::of::<Leaf>()).err().unwrap();
        assert!(matches!(err, WiringError::TypeMismatch { .. }));
    }

    #[test]
    fn merge_leaves_sources_untouched() {
        let left = core(KeyScheme::Identity);
        let right = core(KeyScheme::Identity);
        class::<Leaf>(&left, Scope::Singleton);
        class::<Branch>(&right, Scope::Transient);

        let merged = left.merge(&right);
        assert_eq!(merged.len(), 2);
        assert!(merged.resolve::<Branch>(&Key::of::<Branch>()).is_ok());
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);
    }
}
