//! Dependency metadata.
//!
//! The container never inspects types itself. It asks a
//! [`MetadataProvider`] which types a constructor depends on and whether a
//! type may be injected into others. Whether a type may be registered as a
//! constructible target is not a runtime question: it must implement
//! [`Injectable`].
//!
//! Two providers ship with the crate:
//! - [`Declarations`]: process-wide, read-only metadata collected at link
//!   time from `#[derive(Injectable)]`, [`declare!`](crate::declare) and
//!   [`injectable!`](crate::injectable)
//! - [`Catalog`]: per-container metadata recorded at registration time,
//!   layered over a fallback provider (by default [`Declarations`])

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::injectable::Injectable;
use crate::key::TypeKey;

/// Source of dependency metadata.
pub trait MetadataProvider: Send + Sync {
    /// Declared constructor dependencies of `key`, in argument order.
    /// `None` when nothing is known about the type.
    fn dependency_types(&self, key: &TypeKey) -> Option<Vec<TypeKey>>;

    /// Whether `key` may be injected as a dependency of another type.
    fn is_injectable(&self, key: &TypeKey) -> bool;

    /// Full metadata record, when the provider has one.
    fn type_info(&self, key: &TypeKey) -> Option<TypeInfo>;
}

/// Metadata known about one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub key: TypeKey,
    pub dependencies: Vec<TypeKey>,
    pub injectable: bool,
}

impl TypeInfo {
    /// Metadata of an [`Injectable`] type.
    pub fn of<T: Injectable>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            dependencies: T::dependencies(),
            injectable: T::INJECTABLE,
        }
    }
}

/// A link-time metadata declaration.
///
/// Built in const context, so it holds function pointers instead of
/// values. Submitted with `inventory::submit!` by the derive macro,
/// [`declare!`](crate::declare) and [`injectable!`](crate::injectable).
pub struct Declaration {
    key: fn() -> TypeKey,
    dependencies: fn() -> Vec<TypeKey>,
    injectable: bool,
}

impl Declaration {
    /// Declares an [`Injectable`] type.
    pub const fn of<T: Injectable>() -> Self {
        Self {
            key: TypeKey::of::<T>,
            dependencies: T::dependencies,
            injectable: T::INJECTABLE,
        }
    }

    /// Declares a type injectable without making it constructible.
    pub const fn marker(key: fn() -> TypeKey) -> Self {
        Self {
            key,
            dependencies: Vec::new,
            injectable: true,
        }
    }

    pub fn info(&self) -> TypeInfo {
        TypeInfo {
            key: (self.key)(),
            dependencies: (self.dependencies)(),
            injectable: self.injectable,
        }
    }
}

inventory::collect!(Declaration);

/// Metadata from every [`Declaration`] linked into the binary.
///
/// When a type is declared twice (derived, then marked), it is injectable
/// if any declaration says so, and the non-empty dependency list wins.
#[derive(Debug, Default)]
pub struct Declarations {
    types: HashMap<TypeKey, TypeInfo>,
}

static GLOBAL: Lazy<Arc<Declarations>> = Lazy::new(|| Arc::new(Declarations::collect()));

impl Declarations {
    /// Collects all submitted declarations.
    pub fn collect() -> Self {
        let mut types: HashMap<TypeKey, TypeInfo> = HashMap::new();

        for declaration in inventory::iter::<Declaration> {
            let info = declaration.info();
            match types.get_mut(&info.key) {
                Some(existing) => {
                    existing.injectable |= info.injectable;
                    if existing.dependencies.is_empty() {
                        existing.dependencies = info.dependencies;
                    }
                }
                None => {
                    types.insert(info.key, info);
                }
            }
        }

        debug!(declared = types.len(), "Collected type declarations");
        Self { types }
    }

    /// The process-wide declarations, collected once.
    pub fn global() -> Arc<Declarations> {
        GLOBAL.clone()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl MetadataProvider for Declarations {
    fn dependency_types(&self, key: &TypeKey) -> Option<Vec<TypeKey>> {
        self.types.get(key).map(|info| info.dependencies.clone())
    }

    fn is_injectable(&self, key: &TypeKey) -> bool {
        self.types.get(key).is_some_and(|info| info.injectable)
    }

    fn type_info(&self, key: &TypeKey) -> Option<TypeInfo> {
        self.types.get(key).cloned()
    }
}

/// Per-container metadata: what was recorded at registration time, then
/// whatever the fallback provider knows.
pub struct Catalog {
    recorded: DashMap<TypeKey, TypeInfo>,
    fallback: Arc<dyn MetadataProvider>,
}

impl Catalog {
    pub fn new(fallback: Arc<dyn MetadataProvider>) -> Self {
        Self {
            recorded: DashMap::new(),
            fallback,
        }
    }

    /// Records metadata for a type, replacing any earlier record.
    pub fn record(&self, info: TypeInfo) {
        trace!(key = %info.key, dependencies = info.dependencies.len(), "Recorded type metadata");
        self.recorded.insert(info.key, info);
    }

    /// Copies this catalog; entries recorded in `other` win.
    pub(crate) fn overlay(&self, other: &Catalog) -> Catalog {
        let merged = Catalog::new(self.fallback.clone());
        for entry in self.recorded.iter().chain(other.recorded.iter()) {
            merged.recorded.insert(*entry.key(), entry.value().clone());
        }
        merged
    }

    pub fn recorded_len(&self) -> usize {
        self.recorded.len()
    }
}

impl MetadataProvider for Catalog {
    fn dependency_types(&self, key: &TypeKey) -> Option<Vec<TypeKey>> {
        match self.recorded.get(key) {
            Some(info) => Some(info.dependencies.clone()),
            None => self.fallback.dependency_types(key),
        }
    }

    fn is_injectable(&self, key: &TypeKey) -> bool {
        match self.recorded.get(key) {
            Some(info) => info.injectable || self.fallback.is_injectable(key),
            None => self.fallback.is_injectable(key),
        }
    }

    fn type_info(&self, key: &TypeKey) -> Option<TypeInfo> {
        match self.recorded.get(key) {
            Some(info) => Some(info.clone()),
            None => self.fallback.type_info(key),
        }
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("recorded", &self.recorded.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::injectable::Arguments;

    struct Engine;

    impl Injectable for Engine {
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Engine)
        }
    }

    struct Dashboard;

    impl Injectable for Dashboard {
        const INJECTABLE: bool = false;

        fn dependencies() -> Vec<TypeKey> {
            vec![TypeKey::of::<Engine>()]
        }

        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Dashboard)
        }
    }

    trait Wheel: Send + Sync {}
    struct Spare;

    crate::injectable!(dyn Wheel);
    inventory::submit! { Declaration::of::<Engine>() }

    fn empty_catalog() -> Catalog {
        Catalog::new(Arc::new(Declarations::default()))
    }

    #[test]
    fn type_info_of_injectable() {
        let info = TypeInfo::of::<Dashboard>();
        assert_eq!(info.dependencies, vec![TypeKey::of::<Engine>()]);
        assert!(!info.injectable);
    }

    #[test]
    fn marker_declarations_are_collected() {
        let declarations = Declarations::collect();
        assert!(declarations.is_injectable(&TypeKey::of::<dyn Wheel>()));
        assert_eq!(declarations.dependency_types(&TypeKey::of::<dyn Wheel>()), Some(vec![]));
    }

    #[test]
    fn derived_declarations_are_collected() {
        let declarations = Declarations::global();
        assert!(declarations.is_injectable(&TypeKey::of::<Engine>()));
        assert_eq!(declarations.dependency_types(&TypeKey::of::<Engine>()), Some(vec![]));
    }

    #[test]
    fn unknown_types_have_no_metadata() {
        let declarations = Declarations::collect();
        let key = TypeKey::of::<Spare>();
        assert_eq!(declarations.dependency_types(&key), None);
        assert!(!declarations.is_injectable(&key));
        assert!(declarations.type_info(&key).is_none());
    }

    #[test]
    fn catalog_prefers_recorded_metadata() {
        let catalog = empty_catalog();
        let key = TypeKey::of::<Dashboard>();
        assert_eq!(catalog.dependency_types(&key), None);

        catalog.record(TypeInfo::of::<Dashboard>());
        assert!(!catalog.is_injectable(&key));
        assert_eq!(catalog.dependency_types(&key), Some(vec![TypeKey::of::<Engine>()]));
    }

    #[test]
    fn catalog_falls_back_to_declarations() {
        let catalog = Catalog::new(Declarations::global());
        assert!(catalog.is_injectable(&TypeKey::of::<dyn Wheel>()));
        assert_eq!(catalog.recorded_len(), 0);
    }

    #[test]
    fn overlay_merges_recorded_entries() {
        let left = empty_catalog();
        left.record(TypeInfo::of::<Engine>());
        let right = empty_catalog();
        right.record(TypeInfo::of::<Dashboard>());

        let merged = left.overlay(&right);
        assert_eq!(merged.recorded_len(), 2);
        assert_eq!(left.recorded_len(), 1);
        assert_eq!(right.recorded_len(), 1);
    }
}
