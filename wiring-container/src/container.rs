//! # The Container: direct registration API
//!
//! Registrations are keyed by type identity. Re-registering a type
//! replaces the earlier registration, and unregistering an absent type is
//! a no-op. For name keys and the fluent binding API see
//! [`TokenContainer`](crate::token_container::TokenContainer).
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──merge()──> Container
//!                                  │
//!                               resolve::<T>()
//!                                  │
//!                                  ▼
//!                         Core (registry + catalog)
//! ```
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use wiring_container::prelude::*;
//!
//! struct UserService;
//!
//! impl Injectable for UserService {
//!     fn construct(_: &mut Arguments) -> Result<Self> {
//!         Ok(UserService)
//!     }
//! }
//!
//! struct UserController {
//!     users: Arc<UserService>,
//! }
//!
//! impl Injectable for UserController {
//!     fn dependencies() -> Vec<TypeKey> {
//!         vec![TypeKey::of::<UserService>()]
//!     }
//!
//!     fn construct(args: &mut Arguments) -> Result<Self> {
//!         Ok(UserController { users: args.next()? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_singleton::<UserService>().unwrap();
//! container.register_transient::<UserController>().unwrap();
//!
//! let a = container.resolve::<UserController>().unwrap();
//! let b = container.resolve::<UserController>().unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! assert!(Arc::ptr_eq(&a.users, &b.users));
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::error::Result;
use crate::graph::GraphValidator;
use crate::injectable::{Constructor, Implements, Injectable, into_instance};
use crate::key::Key;
use crate::metadata::{Declarations, MetadataProvider};
use crate::registration::{
    FactoryRegistration, InstanceRegistration, ProducerFn, Registration,
    SingletonFactoryRegistration,
};
use crate::registry::Snapshot;
use crate::resolver::{Core, KeyScheme};
use crate::scope::Scope;
use crate::settings::Settings;

// ============================================================
// ContainerBuilder
// ============================================================

/// Configures a [`Container`] before it is created.
///
/// # Examples
/// ```rust
/// use wiring_container::prelude::*;
///
/// let container = Container::builder().max_depth(64).build();
/// assert!(container.is_empty());
/// ```
pub struct ContainerBuilder {
    settings: Settings,
    metadata: Option<Arc<dyn MetadataProvider>>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            settings: Settings::default(),
            metadata: None,
        }
    }

    /// Limit on how deep one resolve may nest.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.settings = self.settings.with_max_depth(max_depth);
        self
    }

    /// Replaces all settings at once.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Metadata consulted for types not registered as classes in this
    /// container. Defaults to [`Declarations::global`].
    pub fn metadata(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    pub fn build(self) -> Container {
        let metadata = self
            .metadata
            .unwrap_or_else(|| Declarations::global() as Arc<dyn MetadataProvider>);
        info!(max_depth = self.settings.max_depth, "Creating container");
        Container {
            core: Core::new(KeyScheme::Identity, self.settings, metadata),
        }
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Dependency injection container keyed by type identity.
///
/// `Send + Sync`: registrations and resolves may happen from any thread.
pub struct Container {
    core: Core,
}

impl Container {
    /// Creates an empty container with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    // ── Classes ──

    /// Registers `T` to be constructed on every resolve.
    ///
    /// Re-registering replaces the earlier registration, so this never
    /// fails today. The `Result` keeps call sites uniform with
    /// [`Binding::commit`](crate::binding::Binding::commit).
    pub fn register_transient<T: Injectable>(&self) -> Result<()> {
        self.register_class(Key::of::<T>(), Constructor::of::<T>(), Scope::Transient)
    }

    /// Registers `Then` to be constructed on every resolve of `When`.
    ///
    /// ```rust,ignore
    /// container.register_transient_as::<dyn Logger, ConsoleLogger>()?;
    /// ```
    pub fn register_transient_as<When, Then>(&self) -> Result<()>
    where
        When: ?Sized + Send + Sync + 'static,
        Then: Injectable + Implements<When>,
    {
        self.register_class(
            Key::of::<When>(),
            Constructor::bound::<When, Then>(),
            Scope::Transient,
        )
    }

    /// Registers `T` to be constructed once, on first resolve.
    pub fn register_singleton<T: Injectable>(&self) -> Result<()> {
        self.register_class(Key::of::<T>(), Constructor::of::<T>(), Scope::Singleton)
    }

    /// Registers `Then` to be constructed once, on first resolve of `When`.
    pub fn register_singleton_as<When, Then>(&self) -> Result<()>
    where
        When: ?Sized + Send + Sync + 'static,
        Then: Injectable + Implements<When>,
    {
        self.register_class(
            Key::of::<When>(),
            Constructor::bound::<When, Then>(),
            Scope::Singleton,
        )
    }

    // ── Values and producers ──

    /// Registers a pre-built value. Every resolve returns the same `Arc`.
    ///
    /// ```rust,ignore
    /// container.register_instance::<Config>(Config::load());
    /// container.register_instance::<dyn Logger>(Arc::new(ConsoleLogger) as Arc<dyn Logger>);
    /// ```
    pub fn register_instance<T>(&self, value: impl Into<Arc<T>>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let registration = InstanceRegistration::new(into_instance::<T>(value.into()));
        self.overwrite(Key::of::<T>(), Arc::new(registration));
    }

    /// Registers a producer called on every resolve.
    ///
    /// Other types may depend on `T` only if `T` is declared injectable:
    /// derived, [`declare!`](crate::declare)d or
    /// [`injectable!`](crate::injectable). The same holds for instances
    /// and singleton factories.
    pub fn register_factory<T: Send + Sync + 'static>(
        &self,
        producer: impl Fn() -> T + Send + Sync + 'static,
    ) {
        let registration = FactoryRegistration::new(wrap_producer(producer));
        self.overwrite(Key::of::<T>(), Arc::new(registration));
    }

    /// Registers a producer called at most once; its result is memoised.
    pub fn register_singleton_factory<T: Send + Sync + 'static>(
        &self,
        producer: impl Fn() -> T + Send + Sync + 'static,
    ) {
        let registration = SingletonFactoryRegistration::new(wrap_producer(producer));
        self.overwrite(Key::of::<T>(), Arc::new(registration));
    }

    /// Removes the registration for `T`. Returns whether one existed;
    /// removing an absent registration is not an error.
    pub fn unregister<T: ?Sized + 'static>(&self) -> bool {
        let key = Key::of::<T>();
        let removed = self.core.remove(&key).is_some();
        if !removed {
            trace!(key = %key, "Nothing to unregister");
        }
        removed
    }

    // ── Resolution ──

    /// Resolves `T`, constructing dependencies as needed.
    ///
    /// # Errors
    /// - [`WiringError::NotRegistered`](crate::WiringError::NotRegistered)
    ///   if `T` or a dependency has no registration
    /// - [`WiringError::NotInjectable`](crate::WiringError::NotInjectable)
    ///   if a dependency lacks the injectable mark
    /// - [`WiringError::CircularDependency`](crate::WiringError::CircularDependency)
    ///   if the dependency graph loops
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.core.resolve::<T>(&Key::of::<T>())
    }

    /// Whether `T` has a registration.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.core.contains(&Key::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the current registrations.
    pub fn registry(&self) -> Snapshot {
        self.core.snapshot()
    }

    /// A new container with this container's registrations overlaid by
    /// `other`'s. Neither input changes; singletons already produced in
    /// either are shared with the result.
    pub fn merge(&self, other: &Container) -> Container {
        let merged = Container {
            core: self.core.merge(&other.core),
        };
        debug!(
            left = self.len(),
            right = other.len(),
            merged = merged.len(),
            "Merged containers"
        );
        merged
    }

    /// Checks every class registration's dependency graph without
    /// constructing anything.
    pub fn validate(&self) -> Result<()> {
        GraphValidator::new(&self.core).validate()
    }

    // ── Internal ──

    fn register_class(&self, key: Key, constructor: Constructor, scope: Scope) -> Result<()> {
        self.core.replace_class(key, constructor, scope);
        Ok(())
    }

    fn overwrite(&self, key: Key, registration: Arc<dyn Registration>) {
        self.core.replace(key, registration);
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.core.len())
            .finish()
    }
}

fn wrap_producer<T: Send + Sync + 'static>(
    producer: impl Fn() -> T + Send + Sync + 'static,
) -> ProducerFn {
    Arc::new(move || into_instance(Arc::new(producer())))
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::binding::Binding;
    pub use crate::error::{Result, WiringError};
    pub use crate::injectable::{Arguments, Implements, Injectable};
    pub use crate::key::{Key, TypeKey};
    pub use crate::scope::Scope;
    pub use crate::token::{Symbol, Token};
    pub use crate::token_container::TokenContainer;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
