//! Fluent binding builder for the token API.
//!
//! A [`Binding`] accumulates a target and a scope for one name key. Nothing
//! reaches the registry until [`Binding::commit`] is called:
//!
//! ```text
//! register(token) ──> Binding ──to()/to_self()──> Binding ──as_singleton()──> Binding
//!                                                                              │
//!                                                                         commit()
//!                                                                              │
//!                                                                              ▼
//!                                                                          registry
//! ```
//!
//! To change a committed binding, unregister the token and register it
//! again.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use tracing::warn;

use crate::error::{Result, WiringError};
use crate::injectable::{Constructor, Implements, Injectable};
use crate::key::{Key, TypeKey};
use crate::resolver::Core;
use crate::scope::Scope;

/// In-progress configuration for one name key.
///
/// Dropping a binding without committing it discards it and logs a
/// warning.
#[must_use = "a binding does nothing until `.commit()` is called"]
pub struct Binding<'c, T: ?Sized> {
    core: &'c Core,
    key: Key,
    seed: Option<Constructor>,
    target: Option<Constructor>,
    /// The target was taken from the token by `to_self`.
    self_bound: bool,
    scope: Scope,
    committed: bool,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<'c, T> Binding<'c, T>
where
    T: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn new(core: &'c Core, key: Key, seed: Option<Constructor>) -> Self {
        Self {
            core,
            key,
            seed,
            target: None,
            self_bound: false,
            scope: Scope::default(),
            committed: false,
            _marker: PhantomData,
        }
    }

    /// Binds the key to the concrete type `C`, replacing any earlier target.
    pub fn to<C: Injectable + Implements<T>>(mut self) -> Self {
        self.target = Some(Constructor::bound::<T, C>());
        self.self_bound = false;
        self
    }

    /// Binds the key to the class the token was created from.
    ///
    /// Tokens that are not constructible classes seed nothing; committing
    /// such a binding fails with [`WiringError::UnresolvedDependency`].
    /// The class must be `T` itself: use [`Binding::to`] to bind a class
    /// to an interface.
    pub fn to_self(mut self) -> Self {
        self.target = self.seed;
        self.self_bound = true;
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn as_singleton(self) -> Self {
        self.scope(Scope::Singleton)
    }

    pub fn as_transient(self) -> Self {
        self.scope(Scope::Transient)
    }

    /// The name key this binding installs.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Installs the binding in the container.
    ///
    /// # Errors
    /// - [`WiringError::UnresolvedDependency`]: no target was set
    /// - [`WiringError::TypeMismatch`]: `to_self` bound a class that is not `T`
    /// - [`WiringError::AlreadyRegistered`]: the key was registered since
    ///   this binding was created
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;

        let Some(target) = self.target else {
            return Err(WiringError::UnresolvedDependency {
                key: self.key.clone(),
            });
        };

        if self.self_bound && target.target() != TypeKey::of::<T>() {
            return Err(WiringError::TypeMismatch {
                key: Key::Type(target.target()),
                expected: type_name::<T>(),
            });
        }

        self.core
            .try_insert_class(self.key.clone(), target, self.scope)
    }
}

impl<T: ?Sized> Drop for Binding<'_, T> {
    fn drop(&mut self) {
        if !self.committed {
            warn!(key = %self.key, "Binding dropped without commit()");
        }
    }
}

impl<T: ?Sized> fmt::Debug for Binding<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("target", &self.target)
            .field("self_bound", &self.self_bound)
            .field("scope", &self.scope)
            .field("committed", &self.committed)
            .finish()
    }
}
