//! Lifecycle scopes for class bindings.
//!
//! - [`Scope::Transient`]: a new instance on every resolve (the default)
//! - [`Scope::Singleton`]: one memoised instance per registration
use std::fmt;

/// Defines how long a constructed instance lives.
///
/// # Examples
/// ```
/// use wiring_container::scope::Scope;
///
/// assert_eq!(Scope::default(), Scope::Transient);
/// assert!(Scope::Singleton.is_cached());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// New instance created on every resolve call.
    ///
    /// The whole dependency subgraph is rebuilt each time, except for
    /// dependencies that are themselves singletons.
    #[default]
    Transient,

    /// One instance, created on first resolve and memoised by the
    /// registration that owns it.
    ///
    /// Merged containers share the registration, and therefore the
    /// instance.
    Singleton,
}

impl Scope {
    /// Returns `true` if this scope caches instances.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Transient => write!(f, "Transient"),
            Scope::Singleton => write!(f, "Singleton"),
        }
    }
}
