//! Registration keys.
//!
//! [`TypeKey`] identifies a Rust type and is what dependency manifests are
//! made of. [`Key`] is the slot a registration is stored under: either the
//! type identity itself (direct API) or a canonical name (token API).

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use wiring_support::rendering::class_name;

/// Identity of a Rust type.
///
/// Works for unsized types too, so `dyn Trait` can be requested and
/// declared as a dependency.
///
/// # Examples
/// ```
/// use wiring_container::key::TypeKey;
///
/// let key = TypeKey::of::<String>();
/// assert_eq!(key.type_name(), "alloc::string::String");
/// assert_eq!(key.class_name(), "String");
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Creates a key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of this type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the class name: the type name without module paths.
    ///
    /// This is the name key a class token canonicalises to.
    pub fn class_name(&self) -> String {
        class_name(self.type_name)
    }
}

// Equality and hashing by TypeId only; the name is for messages.
impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}

/// The slot a registration lives in.
///
/// Identity keys and name keys never compare equal, even when a name
/// happens to match a type's class name. Each front-end only produces one
/// kind.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Keyed by type identity (direct API).
    Type(TypeKey),
    /// Keyed by canonical, non-empty name (token API).
    Name(Arc<str>),
}

impl Key {
    /// Identity key for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key::Type(TypeKey::of::<T>())
    }

    /// Name key. The caller guarantees `name` is non-empty;
    /// [`Token`](crate::token::Token) canonicalisation enforces it.
    pub(crate) fn name(name: impl Into<Arc<str>>) -> Self {
        Key::Name(name.into())
    }

    /// Returns the type identity, for identity keys.
    pub fn type_key(&self) -> Option<&TypeKey> {
        match self {
            Key::Type(key) => Some(key),
            Key::Name(_) => None,
        }
    }

    /// Returns the name, for name keys.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Type(_) => None,
            Key::Name(name) => Some(name),
        }
    }

    /// Human-readable label used in messages and suggestions.
    pub fn label(&self) -> String {
        match self {
            Key::Type(key) => key.class_name(),
            Key::Name(name) => name.to_string(),
        }
    }
}

impl From<TypeKey> for Key {
    fn from(key: TypeKey) -> Self {
        Key::Type(key)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(key) => write!(f, "Key::Type({})", key.type_name()),
            Key::Name(name) => write!(f, "Key::Name({name:?})"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(key) => write!(f, "{key}"),
            Key::Name(name) => write!(f, "'{name}'"),
        }
    }
}
