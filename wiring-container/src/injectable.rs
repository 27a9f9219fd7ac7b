//! The "constructible with resolved dependencies" capability.
//!
//! A type takes part in constructor injection by implementing
//! [`Injectable`]: it declares its dependencies as an ordered list of
//! [`TypeKey`]s and builds itself from an [`Arguments`] list holding the
//! resolved values in the same order.
//!
//! ```rust
//! use std::sync::Arc;
//! use wiring_container::injectable::{Arguments, Injectable};
//! use wiring_container::key::TypeKey;
//! use wiring_container::Result;
//!
//! struct UserService;
//!
//! impl Injectable for UserService {
//!     fn construct(_: &mut Arguments) -> Result<Self> {
//!         Ok(UserService)
//!     }
//! }
//!
//! wiring_container::declare!(UserService);
//!
//! struct UserController {
//!     users: Arc<UserService>,
//! }
//!
//! impl Injectable for UserController {
//!     const INJECTABLE: bool = false;
//!
//!     fn dependencies() -> Vec<TypeKey> {
//!         vec![TypeKey::of::<UserService>()]
//!     }
//!
//!     fn construct(args: &mut Arguments) -> Result<Self> {
//!         Ok(UserController { users: args.next()? })
//!     }
//! }
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, WiringError};
use crate::key::{Key, TypeKey};
use crate::metadata::TypeInfo;

/// A resolved value, type-erased.
///
/// Always wraps an `Arc<T>` for the `T` the value was registered as, so an
/// unsized `T` like `dyn Logger` round-trips and singletons keep identity.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) fn into_instance<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(instance: &Instance) -> Option<Arc<T>> {
    (**instance).downcast_ref::<Arc<T>>().cloned()
}

/// A type that can be constructed by the container.
///
/// Implemented by hand or with `#[derive(Injectable)]`. The trait bound is
/// what makes a type eligible as a class registration target.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Whether other types may declare this one as a dependency.
    ///
    /// `false` marks a type that supports injection into itself but must
    /// not be injected elsewhere (a controller, an entry point).
    const INJECTABLE: bool = true;

    /// Constructor dependencies, in argument order.
    fn dependencies() -> Vec<TypeKey> {
        Vec::new()
    }

    /// Builds the value. `args` yields one resolved value per declared
    /// dependency, in declaration order.
    fn construct(args: &mut Arguments) -> Result<Self>;
}

/// Upcast from a concrete type to the type it is registered as.
///
/// Every type implements `Implements<Self>`. Implement it for trait
/// objects with [`implements!`](crate::implements):
///
/// ```rust
/// use wiring_container::implements;
///
/// trait Logger: Send + Sync {}
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
///
/// implements!(ConsoleLogger => dyn Logger);
/// ```
pub trait Implements<I: ?Sized>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<I>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`Implements`] for a concrete type and one or more
/// interface types it coerces to.
#[macro_export]
macro_rules! implements {
    ($concrete:ty => $($iface:ty),+ $(,)?) => {
        $(
            impl $crate::injectable::Implements<$iface> for $concrete {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$iface> {
                    self
                }
            }
        )+
    };
}

/// Declares types injectable without making them constructible.
///
/// Typically used for trait objects that appear in dependency manifests:
/// `injectable!(dyn Logger);`
#[macro_export]
macro_rules! injectable {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__private::inventory::submit! {
                $crate::metadata::Declaration::marker($crate::key::TypeKey::of::<$ty>)
            }
        )+
    };
}

/// Declares hand-written [`Injectable`] types at link time.
///
/// `#[derive(Injectable)]` does this on its own. A hand-written impl needs
/// it for the type's [`Injectable::INJECTABLE`] mark to hold however the
/// type is registered: a type only ever registered as an instance or a
/// factory is otherwise unknown to the container.
///
/// ```rust
/// use wiring_container::injectable::{Arguments, Injectable};
/// use wiring_container::Result;
///
/// struct Clock;
///
/// impl Injectable for Clock {
///     fn construct(_: &mut Arguments) -> Result<Self> {
///         Ok(Clock)
///     }
/// }
///
/// wiring_container::declare!(Clock);
/// ```
#[macro_export]
macro_rules! declare {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__private::inventory::submit! {
                $crate::metadata::Declaration::of::<$ty>()
            }
        )+
    };
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    owner: TypeKey,
    values: std::vec::IntoIter<(TypeKey, Instance)>,
}

impl Arguments {
    pub(crate) fn new(owner: TypeKey, values: Vec<(TypeKey, Instance)>) -> Self {
        Self {
            owner,
            values: values.into_iter(),
        }
    }

    /// Takes the next argument.
    ///
    /// # Errors
    /// - [`WiringError::ConstructionFailed`]: no arguments remain
    /// - [`WiringError::TypeMismatch`]: the next argument is not an `Arc<T>`
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let Some((declared, instance)) = self.values.next() else {
            return Err(WiringError::ConstructionFailed {
                key: self.owner,
                source: format!(
                    "constructor asked for {} but all declared dependencies were consumed",
                    type_name::<T>()
                )
                .into(),
            });
        };

        downcast::<T>(&instance).ok_or(WiringError::TypeMismatch {
            key: Key::Type(declared),
            expected: type_name::<T>(),
        })
    }

    /// The type being constructed.
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    /// Number of arguments not consumed yet.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field("remaining", &self.len())
            .finish()
    }
}

/// A type-erased recipe for building a concrete [`Injectable`] type,
/// upcast to the type it is bound as.
#[derive(Clone, Copy)]
pub struct Constructor {
    target: TypeKey,
    build: fn(&mut Arguments) -> Result<Instance>,
    describe: fn() -> TypeInfo,
}

impl Constructor {
    /// Builds `T` and registers it as itself.
    pub fn of<T: Injectable>() -> Self {
        Self::bound::<T, T>()
    }

    /// Builds `C` and registers it as `I`.
    pub fn bound<I, C>() -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        C: Injectable + Implements<I>,
    {
        Self {
            target: TypeKey::of::<C>(),
            build: build_as::<I, C>,
            describe: TypeInfo::of::<C>,
        }
    }

    /// The concrete type this constructor builds.
    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub(crate) fn describe(&self) -> TypeInfo {
        (self.describe)()
    }

    pub(crate) fn build(&self, args: &mut Arguments) -> Result<Instance> {
        (self.build)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({})", self.target.type_name())
    }
}

fn build_as<I, C>(args: &mut Arguments) -> Result<Instance>
where
    I: ?Sized + Send + Sync + 'static,
    C: Injectable + Implements<I>,
{
    let value = C::construct(args)?;
    Ok(into_instance::<I>(<C as Implements<I>>::upcast(Arc::new(value))))
}
