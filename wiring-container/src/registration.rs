//! Registration strategies.
//!
//! A [`Registration`] knows how to produce the instance for one key. The
//! container hands it an [`ArgumentResolver`] that recursively resolves
//! constructor dependencies; only the class variants use it.
//!
//! | variant | produces | memoised |
//! |---|---|---|
//! | [`InstanceRegistration`] | a pre-built value | n/a |
//! | [`FactoryRegistration`] | a producer's result | no |
//! | [`SingletonFactoryRegistration`] | a producer's first result | yes |
//! | [`TransientRegistration`] | a freshly constructed class | no |
//! | [`SingletonRegistration`] | the first constructed class | yes |

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::error::Result;
use crate::injectable::{Arguments, Constructor, Instance};
use crate::key::TypeKey;
use crate::scope::Scope;

/// Producer stored by the factory variants.
pub type ProducerFn = Arc<dyn Fn() -> Instance + Send + Sync>;

/// Resolves the constructor arguments of a type.
///
/// Supplied by the container for the duration of one resolve call.
pub trait ArgumentResolver {
    /// Resolves every declared dependency of `key`, in declaration order,
    /// pairing each value with the type it was declared as.
    fn arguments(&mut self, key: &TypeKey) -> Result<Vec<(TypeKey, Instance)>>;
}

/// The variant of a registration, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    Instance,
    Factory,
    SingletonFactory,
    TransientClass,
    SingletonClass,
}

impl RegistrationKind {
    /// The lifecycle this variant implements.
    pub fn scope(&self) -> Scope {
        match self {
            RegistrationKind::Factory | RegistrationKind::TransientClass => Scope::Transient,
            RegistrationKind::Instance
            | RegistrationKind::SingletonFactory
            | RegistrationKind::SingletonClass => Scope::Singleton,
        }
    }
}

/// How to produce an instance for one key.
pub trait Registration: Send + Sync + fmt::Debug {
    /// Produces the instance, resolving constructor arguments through
    /// `args` when the variant constructs a class.
    fn resolve(&self, args: &mut dyn ArgumentResolver) -> Result<Instance>;

    fn kind(&self) -> RegistrationKind;

    /// The concrete type constructed, for class variants.
    fn target(&self) -> Option<TypeKey> {
        None
    }

    /// Whether a memoised instance already exists.
    fn is_materialized(&self) -> bool {
        false
    }
}

/// Builds the class registration matching `scope`.
pub(crate) fn class(constructor: Constructor, scope: Scope) -> Arc<dyn Registration> {
    match scope {
        Scope::Transient => Arc::new(TransientRegistration::new(constructor)),
        Scope::Singleton => Arc::new(SingletonRegistration::new(constructor)),
    }
}

/// Wraps a pre-built value.
pub struct InstanceRegistration {
    value: Instance,
}

impl InstanceRegistration {
    pub fn new(value: Instance) -> Self {
        Self { value }
    }
}

impl Registration for InstanceRegistration {
    fn resolve(&self, _: &mut dyn ArgumentResolver) -> Result<Instance> {
        Ok(self.value.clone())
    }

    fn kind(&self) -> RegistrationKind {
        RegistrationKind::Instance
    }

    fn is_materialized(&self) -> bool {
        true
    }
}

impl fmt::Debug for InstanceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistration").finish_non_exhaustive()
    }
}

/// Calls a producer on every resolve.
pub struct FactoryRegistration {
    producer: ProducerFn,
}

impl FactoryRegistration {
    pub fn new(producer: ProducerFn) -> Self {
        Self { producer }
    }
}

impl Registration for FactoryRegistration {
    fn resolve(&self, _: &mut dyn ArgumentResolver) -> Result<Instance> {
        Ok((self.producer)())
    }

    fn kind(&self) -> RegistrationKind {
        RegistrationKind::Factory
    }
}

impl fmt::Debug for FactoryRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistration").finish_non_exhaustive()
    }
}

/// Calls a producer once and memoises its result.
pub struct SingletonFactoryRegistration {
    producer: ProducerFn,
    cell: OnceCell<Instance>,
}

impl SingletonFactoryRegistration {
    pub fn new(producer: ProducerFn) -> Self {
        Self {
            producer,
            cell: OnceCell::new(),
        }
    }
}

impl Registration for SingletonFactoryRegistration {
    fn resolve(&self, _: &mut dyn ArgumentResolver) -> Result<Instance> {
        Ok(self.cell.get_or_init(|| (self.producer)()).clone())
    }

    fn kind(&self) -> RegistrationKind {
        RegistrationKind::SingletonFactory
    }

    fn is_materialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for SingletonFactoryRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonFactoryRegistration")
            .field("materialized", &self.is_materialized())
            .finish_non_exhaustive()
    }
}

/// Constructs a new instance of a class on every resolve.
#[derive(Debug)]
pub struct TransientRegistration {
    constructor: Constructor,
}

impl TransientRegistration {
    pub fn new(constructor: Constructor) -> Self {
        Self { constructor }
    }
}

impl Registration for TransientRegistration {
    fn resolve(&self, args: &mut dyn ArgumentResolver) -> Result<Instance> {
        construct(&self.constructor, args)
    }

    fn kind(&self) -> RegistrationKind {
        RegistrationKind::TransientClass
    }

    fn target(&self) -> Option<TypeKey> {
        Some(self.constructor.target())
    }
}

/// Constructs a class once and memoises it.
///
/// Once the instance exists, later resolves skip argument resolution
/// entirely. A failed construction leaves the cell empty.
pub struct SingletonRegistration {
    constructor: Constructor,
    cell: OnceCell<Instance>,
}

impl SingletonRegistration {
    pub fn new(constructor: Constructor) -> Self {
        Self {
            constructor,
            cell: OnceCell::new(),
        }
    }
}

impl Registration for SingletonRegistration {
    fn resolve(&self, args: &mut dyn ArgumentResolver) -> Result<Instance> {
        self.cell
            .get_or_try_init(|| construct(&self.constructor, args))
            .cloned()
    }

    fn kind(&self) -> RegistrationKind {
        RegistrationKind::SingletonClass
    }

    fn target(&self) -> Option<TypeKey> {
        Some(self.constructor.target())
    }

    fn is_materialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for SingletonRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonRegistration")
            .field("constructor", &self.constructor)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

fn construct(constructor: &Constructor, args: &mut dyn ArgumentResolver) -> Result<Instance> {
    let target = constructor.target();
    let values = args.arguments(&target)?;
    trace!(target = %target, arguments = values.len(), "Constructing");

    let mut arguments = Arguments::new(target, values);
    constructor.build(&mut arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injectable::{Injectable, downcast, into_instance};
    use std::sync::atomic::{AtomicU32, Ordering};

    static BUILT: AtomicU32 = AtomicU32::new(0);

    struct Counter(u32);

    impl Injectable for Counter {
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Counter(BUILT.fetch_add(1, Ordering::SeqCst)))
        }
    }

    /// Records which types had their arguments requested.
    #[derive(Default)]
    struct RecordingResolver {
        requested: Vec<TypeKey>,
    }

    impl ArgumentResolver for RecordingResolver {
        fn arguments(&mut self, key: &TypeKey) -> Result<Vec<(TypeKey, Instance)>> {
            self.requested.push(*key);
            Ok(Vec::new())
        }
    }

    fn producer(counter: Arc<AtomicU32>) -> ProducerFn {
        Arc::new(move || into_instance(Arc::new(counter.fetch_add(1, Ordering::SeqCst))))
    }

    #[test]
    fn instance_ignores_arguments() {
        let value = Arc::new(String::from("config"));
        let reg = InstanceRegistration::new(into_instance(value.clone()));
        let mut args = RecordingResolver::default();

        let first = downcast::<String>(&reg.resolve(&mut args).unwrap()).unwrap();
        assert!(Arc::ptr_eq(&first, &value));
        assert!(args.requested.is_empty());
    }

    #[test]
    fn factory_runs_every_time() {
        let calls = Arc::new(AtomicU32::new(0));
        let reg = FactoryRegistration::new(producer(calls.clone()));
        let mut args = RecordingResolver::default();

        reg.resolve(&mut args).unwrap();
        reg.resolve(&mut args).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn singleton_factory_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let reg = SingletonFactoryRegistration::new(producer(calls.clone()));
        let mut args = RecordingResolver::default();
        assert!(!reg.is_materialized());

        let a = downcast::<u32>(&reg.resolve(&mut args).unwrap()).unwrap();
        let b = downcast::<u32>(&reg.resolve(&mut args).unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(reg.is_materialized());
    }

    #[test]
    fn transient_constructs_every_time() {
        let reg = TransientRegistration::new(Constructor::of::<Counter>());
        let mut args = RecordingResolver::default();

        let a = downcast::<Counter>(&reg.resolve(&mut args).unwrap()).unwrap();
        let b = downcast::<Counter>(&reg.resolve(&mut args).unwrap()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a.0, b.0);
        assert_eq!(args.requested.len(), 2);
    }

    #[test]
    fn singleton_skips_arguments_once_cached() {
        let reg = SingletonRegistration::new(Constructor::of::<Counter>());
        let mut args = RecordingResolver::default();

        let a = downcast::<Counter>(&reg.resolve(&mut args).unwrap()).unwrap();
        let b = downcast::<Counter>(&reg.resolve(&mut args).unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(args.requested, vec![TypeKey::of::<Counter>()]);
    }

    #[test]
    fn class_helper_follows_scope() {
        let ctor = Constructor::of::<Counter>();
        assert_eq!(class(ctor, Scope::Transient).kind(), RegistrationKind::TransientClass);
        assert_eq!(class(ctor, Scope::Singleton).kind(), RegistrationKind::SingletonClass);
        assert_eq!(class(ctor, Scope::Singleton).target(), Some(TypeKey::of::<Counter>()));
    }

    #[test]
    fn kind_scopes() {
        assert_eq!(RegistrationKind::Factory.scope(), Scope::Transient);
        assert_eq!(RegistrationKind::SingletonClass.scope(), Scope::Singleton);
    }
}
