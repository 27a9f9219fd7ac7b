//! # The TokenContainer: token registration API
//!
//! Registrations are keyed by name: a class token's short type name, a
//! literal string or a symbol's description. The API is strict:
//! registering a present name and unregistering an absent one both fail.
//!
//! Dependencies of a bound class are looked up by their class name, so a
//! class registered with `Token::class::<UserService>()` satisfies a
//! dependency on `UserService`, and so does one registered as
//! `"UserService"`.
//!
//! ```rust
//! use wiring_container::prelude::*;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) -> String {
//!         msg.to_string()
//!     }
//! }
//!
//! impl Injectable for ConsoleLogger {
//!     fn construct(_: &mut Arguments) -> Result<Self> {
//!         Ok(ConsoleLogger)
//!     }
//! }
//!
//! wiring_container::implements!(ConsoleLogger => dyn Logger);
//!
//! let container = TokenContainer::new();
//! container
//!     .register::<dyn Logger>(Symbol::new("ILogger"))
//!     .unwrap()
//!     .to::<ConsoleLogger>()
//!     .commit()
//!     .unwrap();
//!
//! let logger = container.resolve::<dyn Logger>(Symbol::new("ILogger")).unwrap();
//! assert_eq!(logger.log("hi"), "hi");
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::binding::Binding;
use crate::error::{AlreadyRegisteredError, Result, WiringError};
use crate::graph::GraphValidator;
use crate::metadata::{Declarations, MetadataProvider};
use crate::registry::Snapshot;
use crate::resolver::{Core, KeyScheme};
use crate::settings::Settings;
use crate::token::Token;

/// Configures a [`TokenContainer`] before it is created.
pub struct TokenContainerBuilder {
    settings: Settings,
    metadata: Option<Arc<dyn MetadataProvider>>,
}

impl TokenContainerBuilder {
    fn new() -> Self {
        Self {
            settings: Settings::default(),
            metadata: None,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.settings = self.settings.with_max_depth(max_depth);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Metadata consulted for types not bound as classes in this
    /// container. Defaults to [`Declarations::global`].
    pub fn metadata(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    pub fn build(self) -> TokenContainer {
        let metadata = self
            .metadata
            .unwrap_or_else(|| Declarations::global() as Arc<dyn MetadataProvider>);
        info!(max_depth = self.settings.max_depth, "Creating token container");
        TokenContainer {
            core: Core::new(KeyScheme::Name, self.settings, metadata),
        }
    }
}

/// Dependency injection container keyed by name.
pub struct TokenContainer {
    core: Core,
}

impl TokenContainer {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TokenContainerBuilder {
        TokenContainerBuilder::new()
    }

    /// Starts a binding for `token`. The binding takes effect on
    /// [`Binding::commit`].
    ///
    /// # Errors
    /// - [`WiringError::InvalidArgument`]: empty name or undescribed symbol
    /// - [`WiringError::AlreadyRegistered`]: the name is already bound
    pub fn register<T>(&self, token: impl Into<Token>) -> Result<Binding<'_, T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let token = token.into();
        let key = token.canonicalize()?;

        if self.core.contains(&key) {
            return Err(WiringError::AlreadyRegistered(AlreadyRegisteredError { key }));
        }

        Ok(Binding::new(&self.core, key, token.seed()))
    }

    /// Removes the binding for `token`.
    ///
    /// # Errors
    /// - [`WiringError::InvalidArgument`]: invalid token
    /// - [`WiringError::NotRegistered`]: nothing is bound to the name
    pub fn unregister(&self, token: impl Into<Token>) -> Result<()> {
        let key = token.into().canonicalize()?;

        match self.core.remove(&key) {
            Some(_) => Ok(()),
            None => Err(self.core.not_registered(&key, None)),
        }
    }

    /// Resolves the binding for `token` as an `Arc<T>`.
    ///
    /// # Errors
    /// Everything [`Container::resolve`](crate::container::Container::resolve)
    /// raises, plus [`WiringError::InvalidArgument`] for an invalid token and
    /// [`WiringError::TypeMismatch`] when the bound value is not a `T`.
    pub fn resolve<T>(&self, token: impl Into<Token>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = token.into().canonicalize()?;
        self.core.resolve::<T>(&key)
    }

    /// Whether `token` is bound. Invalid tokens are never bound.
    pub fn contains(&self, token: impl Into<Token>) -> bool {
        token
            .into()
            .canonicalize()
            .is_ok_and(|key| self.core.contains(&key))
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the current bindings, detached from this container.
    pub fn registry(&self) -> Snapshot {
        self.core.snapshot()
    }

    /// A new container with this container's bindings overlaid by
    /// `other`'s. Neither input changes.
    pub fn merge(&self, other: &TokenContainer) -> TokenContainer {
        let merged = TokenContainer {
            core: self.core.merge(&other.core),
        };
        debug!(
            left = self.len(),
            right = other.len(),
            merged = merged.len(),
            "Merged token containers"
        );
        merged
    }

    /// Checks every bound class's dependency graph without constructing
    /// anything.
    pub fn validate(&self) -> Result<()> {
        GraphValidator::new(&self.core).validate()
    }
}

impl Default for TokenContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TokenContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenContainer")
            .field("registered", &self.core.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injectable::{Arguments, Injectable};
    use crate::key::{Key, TypeKey};
    use crate::registration::RegistrationKind;
    use crate::token::Symbol;
    use std::sync::atomic::{AtomicU32, Ordering};

    trait Logger: Send + Sync {
        fn log(&self, msg: &str) -> String;

        fn info(&self, msg: &str) -> String {
            self.log(&format!("[INFO] {msg}"))
        }

        fn error(&self, msg: &str) -> String {
            self.log(&format!("[ERROR] {msg}"))
        }
    }

    struct ConsoleLogger;

    impl Logger for ConsoleLogger {
        fn log(&self, msg: &str) -> String {
            msg.to_string()
        }
    }

    impl Injectable for ConsoleLogger {
        fn construct(_: &mut Arguments) -> crate::error::Result<Self> {
            Ok(ConsoleLogger)
        }
    }

    crate::implements!(ConsoleLogger => dyn Logger);

    trait Car: Send + Sync {
        fn name(&self) -> &str;
    }

    struct MercedesCar;

    impl Car for MercedesCar {
        fn name(&self) -> &str {
            "A 35 4MATIC"
        }
    }

    impl Injectable for MercedesCar {
        fn construct(_: &mut Arguments) -> crate::error::Result<Self> {
            Ok(MercedesCar)
        }
    }

    crate::implements!(MercedesCar => dyn Car);

    static NEXT_NUMBER: AtomicU32 = AtomicU32::new(0);

    struct MathUtils {
        number: u32,
    }

    impl Injectable for MathUtils {
        fn construct(_: &mut Arguments) -> crate::error::Result<Self> {
            Ok(MathUtils {
                number: NEXT_NUMBER.fetch_add(1, Ordering::SeqCst),
            })
        }
    }

    struct UserService;

    impl UserService {
        fn users(&self) -> Vec<&'static str> {
            vec!["drischdaan"]
        }
    }

    impl Injectable for UserService {
        fn construct(_: &mut Arguments) -> crate::error::Result<Self> {
            Ok(UserService)
        }
    }

    struct UserController {
        users: Arc<UserService>,
    }

    impl Injectable for UserController {
        const INJECTABLE: bool = false;

        fn dependencies() -> Vec<TypeKey> {
            vec![TypeKey::of::<UserService>()]
        }

        fn construct(args: &mut Arguments) -> crate::error::Result<Self> {
            Ok(UserController { users: args.next()? })
        }
    }

    #[test]
    fn interface_resolving() {
        let container = TokenContainer::new();
        container
            .register::<dyn Logger>(Symbol::new("ILogger"))
            .unwrap()
            .to::<ConsoleLogger>()
            .commit()
            .unwrap();

        let logger = container.resolve::<dyn Logger>(Symbol::new("ILogger")).unwrap();
        assert_eq!(logger.log("message"), "message");
        assert_eq!(logger.info("message"), "[INFO] message");
        assert_eq!(logger.error("message"), "[ERROR] message");

        container.unregister(Symbol::new("ILogger")).unwrap();
        assert!(container.is_empty());
    }

    #[test]
    fn abstract_resolving() {
        let container = TokenContainer::new();
        container
            .register::<dyn Car>(Token::of::<dyn Car>())
            .unwrap()
            .to::<MercedesCar>()
            .commit()
            .unwrap();

        let car = container.resolve::<dyn Car>(Token::of::<dyn Car>()).unwrap();
        assert_eq!(car.name(), "A 35 4MATIC");
    }

    #[test]
    fn singleton_then_transient() {
        let container = TokenContainer::new();
        container
            .register::<MathUtils>(Token::class::<MathUtils>())
            .unwrap()
            .to_self()
            .as_singleton()
            .commit()
            .unwrap();

        let a = container.resolve::<MathUtils>(Token::class::<MathUtils>()).unwrap();
        let b = container.resolve::<MathUtils>(Token::class::<MathUtils>()).unwrap();
        assert_eq!(a.number, b.number);
        assert!(Arc::ptr_eq(&a, &b));

        container.unregister(Token::class::<MathUtils>()).unwrap();
        container
            .register::<MathUtils>(Token::class::<MathUtils>())
            .unwrap()
            .to_self()
            .commit()
            .unwrap();

        let a = container.resolve::<MathUtils>(Token::class::<MathUtils>()).unwrap();
        let b = container.resolve::<MathUtils>(Token::class::<MathUtils>()).unwrap();
        assert_ne!(a.number, b.number);
    }

    #[test]
    fn provider_injection() {
        let container = TokenContainer::new();
        container
            .register::<UserService>(Token::class::<UserService>())
            .unwrap()
            .to_self()
            .commit()
            .unwrap();
        container
            .register::<UserController>(Token::class::<UserController>())
            .unwrap()
            .to_self()
            .commit()
            .unwrap();

        let controller = container
            .resolve::<UserController>(Token::class::<UserController>())
            .unwrap();
        assert_eq!(controller.users.users(), vec!["drischdaan"]);
    }

    #[test]
    fn class_token_and_name_string_share_a_slot() {
        let container = TokenContainer::new();
        container
            .register::<UserService>("UserService")
            .unwrap()
            .to::<UserService>()
            .commit()
            .unwrap();

        assert!(container.contains(Token::class::<UserService>()));
        assert!(container.resolve::<UserService>(Token::class::<UserService>()).is_ok());

        let err = container.register::<UserService>(Token::class::<UserService>()).unwrap_err();
        assert!(matches!(err, WiringError::AlreadyRegistered(_)));
    }

    #[test]
    fn container_merging() {
        let left = TokenContainer::new();
        let right = TokenContainer::new();
        left.register::<UserController>(Token::class::<UserController>())
            .unwrap()
            .to_self()
            .commit()
            .unwrap();
        right
            .register::<UserService>(Token::class::<UserService>())
            .unwrap()
            .to_self()
            .commit()
            .unwrap();

        assert_eq!(left.registry().len(), 1);

        let merged = left.merge(&right);
        assert_eq!(merged.registry().len(), 2);

        let controller = merged
            .resolve::<UserController>(Token::class::<UserController>())
            .unwrap();
        assert_eq!(controller.users.users(), vec!["drischdaan"]);

        merged.unregister(Token::class::<UserService>()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(right.len(), 1);
    }

    #[test]
    fn merge_prefers_other_on_collision() {
        let left = TokenContainer::new();
        let right = TokenContainer::new();
        left.register::<MathUtils>("math").unwrap().to::<MathUtils>().commit().unwrap();
        right
            .register::<MathUtils>("math")
            .unwrap()
            .to::<MathUtils>()
            .as_singleton()
            .commit()
            .unwrap();

        let merged = left.merge(&right);
        assert_eq!(
            merged.registry().kinds()[&Key::name("math")],
            RegistrationKind::SingletonClass
        );
        assert_eq!(
            left.registry().kinds()[&Key::name("math")],
            RegistrationKind::TransientClass
        );
    }

    #[test]
    fn unregister_absent_fails() {
        let container = TokenContainer::new();
        let err = container.unregister("missing").unwrap_err();
        assert!(matches!(err, WiringError::NotRegistered(_)));
    }

    #[test]
    fn invalid_tokens_are_rejected() {
        let container = TokenContainer::new();

        let err = container.register::<MathUtils>("").unwrap_err();
        assert!(matches!(err, WiringError::InvalidArgument(_)));

        let err = container.resolve::<MathUtils>(Symbol::anonymous()).err().unwrap();
        assert!(matches!(err, WiringError::InvalidArgument(_)));

        assert!(!container.contains(""));
    }

    #[test]
    fn resolve_absent_fails() {
        let container = TokenContainer::new();
        let err = container.resolve::<MathUtils>("MathUtils").err().unwrap();
        assert!(matches!(err, WiringError::NotRegistered(_)));
    }

    #[test]
    fn resolve_as_wrong_type_is_a_mismatch() {
        let container = TokenContainer::new();
        container
            .register::<dyn Car>("car")
            .unwrap()
            .to::<MercedesCar>()
            .commit()
            .unwrap();

        let err = container.resolve::<MercedesCar>("car").err().unwrap();
        assert!(matches!(err, WiringError::TypeMismatch { .. }));
    }

    #[test]
    fn to_self_with_a_foreign_class_fails_at_commit() {
        let container = TokenContainer::new();
        let err = container
            .register::<dyn Car>(Token::class::<MathUtils>())
            .unwrap()
            .to_self()
            .commit()
            .unwrap_err();

        assert!(matches!(err, WiringError::TypeMismatch { .. }));
        assert!(!container.contains(Token::class::<MathUtils>()));
    }

    #[test]
    fn uncommitted_binding_is_discarded() {
        let container = TokenContainer::new();
        let _ = container.register::<MathUtils>("math").unwrap().to::<MathUtils>();
        assert!(!container.contains("math"));
    }

    #[test]
    fn validate_reports_missing_dependency() {
        let container = TokenContainer::new();
        container
            .register::<UserController>(Token::class::<UserController>())
            .unwrap()
            .to_self()
            .commit()
            .unwrap();

        assert!(container.validate().is_err());
    }
}
