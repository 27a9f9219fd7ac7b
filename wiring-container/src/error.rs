//! Error types for container operations.
//!
//! Every error is fatal to the call that raised it: a failed resolve never
//! returns a partially built object graph. Messages name the key involved
//! and end with a hint.

use crate::key::{Key, TypeKey};
use std::fmt;
use wiring_support::rendering::render_chain;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    /// A token, name or symbol that cannot form a key.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The key already has a registration (token API).
    #[error("{}", .0)]
    AlreadyRegistered(AlreadyRegisteredError),

    /// The requested key has no registration.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// A declared dependency is not marked injectable.
    #[error("{}", .0)]
    NotInjectable(NotInjectableError),

    /// A stored value is not of the requested type.
    #[error("Type mismatch for {key}: expected {expected}")]
    TypeMismatch {
        key: Key,
        expected: &'static str,
    },

    /// A binding has no target type to construct.
    #[error(
        "Binding for {key} has no target type\n  Hint: call .to::<Concrete>(), or register a class token before calling .to_self()"
    )]
    UnresolvedDependency { key: Key },

    /// A dependency chain leads back to a key already being resolved.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// Resolution nested deeper than the configured limit.
    #[error("Resolution depth exceeded {limit} while resolving {key}")]
    DepthExceeded { key: Key, limit: usize },

    /// The type's constructor returned an error.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: TypeKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl WiringError {
    /// Wraps an arbitrary error raised while constructing `T`.
    pub fn construction<T: ?Sized + 'static>(
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        WiringError::ConstructionFailed {
            key: TypeKey::of::<T>(),
            source: source.into(),
        }
    }
}

/// Error when a key was not registered.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The key that was requested
    pub requested: Key,
    /// What required it, when it was requested as a dependency
    pub required_by: Option<Key>,
    /// Registered keys with similar names
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No registration found for {}", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(f, "\n  Hint: register {} before resolving it", self.requested)
    }
}

/// Error when a declared dependency lacks the injectable mark.
#[derive(Debug)]
pub struct NotInjectableError {
    /// The dependency type
    pub key: TypeKey,
    /// The type that declared it
    pub required_by: TypeKey,
}

impl fmt::Display for NotInjectableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not injectable (required by {})",
            self.key, self.required_by
        )?;
        write!(
            f,
            "\n  Hint: derive Injectable without `supports_only`, add declare!() after a hand-written impl, or mark it with injectable!()"
        )
    }
}

/// Error when a cycle is found in the dependency graph.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The chain of keys forming the cycle, first and last equal.
    pub chain: Vec<Key>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.chain.iter().map(Key::label).collect();
        write!(f, "Circular dependency detected:\n  {}", render_chain(&labels))?;
        write!(
            f,
            "\n  Hint: break the cycle with a factory registration or restructure the dependencies"
        )
    }
}

/// Error when registering a key that is already present.
#[derive(Debug)]
pub struct AlreadyRegisteredError {
    pub key: Key,
}

impl fmt::Display for AlreadyRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is already registered", self.key)?;
        write!(f, "\n  Hint: call unregister() first to replace the binding")
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, WiringError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct UserService;
    struct UserController;

    #[test]
    fn not_registered_error_display() {
        let err = WiringError::NotRegistered(NotRegisteredError {
            requested: Key::of::<UserService>(),
            required_by: Some(Key::of::<UserController>()),
            suggestions: vec!["UserServices".into()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("No registration found for UserService"));
        assert!(msg.contains("Required by: UserController"));
        assert!(msg.contains("- UserServices"));
    }

    #[test]
    fn not_injectable_dependency_display() {
        let err = WiringError::NotInjectable(NotInjectableError {
            key: TypeKey::of::<UserService>(),
            required_by: TypeKey::of::<UserController>(),
        });
        let msg = format!("{err}");
        assert!(msg.contains("'UserService' is not injectable"));
        assert!(msg.contains("required by UserController"));
        assert!(msg.contains("declare!()"));
    }

    #[test]
    fn circular_dependency_error_display() {
        let err = WiringError::CircularDependency(CircularDependencyError {
            chain: vec![
                Key::of::<UserController>(),
                Key::of::<UserService>(),
                Key::of::<UserController>(),
            ],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Circular"));
        assert!(msg.contains("UserController → UserService → UserController"));
    }

    #[test]
    fn construction_error_keeps_source() {
        use std::error::Error;

        let err = WiringError::construction::<UserService>("socket closed");
        assert!(format!("{err}").contains("Failed to construct UserService: socket closed"));
        assert!(err.source().is_some());
    }
}
