//! Tokens accepted by the token API.
//!
//! A [`Token`] is canonicalised into a name [`Key`]:
//!
//! | token | name key |
//! |---|---|
//! | `Token::class::<app::UserService>()` | `UserService` |
//! | `"ILogger"` | `ILogger` |
//! | `Symbol::new("ILogger")` | `ILogger` |
//!
//! Class tokens built from an [`Injectable`] type also carry a
//! [`Constructor`], which is what `Binding::to_self` binds to.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, WiringError};
use crate::injectable::{Constructor, Injectable};
use crate::key::{Key, TypeKey};

/// A symbolic name, identified by its description.
///
/// Two symbols with the same description canonicalise to the same key.
/// A symbol without a description cannot be used as a token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    description: Option<Arc<str>>,
}

impl Symbol {
    /// Creates a symbol with a description.
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }

    /// Creates a symbol without a description.
    pub fn anonymous() -> Self {
        Self { description: None }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(description) => write!(f, "Symbol({description})"),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Identifies a registration slot in a
/// [`TokenContainer`](crate::token_container::TokenContainer).
#[derive(Clone)]
pub enum Token {
    /// A type. `seed` is set when the type can be constructed.
    Class {
        key: TypeKey,
        seed: Option<Constructor>,
    },
    /// A literal name.
    Name(String),
    /// A symbol, named by its description.
    Symbol(Symbol),
}

impl Token {
    /// A class token for a constructible type; `to_self` binds to `T`.
    pub fn class<T: Injectable>() -> Self {
        Token::Class {
            key: TypeKey::of::<T>(),
            seed: Some(Constructor::of::<T>()),
        }
    }

    /// A class token for any type, typically a trait object. It carries no
    /// constructor, so it must be bound with `to`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Token::Class {
            key: TypeKey::of::<T>(),
            seed: None,
        }
    }

    /// Canonicalises the token into a name key.
    ///
    /// # Errors
    /// [`WiringError::InvalidArgument`] for an empty name or a symbol
    /// without a description.
    pub fn canonicalize(&self) -> Result<Key> {
        match self {
            Token::Class { key, .. } => Ok(Key::name(key.class_name())),
            Token::Name(name) if name.is_empty() => Err(WiringError::InvalidArgument(
                "token name must not be empty".into(),
            )),
            Token::Name(name) => Ok(Key::name(name.as_str())),
            Token::Symbol(symbol) => match symbol.description() {
                Some(description) if !description.is_empty() => Ok(Key::name(description)),
                _ => Err(WiringError::InvalidArgument(
                    "a symbol token needs a non-empty description".into(),
                )),
            },
        }
    }

    /// The constructor `to_self` binds to, if any.
    pub(crate) fn seed(&self) -> Option<Constructor> {
        match self {
            Token::Class { seed, .. } => *seed,
            _ => None,
        }
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::Name(name.to_owned())
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::Name(name)
    }
}

impl From<Symbol> for Token {
    fn from(symbol: Symbol) -> Self {
        Token::Symbol(symbol)
    }
}

impl From<&Symbol> for Token {
    fn from(symbol: &Symbol) -> Self {
        Token::Symbol(symbol.clone())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Class { key, seed } => f
                .debug_struct("Token::Class")
                .field("key", key)
                .field("seeded", &seed.is_some())
                .finish(),
            Token::Name(name) => write!(f, "Token::Name({name:?})"),
            Token::Symbol(symbol) => write!(f, "Token::{symbol:?}"),
        }
    }
}
