//! Core container implementation for wiring DI.
//!
//! Two front-ends share one resolution engine:
//! - [`Container`]: keyed by type identity, lenient
//! - [`TokenContainer`]: keyed by name, strict, with a fluent [`Binding`]

pub mod binding;
pub mod container;
pub mod error;
mod graph;
pub mod injectable;
pub mod key;
pub mod metadata;
pub mod registration;
mod registry;
mod resolver;
pub mod scope;
pub mod settings;
pub mod token;
pub mod token_container;

pub use binding::Binding;
pub use container::{Container, ContainerBuilder, prelude};
pub use error::{Result, WiringError};
pub use injectable::{Arguments, Constructor, Implements, Injectable, Instance};
pub use key::{Key, TypeKey};
pub use metadata::{Catalog, Declaration, Declarations, MetadataProvider, TypeInfo};
pub use registration::RegistrationKind;
pub use registry::Snapshot;
pub use scope::Scope;
pub use settings::Settings;
pub use token::{Symbol, Token};
pub use token_container::{TokenContainer, TokenContainerBuilder};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
