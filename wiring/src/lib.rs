//! # wiring: Dependency Injection Container for Rust
//!
//! Types declare their constructor dependencies, the container builds the
//! object graph.
//!
//! ```rust
//! use std::sync::Arc;
//! use wiring::{Container, Injectable};
//!
//! #[derive(Injectable)]
//! struct UserService;
//!
//! #[derive(Injectable)]
//! #[injectable(supports_only)]
//! struct UserController {
//!     users: Arc<UserService>,
//! }
//!
//! let container = Container::new();
//! container.register_singleton::<UserService>().unwrap();
//! container.register_transient::<UserController>().unwrap();
//!
//! let controller = container.resolve::<UserController>().unwrap();
//! assert!(Arc::ptr_eq(&controller.users, &container.resolve::<UserService>().unwrap()));
//! ```

// Lets the derive macro's `::wiring` paths resolve inside this crate too.
extern crate self as wiring;

pub use wiring_container::*;
pub use wiring_derive::*;
pub use wiring_support::*;
