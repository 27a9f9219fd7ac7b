//! Derive macros for wiring.
//!
//! Re-exported by the `wiring` facade; depend on that crate instead.

pub use wiring_macros::Injectable;
