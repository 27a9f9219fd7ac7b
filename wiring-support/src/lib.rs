//! # Wiring Support
//!
//! Shared text helpers for the wiring DI crates.
//!
//! This crate provides:
//! - Short class names derived from Rust type paths (used for name keys)
//! - Dependency chain rendering for cycle errors
//! - "Did you mean?" suggestions for missing registrations

pub mod rendering;
