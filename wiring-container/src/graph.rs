//! Dependency graph validation.
//!
//! Walks the declared dependencies of every class registration without
//! constructing anything:
//! - Checks that every dependency is registered
//! - Checks that every dependency is marked injectable
//! - Detects circular dependencies
//!
//! Instances and factories are leaves: they take no constructor
//! arguments.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::error::{CircularDependencyError, NotInjectableError, Result, WiringError};
use crate::key::{Key, TypeKey};
use crate::metadata::MetadataProvider;
use crate::registry::Snapshot;
use crate::resolver::Core;

/// Validates the dependency graph of one container.
///
/// # Algorithm
/// Depth-first search from every registered key. A "visiting" set
/// detects cycles and the current path is kept for error reporting.
pub(crate) struct GraphValidator<'c> {
    core: &'c Core,
    /// Copy of the registry, so no lock is held while walking.
    snapshot: Snapshot,
    /// Currently being visited (for cycle detection)
    visiting: HashSet<Key>,
    /// Already validated (cache)
    validated: HashSet<Key>,
    /// Current DFS path (for error reporting)
    path: Vec<Key>,
}

impl<'c> GraphValidator<'c> {
    pub fn new(core: &'c Core) -> Self {
        Self {
            core,
            snapshot: core.snapshot(),
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Validates the entire dependency graph.
    ///
    /// # Errors
    /// - [`WiringError::NotRegistered`]: missing dependency
    /// - [`WiringError::NotInjectable`]: dependency lacks the mark
    /// - [`WiringError::CircularDependency`]: cycle detected
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(mut self) -> Result<()> {
        let mut keys: Vec<Key> = self.snapshot.iter().map(|(key, _)| key.clone()).collect();
        keys.sort_by_key(Key::label);

        debug!(registrations = keys.len(), "Starting dependency graph validation");

        for key in keys {
            self.validate_key(&key)?;
        }

        debug!("Dependency graph validation passed");
        Ok(())
    }

    fn validate_key(&mut self, key: &Key) -> Result<()> {
        if self.validated.contains(key) {
            return Ok(());
        }

        if self.visiting.contains(key) {
            let start = self.path.iter().position(|k| k == key).unwrap_or(0);
            let mut chain = self.path[start..].to_vec();
            chain.push(key.clone());

            warn!(cycle = ?chain, "Circular dependency detected");
            return Err(WiringError::CircularDependency(CircularDependencyError { chain }));
        }

        let Some(registration) = self.snapshot.get(key) else {
            return Err(self.core.not_registered(key, self.path.last().cloned()));
        };

        // Instances and factories have no constructor arguments.
        let Some(target) = registration.target() else {
            self.validated.insert(key.clone());
            return Ok(());
        };

        self.visiting.insert(key.clone());
        self.path.push(key.clone());

        for dependency in self.dependencies_of(&target)? {
            let dependency_key = self.core.scheme().key_for(&dependency);
            self.validate_key(&dependency_key)?;
        }

        self.path.pop();
        self.visiting.remove(key);
        self.validated.insert(key.clone());

        Ok(())
    }

    /// Declared dependencies of `target`, all checked for the injectable
    /// mark.
    fn dependencies_of(&self, target: &TypeKey) -> Result<Vec<TypeKey>> {
        let catalog = self.core.catalog();
        let dependencies = catalog.dependency_types(target).unwrap_or_default();

        match dependencies.iter().find(|d| !catalog.is_injectable(d)) {
            Some(dependency) => Err(WiringError::NotInjectable(NotInjectableError {
                key: *dependency,
                required_by: *target,
            })),
            None => Ok(dependencies),
        }
    }
}
