//! Registration storage.
//!
//! The registry maps a [`Key`] to a shared [`Registration`]. It is a plain
//! map; duplicate and removal policy belong to the front-ends, which pick
//! [`Registry::replace`] or [`Registry::try_insert`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{AlreadyRegisteredError, Result, WiringError};
use crate::key::Key;
use crate::registration::{Registration, RegistrationKind};

/// Stores all registrations of one container.
#[derive(Debug, Default, Clone)]
pub(crate) struct Registry {
    registrations: HashMap<Key, Arc<dyn Registration>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a registration under `key`, replacing any earlier one.
    pub fn replace(&mut self, key: Key, registration: Arc<dyn Registration>) {
        debug!(key = %key, kind = ?registration.kind(), "Registered");
        if self.registrations.insert(key.clone(), registration).is_some() {
            trace!(key = %key, "Replaced previous registration");
        }
    }

    /// Stores a registration under a key not yet present.
    ///
    /// # Errors
    /// [`WiringError::AlreadyRegistered`] if the key is present.
    pub fn try_insert(&mut self, key: Key, registration: Arc<dyn Registration>) -> Result<()> {
        if self.registrations.contains_key(&key) {
            return Err(WiringError::AlreadyRegistered(AlreadyRegisteredError { key }));
        }

        self.replace(key, registration);
        Ok(())
    }

    /// Removes the registration for `key`, returning it if present.
    pub fn remove(&mut self, key: &Key) -> Option<Arc<dyn Registration>> {
        let removed = self.registrations.remove(key);
        if removed.is_some() {
            debug!(key = %key, "Unregistered");
        }
        removed
    }

    /// Looks up a registration; the `Arc` is cloned so the caller can
    /// release the lock guarding the registry before resolving.
    pub fn get(&self, key: &Key) -> Option<Arc<dyn Registration>> {
        self.registrations.get(key).cloned()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.registrations.contains_key(key)
    }

    /// Shallow copy of `self` overlaid by `other`; `other` wins on
    /// collisions. Registrations are shared, not rebuilt.
    pub fn overlay(&self, other: &Registry) -> Registry {
        let mut merged = self.clone();
        for (key, registration) in &other.registrations {
            merged.registrations.insert(key.clone(), registration.clone());
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.registrations.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries: self.registrations.clone(),
        }
    }
}

/// A point-in-time copy of a container's registrations.
///
/// Later registrations or removals on the container do not show up here.
#[derive(Debug, Clone)]
pub struct Snapshot {
    entries: HashMap<Key, Arc<dyn Registration>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&Arc<dyn Registration>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up a name key by its text.
    pub fn get_name(&self, name: &str) -> Option<&Arc<dyn Registration>> {
        self.entries.get(&Key::name(name))
    }

    /// The variant stored under each key.
    pub fn kinds(&self) -> HashMap<Key, RegistrationKind> {
        self.entries
            .iter()
            .map(|(key, registration)| (key.clone(), registration.kind()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Arc<dyn Registration>)> {
        self.entries.iter()
    }
}
