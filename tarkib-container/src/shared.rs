//! Shared-instance cache — process-lifetime singletons by type name.
//!
//! The cache only grows; there is no eviction or teardown. The
//! check-then-create sequence on the shared-get path runs outside the
//! lock (creation may recurse back into the container), so insertion
//! re-checks under the write lock and the first writer wins: a race may
//! construct an instance twice, but every caller observes the same
//! cached instance.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::registry::Instance;

pub(crate) struct SharedInstanceCache {
    instances: RwLock<HashMap<String, Instance>>,
}

impl SharedInstanceCache {
    /// Creates a cache pre-seeded with externally built singletons.
    pub fn new(seed: HashMap<String, Instance>) -> Self {
        Self {
            instances: RwLock::new(seed),
        }
    }

    /// Returns the cached instance for `type_name`, if any.
    pub fn peek(&self, type_name: &str) -> Option<Instance> {
        self.instances.read().get(type_name).cloned()
    }

    /// Caches `instance` under `type_name` unless an entry already
    /// exists, and returns whichever instance is cached afterwards.
    pub fn insert_if_absent(&self, type_name: &str, instance: Instance) -> Instance {
        let mut instances = self.instances.write();
        let cached = instances
            .entry(type_name.to_string())
            .or_insert_with(|| {
                debug!(type_name, "cached shared instance");
                instance
            });
        cached.clone()
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }
}
