//! Weak identity cache for objects seen in earlier calls.
//!
//! Callers get instance ids back in responses and hand them in on later
//! calls. The cache maps those ids back to the live objects without keeping
//! anything alive: entries are `Weak`, and an entry whose target was
//! finalized or destroyed reads as a miss.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::host::downcast_object;
use crate::{HostObject, InstanceId};

/// Thread-safe map from instance id to a non-owning object reference.
#[derive(Default)]
pub struct IdentityCache {
    entries: RwLock<FxHashMap<InstanceId, Weak<dyn HostObject>>>,
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}

impl IdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `obj` under its identity and return the identity.
    ///
    /// Registering the same object again refreshes the one entry in place.
    pub fn register(&self, obj: &Arc<dyn HostObject>) -> InstanceId {
        let id = obj.instance_id();
        self.entries.write().insert(id, Arc::downgrade(obj));
        id
    }

    /// Typed convenience over [`IdentityCache::register`].
    pub fn register_typed<T: HostObject>(&self, obj: &Arc<T>) -> InstanceId {
        let id = obj.instance_id();
        let weak: Weak<dyn HostObject> = Arc::downgrade(obj) as Weak<dyn HostObject>;
        self.entries.write().insert(id, weak);
        id
    }

    /// The live object registered under `id`, if any.
    ///
    /// A finalized target, a destroyed target, or an entry left over from an
    /// earlier holder of a recycled id all read as `None`.
    #[must_use]
    pub fn resolve(&self, id: InstanceId) -> Option<Arc<dyn HostObject>> {
        let strong = self.entries.read().get(&id)?.upgrade()?;
        (strong.is_alive() && strong.instance_id() == id).then_some(strong)
    }

    /// Resolve and downcast. A type mismatch is a miss.
    #[must_use]
    pub fn resolve_as<T: HostObject>(&self, id: InstanceId) -> Option<Arc<T>> {
        downcast_object(self.resolve(id)?)
    }

    /// Drop entries whose target is gone. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, weak| weak.upgrade().is_some_and(|obj| obj.is_alive()));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "swept identity cache");
        }
        removed
    }

    /// Number of entries, stale ones included until the next sweep.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
