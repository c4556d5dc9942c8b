//! Instance id allocation with recycling.
//!
//! Freed ids go on a free list and are handed out again before fresh ones,
//! so an id a caller saw earlier may later name a different object.

use probe_core::InstanceId;

/// Allocator for host instance ids.
///
/// Ids start at 1. A freed id is reused by the next allocation.
#[derive(Debug, Default)]
pub struct InstanceIdAllocator {
    /// Whether each id (offset by one) is currently handed out.
    live: Vec<bool>,
    /// Recycled ids, most recently freed last.
    free_list: Vec<InstanceId>,
    alive_count: u32,
}

impl InstanceIdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            live: Vec::new(),
            free_list: Vec::new(),
            alive_count: 0,
        }
    }

    /// Allocate an id, preferring the most recently freed one.
    pub fn allocate(&mut self) -> InstanceId {
        self.alive_count += 1;

        if let Some(id) = self.free_list.pop() {
            if let Some(index) = slot(id) {
                self.live[index] = true;
            }
            id
        } else {
            self.live.push(true);
            self.live.len() as InstanceId
        }
    }

    /// Return an id to the free list.
    ///
    /// Returns `false` if the id was never allocated or is already free.
    pub fn deallocate(&mut self, id: InstanceId) -> bool {
        let Some(live) = slot(id).and_then(|index| self.live.get_mut(index)) else {
            return false;
        };
        if !*live {
            return false;
        }

        *live = false;
        self.free_list.push(id);
        self.alive_count -= 1;
        true
    }

    /// Check if an id is currently handed out.
    #[must_use]
    pub fn is_alive(&self, id: InstanceId) -> bool {
        slot(id)
            .and_then(|index| self.live.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Number of ids currently handed out.
    #[must_use]
    pub const fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Number of distinct ids ever handed out.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.live.len()
    }
}

fn slot(id: InstanceId) -> Option<usize> {
    usize::try_from(id).ok()?.checked_sub(1)
}
