//! Slot+generation handle table backing the node registry.
//!
//! Freed handles carry a stale generation and resolve to `None` instead of
//! reaching a reused slot. Double-remove is a safe no-op.

use vellum_core::NodeHandle;

/// Handle encoding: upper 32 bits = slot index, lower 32 bits = generation.
fn encode(slot: u32, generation: u32) -> NodeHandle {
    NodeHandle::from_raw((u64::from(slot) << 32) | u64::from(generation))
}

fn decode(handle: NodeHandle) -> (u32, u32) {
    let raw = handle.to_raw();
    ((raw >> 32) as u32, raw as u32)
}

/// First generation issued for a fresh slot. Generation 0 is never live,
/// so the raw handle `0` can serve as the null handle.
const FIRST_GENERATION: u32 = 1;

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// A slot+generation table mapping [`NodeHandle`]s to owned values.
///
/// Reuses slots via a free list. Generation counters increment on removal,
/// so a handle is valid from its `insert` until its `remove` and never again.
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
    limit: Option<u32>,
}

impl<T> HandleTable<T> {
    /// Create an empty table with no live-entry limit.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            limit: None,
        }
    }

    /// Create an empty table with preallocated slots and an optional limit
    /// on simultaneously live entries.
    pub fn with_capacity(capacity: usize, limit: Option<u32>) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
            limit,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    /// The configured live-entry limit, if any.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Whether another insert would exceed the live-entry limit.
    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.live >= limit as usize)
    }

    /// Insert a value and return its handle.
    ///
    /// Returns `None` (dropping the value) if the table is full or the slot
    /// index space is exhausted.
    pub fn insert(&mut self, value: T) -> Option<NodeHandle> {
        if self.is_full() {
            return None;
        }
        let handle = if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            encode(slot_idx, slot.generation)
        } else {
            let slot_idx = u32::try_from(self.slots.len()).ok()?;
            self.slots.push(Slot {
                generation: FIRST_GENERATION,
                data: Some(value),
            });
            encode(slot_idx, FIRST_GENERATION)
        };
        self.live += 1;
        Some(handle)
    }

    /// Whether the handle refers to a live entry.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Get an immutable reference to the value behind a handle.
    ///
    /// Returns `None` if the handle is null, stale, or was never issued.
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let (slot_idx, generation) = decode(handle);
        let slot = self.slots.get(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.data.as_ref()
    }

    /// Get a mutable reference to the value behind a handle.
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let (slot_idx, generation) = decode(handle);
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.data.as_mut()
    }

    /// Remove the value behind a handle, returning it.
    ///
    /// Bumps the slot's generation and returns the slot to the free list.
    /// A slot whose generation wraps to 0 is retired instead, so no stale
    /// handle from an earlier epoch can ever match it again.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let (slot_idx, generation) = decode(handle);
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_list.push(slot_idx);
        }
        self.live -= 1;
        Some(value)
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_round_trip() {
        let mut table = HandleTable::new();
        let h = table.insert(42i32).unwrap();
        assert_eq!(table.get(h), Some(&42));
        assert!(table.contains(h));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn null_handle_never_resolves() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32).unwrap();
        assert!(!h.is_null(), "first handle must not collide with null");
        assert_eq!(table.get(NodeHandle::NULL), None);
    }

    #[test]
    fn get_mut_modifies_value() {
        let mut table = HandleTable::new();
        let h = table.insert(10i32).unwrap();
        *table.get_mut(h).unwrap() = 20;
        assert_eq!(table.get(h), Some(&20));
    }

    #[test]
    fn remove_invalidates_handle() {
        let mut table = HandleTable::new();
        let h = table.insert(99i32).unwrap();
        assert_eq!(table.remove(h), Some(99));
        assert_eq!(table.get(h), None);
        assert_eq!(table.get_mut(h), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn double_remove_is_noop() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32).unwrap();
        let other = table.insert(2i32).unwrap();
        assert_eq!(table.remove(h), Some(1));
        assert_eq!(table.remove(h), None);
        assert_eq!(table.get(other), Some(&2), "other handles unaffected");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn free_list_reuses_slot_with_new_generation() {
        let mut table = HandleTable::new();
        let h1 = table.insert(1i32).unwrap();
        table.remove(h1);
        let h2 = table.insert(2i32).unwrap();
        let (slot1, gen1) = decode(h1);
        let (slot2, gen2) = decode(h2);
        assert_eq!(slot1, slot2);
        assert_eq!(gen2, gen1 + 1);
        assert_eq!(table.get(h1), None, "old handle must stay stale");
        assert_eq!(table.get(h2), Some(&2));
    }

    #[test]
    fn never_issued_handle_returns_none() {
        let table: HandleTable<i32> = HandleTable::new();
        assert_eq!(table.get(encode(999, 1)), None);
    }

    #[test]
    fn limit_rejects_insert_until_space_frees() {
        let mut table = HandleTable::with_capacity(4, Some(2));
        let a = table.insert(1i32).unwrap();
        let _b = table.insert(2i32).unwrap();
        assert!(table.is_full());
        assert_eq!(table.insert(3), None);
        table.remove(a);
        assert!(table.insert(3).is_some());
    }

    #[test]
    fn generation_exhaustion_retires_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32).unwrap();
        table.remove(h);

        table.slots[0].generation = u32::MAX;
        let h2 = table.insert(2i32).unwrap();
        assert_eq!(decode(h2), (0, u32::MAX));

        // Remove wraps generation to 0: slot must not be recycled.
        table.remove(h2);
        assert_eq!(table.slots[0].generation, 0);
        assert!(
            !table.free_list.contains(&0),
            "slot with wrapped generation must be retired"
        );
        assert_eq!(table.get(NodeHandle::NULL), None);

        let h3 = table.insert(3i32).unwrap();
        assert_ne!(decode(h3).0, 0, "retired slot must not be reused");
    }
}
