//=========================================================================
// Entity Pool
//=========================================================================
//
// Pre-allocated, recyclable storage for short-lived entities.
//
// Architecture:
//   slots: Vec<Slot<T>>   (item + active flag + generation)
//   free:  Vec<usize>     (indices of inactive slots only)
//
//   acquire() → pop free slot, or grow (overflow allocation)
//   release() → reset item, bump generation, push back to free
//
// Handles carry the generation they were issued with, so a handle kept
// past its release no longer resolves.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace};

//=== Poolable ============================================================

/// Entity that can live in an [`EntityPool`].
pub trait Poolable: Default {
    /// Clears owner and motion state when the entity is recycled.
    fn reset(&mut self);
}

//=== PoolHandle ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    item: T,
    active: bool,
    generation: u32,
}

//=== EntityPool ==========================================================

pub struct EntityPool<T: Poolable> {
    name: &'static str,
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    capacity: usize,
    overflow: usize,
}

impl<T: Poolable> EntityPool<T> {
    /// Pre-allocates `capacity` inactive entities.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                item: T::default(),
                active: false,
                generation: 0,
            })
            .collect();

        Self {
            name,
            slots,
            // Reversed so the lowest index is handed out first.
            free: (0..capacity).rev().collect(),
            capacity,
            overflow: 0,
        }
    }

    //--- Allocation -------------------------------------------------------

    /// Takes an inactive entity, growing the pool if none is free.
    pub fn acquire(&mut self) -> (PoolHandle, &mut T) {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.overflow += 1;
                debug!(
                    target: "tank_battle",
                    "{} pool exhausted, overflow allocation #{}",
                    self.name, self.overflow
                );
                self.slots.push(Slot {
                    item: T::default(),
                    active: false,
                    generation: 0,
                });
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        debug_assert!(!slot.active, "free list held an active slot");
        slot.active = true;

        let handle = PoolHandle {
            index: index as u32,
            generation: slot.generation,
        };
        (handle, &mut slot.item)
    }

    /// Returns an entity to the pool. Stale or inactive handles are a no-op.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let index = handle.index as usize;
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };

        if !slot.active || slot.generation != handle.generation {
            trace!(target: "tank_battle", "Ignoring release of stale {} handle {:?}", self.name, handle);
            return false;
        }

        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.item.reset();
        self.free.push(index);
        true
    }

    /// Releases every active entity.
    pub fn release_all(&mut self) {
        let handles: Vec<_> = self.iter().map(|(handle, _)| handle).collect();
        for handle in handles {
            self.release(handle);
        }
    }

    //--- Access -----------------------------------------------------------

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &slot.item)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &mut slot.item)
    }

    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Active entities with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (
                PoolHandle {
                    index: i as u32,
                    generation: s.generation,
                },
                &s.item,
            )
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| {
                (
                    PoolHandle {
                        index: i as u32,
                        generation: s.generation,
                    },
                    &mut s.item,
                )
            })
    }

    //--- Statistics -------------------------------------------------------

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Pre-allocated size, excluding overflow.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflow_allocations(&self) -> usize {
        self.overflow
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
