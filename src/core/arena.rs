//! Generational arena for entity storage
//!
//! Hosts keep their units, camps and obstacles here and hand out
//! `EntityHandle`s. A handle stays valid until its entity is removed; after
//! that the slot's generation moves on and every old handle reads as dead.

use crate::core::types::EntityHandle;

/// Anything that can answer "is this handle still a live entity?"
pub trait EntityRegistry {
    fn is_alive(&self, handle: EntityHandle) -> bool;
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> EntityHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return EntityHandle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        EntityHandle::new(index, 0)
    }

    /// Remove an entity, invalidating every outstanding handle to it
    pub fn remove(&mut self, handle: EntityHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (EntityHandle::new(index as u32, slot.generation), value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (EntityHandle::new(index as u32, generation), value))
        })
    }
}

impl<T> EntityRegistry for Arena<T> {
    fn is_alive(&self, handle: EntityHandle) -> bool {
        self.contains(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena = Arena::new();
        let a = arena.insert("rifleman");
        let b = arena.insert("scout");

        assert_eq!(arena.get(a), Some(&"rifleman"));
        assert_eq!(arena.get(b), Some(&"scout"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_removed_handle_is_dead() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        assert!(arena.is_alive(a));

        assert_eq!(arena.remove(a), Some(1));
        assert!(!arena.is_alive(a));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_reused_slot_does_not_revive_old_handle() {
        let mut arena = Arena::new();
        let old = arena.insert(1);
        arena.remove(old);
        let new = arena.insert(2);

        assert_eq!(old.index, new.index);
        assert_ne!(old, new);
        assert!(!arena.is_alive(old));
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        assert!(arena.remove(a).is_some());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.len(), 0);
    }
}
