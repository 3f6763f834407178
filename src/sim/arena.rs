//! Slot arena holding the active entity collection
//!
//! Ids are slot indices and stay valid for the lifetime of a level. Removal
//! leaves an empty slot, so iteration order is always insertion order.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
    live: usize,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next `insert_with` call will hand out
    pub fn next_id(&self) -> EntityId {
        EntityId(self.slots.len() as u32)
    }

    /// Insert an entity built for a freshly allocated id
    pub fn insert_with(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = self.next_id();
        let mut entity = build(id);
        entity.id = id;
        self.slots.push(Some(entity));
        self.live += 1;
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Temporarily lift an entity out of its slot while it is being updated.
    /// The slot stays reserved; pair with `restore`.
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        self.slots.get_mut(id.0 as usize).and_then(Option::take)
    }

    /// Put a taken entity back into its own slot
    pub fn restore(&mut self, entity: Entity) {
        if let Some(slot) = self.slots.get_mut(entity.id.0 as usize) {
            if slot.is_some() {
                log::error!("restore into occupied slot {:?}, dropping", entity.id);
                return;
            }
            *slot = Some(entity);
        } else {
            log::error!("restore into unknown slot {:?}, dropping", entity.id);
        }
    }

    /// Permanently remove an entity. Only call between update passes.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.take(id);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Ids of live entities in insertion order (snapshot, safe to hold while mutating)
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|e| e.id).collect()
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.iter().filter(|e| e.kind == kind).count()
    }

    pub fn first_of_kind(&self, kind: EntityKind) -> Option<&Entity> {
        self.iter().find(|e| e.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rect::Rect;

    fn arena_with_blocks(n: u32) -> EntityArena {
        let mut arena = EntityArena::new();
        for i in 0..n {
            arena.insert_with(|id| Entity::block(id, Rect::tile(32.0 * i as f64, 0.0)));
        }
        arena
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let arena = arena_with_blocks(3);
        assert_eq!(arena.ids(), vec![EntityId(0), EntityId(1), EntityId(2)]);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_remove_keeps_other_ids_stable() {
        let mut arena = arena_with_blocks(3);
        assert!(arena.remove(EntityId(1)).is_some());
        assert!(arena.remove(EntityId(1)).is_none());
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.ids(), vec![EntityId(0), EntityId(2)]);
        assert_eq!(arena.get(EntityId(2)).map(|e| e.bounds.x()), Some(64.0));

        // New inserts never reuse a removed slot
        let id = arena.insert_with(|id| Entity::portal(id, Rect::default()));
        assert_eq!(id, EntityId(3));
    }

    #[test]
    fn test_take_and_restore() {
        let mut arena = arena_with_blocks(2);
        let taken = arena.take(EntityId(0)).expect("slot 0 is live");
        assert_eq!(arena.iter().count(), 1);
        arena.restore(taken);
        assert_eq!(arena.ids(), vec![EntityId(0), EntityId(1)]);
        assert_eq!(arena.len(), 2);
    }
}
