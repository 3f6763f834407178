//! Pickup and level-exit notifications
//!
//! Entities never touch score or level state. The resolver raises a typed event
//! inline; the tick drains the queue after the update pass and applies it.
//! Only subscribed sources can raise events, and blocks are never subscribed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::arena::EntityArena;
use super::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A collectable touched the player
    PickedUp { id: EntityId, value: u32 },
    /// A portal touched the player
    LevelComplete { id: EntityId },
}

impl GameEvent {
    pub fn source(&self) -> EntityId {
        match *self {
            GameEvent::PickedUp { id, .. } | GameEvent::LevelComplete { id } => id,
        }
    }
}

/// Per-tick event buffer with a subscription filter
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    subscribers: BTreeSet<EntityId>,
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all subscriptions and pending events, then subscribe every
    /// non-block entity in the arena
    pub fn resubscribe(&mut self, arena: &EntityArena) {
        self.subscribers.clear();
        self.events.clear();
        self.subscribers
            .extend(arena.iter().filter(|e| !e.is_block()).map(|e| e.id));
        log::debug!("{} event sources subscribed", self.subscribers.len());
    }

    pub fn is_subscribed(&self, id: EntityId) -> bool {
        self.subscribers.contains(&id)
    }

    /// Raise an event. Events from unsubscribed sources are dropped.
    pub fn send(&mut self, event: GameEvent) -> bool {
        if !self.is_subscribed(event.source()) {
            log::warn!("dropping {:?} from unsubscribed source", event);
            return false;
        }
        self.events.push(event);
        true
    }

    /// Take all pending events in the order they were raised
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
