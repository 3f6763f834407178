//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (arena insertion order)
//! - No rendering, threading or platform dependencies

pub mod arena;
pub mod collision;
pub mod entity;
pub mod events;
pub mod level;
pub mod movement;
pub mod rect;
pub mod state;
pub mod tick;

pub use arena::EntityArena;
pub use collision::{find_hit, movable_mask, probe_point, snap_flush};
pub use entity::{
    Body, CollectKind, Collectable, Direction, Entity, EntityId, EntityKind, Motion, MovableMask, SpriteId,
};
pub use events::{EventQueue, GameEvent};
pub use level::{Level, LevelError, Tile, cell_position};
pub use movement::{StepContext, StepOutcome, advance, randomize_direction};
pub use rect::Rect;
pub use state::{GamePhase, GameState};
pub use tick::{PlayerIntent, TickInput, TickReport, tick};
