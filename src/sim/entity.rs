//! Entity model
//!
//! Entities are a closed set of kinds. Shared data (bounds, collidability, sprite)
//! lives on `Entity`; kind-specific data lives in the `Body` payload.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Stable handle to an entity slot in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Non-owning handle to an externally loaded sprite image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u16);

/// Movement direction. Only one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// The four real directions, in movable-mask index order
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Index into a `MovableMask`, `None` for `Direction::None`
    pub fn index(self) -> Option<usize> {
        match self {
            Direction::Up => Some(0),
            Direction::Down => Some(1),
            Direction::Left => Some(2),
            Direction::Right => Some(3),
            Direction::None => None,
        }
    }

    /// Unit step in screen coordinates (y grows downward)
    pub fn unit(self) -> DVec2 {
        match self {
            Direction::Up => DVec2::NEG_Y,
            Direction::Down => DVec2::Y,
            Direction::Left => DVec2::NEG_X,
            Direction::Right => DVec2::X,
            Direction::None => DVec2::ZERO,
        }
    }
}

/// Per-direction "free to move" flags, indexed by `Direction::index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovableMask(pub [bool; 4]);

impl Default for MovableMask {
    fn default() -> Self {
        Self([true; 4])
    }
}

impl MovableMask {
    pub fn get(&self, dir: Direction) -> bool {
        dir.index().is_some_and(|i| self.0[i])
    }

    pub fn set(&mut self, dir: Direction, free: bool) {
        if let Some(i) = dir.index() {
            self.0[i] = free;
        }
    }

    pub fn any_free(&self) -> bool {
        self.0.contains(&true)
    }

    /// Directions currently free, in mask order
    pub fn free_directions(&self) -> Vec<Direction> {
        Direction::ALL.into_iter().filter(|d| self.get(*d)).collect()
    }
}

/// Entity kind tag. Drives collision reactions and event eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityKind {
    #[default]
    Undefined,
    Block,
    Player,
    Enemy,
    Collectable,
    Portal,
}

/// Movement state shared by players and enemies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Motion {
    pub speed: f64,
    pub moving: bool,
    pub direction: Direction,
    pub movable: MovableMask,
}

impl Motion {
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }

    /// Come to rest with no direction
    pub fn halt(&mut self) {
        self.direction = Direction::None;
        self.moving = false;
    }
}

/// What a collectable grants when picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectKind {
    Score,
    Powerup,
    Item,
    #[default]
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collectable {
    pub collect_kind: CollectKind,
    pub value: u32,
    pub picked_up: bool,
}

/// Kind-specific payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Body {
    /// Blocks, portals and undefined objects carry no extra state
    Static,
    Player { motion: Motion, health: u32 },
    Enemy { motion: Motion },
    Collectable(Collectable),
}

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub bounds: Rect,
    pub collidable: bool,
    pub sprite: Option<SpriteId>,
    pub body: Body,
}

impl Entity {
    fn with_body(id: EntityId, kind: EntityKind, bounds: Rect, body: Body) -> Self {
        Self {
            id,
            kind,
            bounds,
            collidable: true,
            sprite: None,
            body,
        }
    }

    /// Generic object with no behavior
    pub fn undefined(id: EntityId, bounds: Rect) -> Self {
        Self::with_body(id, EntityKind::Undefined, bounds, Body::Static)
    }

    pub fn block(id: EntityId, bounds: Rect) -> Self {
        Self::with_body(id, EntityKind::Block, bounds, Body::Static)
    }

    pub fn portal(id: EntityId, bounds: Rect) -> Self {
        Self::with_body(id, EntityKind::Portal, bounds, Body::Static)
    }

    pub fn player(id: EntityId, bounds: Rect, speed: f64, health: u32) -> Self {
        Self::with_body(
            id,
            EntityKind::Player,
            bounds,
            Body::Player {
                motion: Motion::new(speed),
                health,
            },
        )
    }

    /// Enemies start stationary; the spawner picks their first direction
    pub fn enemy(id: EntityId, bounds: Rect, speed: f64) -> Self {
        Self::with_body(
            id,
            EntityKind::Enemy,
            bounds,
            Body::Enemy {
                motion: Motion::new(speed),
            },
        )
    }

    pub fn collectable(id: EntityId, bounds: Rect, collect_kind: CollectKind, value: u32) -> Self {
        Self::with_body(
            id,
            EntityKind::Collectable,
            bounds,
            Body::Collectable(Collectable {
                collect_kind,
                value,
                picked_up: false,
            }),
        )
    }

    pub fn with_sprite(mut self, sprite: SpriteId) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn is_block(&self) -> bool {
        self.kind == EntityKind::Block
    }

    pub fn motion(&self) -> Option<&Motion> {
        match &self.body {
            Body::Player { motion, .. } | Body::Enemy { motion } => Some(motion),
            _ => None,
        }
    }

    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        match &mut self.body {
            Body::Player { motion, .. } | Body::Enemy { motion } => Some(motion),
            _ => None,
        }
    }

    /// Player health, `None` for every other kind
    pub fn health(&self) -> Option<u32> {
        match self.body {
            Body::Player { health, .. } => Some(health),
            _ => None,
        }
    }
}
