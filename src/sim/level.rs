//! Character-grid levels and the spawner that turns them into entities
//!
//! Legend:
//! - `x` wall block
//! - `-` empty
//! - `P` player start (exactly one)
//! - `e` enemy
//! - `o` score collectable
//! - `s` portal to the next level
//!
//! Cell (row, col) sits at pixel `(32 * col, 32 + 32 * row)`; the top 32 pixels
//! are left for the status bar.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use thiserror::Error;

use super::arena::EntityArena;
use super::entity::{CollectKind, Entity, EntityId, SpriteId};
use super::rect::Rect;
use crate::consts::{MAP_TOP_OFFSET, TILE_SIZE};
use crate::settings::Settings;

/// Sprite handles, in the order the host registers its images
pub mod sprites {
    use super::SpriteId;

    pub const PLAYER: SpriteId = SpriteId(0);
    pub const BLOCK: SpriteId = SpriteId(1);
    pub const ENEMY: SpriteId = SpriteId(2);
    pub const COLLECTABLE: SpriteId = SpriteId(3);
    pub const PORTAL: SpriteId = SpriteId(4);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,
    #[error("no levels to play")]
    NoLevels,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("unknown tile {ch:?} at row {row}, col {col}")]
    UnknownTile { ch: char, row: usize, col: usize },
    #[error("level has no player start")]
    MissingPlayer,
    #[error("level has {0} player starts, expected one")]
    MultiplePlayers(usize),
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Wall,
    PlayerStart,
    Enemy,
    Collectable,
    Portal,
}

impl Tile {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '-' => Some(Tile::Empty),
            'x' => Some(Tile::Wall),
            'P' => Some(Tile::PlayerStart),
            'e' => Some(Tile::Enemy),
            'o' => Some(Tile::Collectable),
            's' => Some(Tile::Portal),
            _ => None,
        }
    }
}

/// World position of a grid cell's top-left corner
pub fn cell_position(row: usize, col: usize) -> DVec2 {
    DVec2::new(TILE_SIZE * col as f64, MAP_TOP_OFFSET + TILE_SIZE * row as f64)
}

/// Immutable level layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub name: String,
    tiles: Vec<Vec<Tile>>,
    player_start: (usize, usize),
}

/// Result of spawning a level into a fresh arena
#[derive(Debug)]
pub struct Spawned {
    pub arena: EntityArena,
    pub player: EntityId,
    pub player_start: DVec2,
}

impl Level {
    /// Parse a grid, one row per line. Blank lines and surrounding whitespace are ignored.
    pub fn parse(name: &str, text: &str) -> Result<Self, LevelError> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let width = rows.first().ok_or(LevelError::Empty)?.chars().count();

        let mut tiles = Vec::with_capacity(rows.len());
        let mut starts = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LevelError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            let mut cells = Vec::with_capacity(width);
            for (col, ch) in line.chars().enumerate() {
                let tile = Tile::from_char(ch).ok_or(LevelError::UnknownTile { ch, row, col })?;
                if tile == Tile::PlayerStart {
                    starts.push((row, col));
                }
                cells.push(tile);
            }
            tiles.push(cells);
        }

        let player_start = match starts.as_slice() {
            [] => return Err(LevelError::MissingPlayer),
            [start] => *start,
            many => return Err(LevelError::MultiplePlayers(many.len())),
        };

        Ok(Self {
            name: name.to_string(),
            tiles,
            player_start,
        })
    }

    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    pub fn cols(&self) -> usize {
        self.tiles.first().map_or(0, Vec::len)
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<Tile> {
        self.tiles.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Grid cell of the player start
    pub fn player_start_cell(&self) -> (usize, usize) {
        self.player_start
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().flatten().filter(|t| **t == tile).count()
    }

    /// Build one entity per non-empty cell, in row-major order. The player
    /// always starts with full health.
    pub fn spawn(&self, settings: &Settings, rng: &mut Pcg32) -> Result<Spawned, LevelError> {
        let mut arena = EntityArena::new();
        let mut player = None;
        let player_speed = settings.player_speed();
        let (min_speed, max_speed) = settings.enemy_speed_range();

        for (row, cells) in self.tiles.iter().enumerate() {
            for (col, tile) in cells.iter().enumerate() {
                let pos = cell_position(row, col);
                let bounds = Rect::tile(pos.x, pos.y);
                match tile {
                    Tile::Empty => {}
                    Tile::Wall => {
                        arena.insert_with(|id| Entity::block(id, bounds).with_sprite(sprites::BLOCK));
                    }
                    Tile::PlayerStart => {
                        player = Some(arena.insert_with(|id| {
                            Entity::player(id, bounds, player_speed, settings.player_health)
                                .with_sprite(sprites::PLAYER)
                        }));
                    }
                    Tile::Enemy => {
                        let speed = if max_speed > min_speed {
                            rng.random_range(min_speed..max_speed)
                        } else {
                            min_speed
                        };
                        arena.insert_with(|id| Entity::enemy(id, bounds, speed).with_sprite(sprites::ENEMY));
                    }
                    Tile::Collectable => {
                        arena.insert_with(|id| {
                            Entity::collectable(id, bounds, CollectKind::Score, settings.collectable_value)
                                .with_sprite(sprites::COLLECTABLE)
                        });
                    }
                    Tile::Portal => {
                        arena.insert_with(|id| Entity::portal(id, bounds).with_sprite(sprites::PORTAL));
                    }
                }
            }
        }

        let player = player.ok_or(LevelError::MissingPlayer)?;
        let (row, col) = self.player_start;
        let player_start = cell_position(row, col);

        log::info!(
            "level '{}' spawned: {} entities, player at ({}, {})",
            self.name,
            arena.len(),
            player_start.x,
            player_start.y
        );
        Ok(Spawned {
            arena,
            player,
            player_start,
        })
    }

    /// Built-in maps, played in order
    pub fn builtin_levels() -> Vec<Level> {
        [("level-1", LEVEL_1), ("level-2", LEVEL_2)]
            .into_iter()
            .filter_map(|(name, text)| {
                Level::parse(name, text)
                    .map_err(|e| log::error!("built-in {} is invalid: {}", name, e))
                    .ok()
            })
            .collect()
    }
}

const LEVEL_1: &str = "
xxxxxxxxxxxxxxxxxxxx
x--------------x---x
x--------------x---x
x--e------o--------x
x------------------x
x-----xx---xx------x
x-----x-----x------x
x-----x-----x------x
x-----x-----x----e-x
x-----x--P--xxxx---x
x-----x-----x------x
x-----x-----xs-----x
x-----x-----x--x---x
x-----xx---xxxxx---x
x------------------x
x------------------x
x---o-------------xx
x------------------x
x------------------x
xxxxxxxxxxxxxxxxxxxx
";

const LEVEL_2: &str = "
xxxxxxxxxxxxxxxxxxxx
x--x-------x----x-Px
x--x-----e-x----x--x
x--x-------x----xx-x
x--x---------------x
x-xx--xx---xx------x
x-----x-----x-x----x
xxxx-xx-----x-xxxx-x
x-----x-----x---x--x
x-x-x-xxxx--x------x
x-x-x-x--x--x------x
x-x-x-xs-x--xxxx-xxx
x-x-xxx--x--x------x
x-x---xx-x-xx------x
x-x---x--x-----xxx-x
x-x-xxx--x-----x---x
x---x----xxxxx-x---x
x-xxx--e-x-x---x-x-x
x-----x------x-----x
xxxxxxxxxxxxxxxxxxxx
";
