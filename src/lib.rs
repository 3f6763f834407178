//! Tilegrid Arcade - a grid-aligned arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, movement, collisions, events, levels)
//! - `driver`: Fixed-cadence tick thread and the shared renderer/input handle
//! - `controls`: Held-key tracking that resolves the player's movement intent
//! - `settings`: Data-driven tuning loaded from JSON

pub mod controls;
pub mod driver;
pub mod settings;
pub mod sim;

pub use driver::{RenderSnapshot, SimHandle, Simulation};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Edge length of one grid cell, also the minimum entity size
    pub const TILE_SIZE: f64 = 32.0;
    /// Vertical offset of the map below the status bar
    pub const MAP_TOP_OFFSET: f64 = 32.0;

    /// Target interval between ticks (~60 Hz)
    pub const TICK_INTERVAL_MS: u64 = 16;

    /// Player defaults
    pub const PLAYER_SPEED: f64 = 5.0;
    pub const PLAYER_HEALTH: u32 = 3;

    /// Enemy speed is drawn from [MIN, MAX) at spawn
    pub const ENEMY_MIN_SPEED: f64 = 1.0;
    pub const ENEMY_MAX_SPEED: f64 = 3.5;

    /// Score awarded by a collectable placed from a map
    pub const COLLECTABLE_VALUE: u32 = 100;
}
