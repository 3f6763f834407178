//! Game state and level management
//!
//! `GameState` owns everything the tick mutates: the entity arena, the event
//! queue, score, phase, the level list and the seeded RNG.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::EntityArena;
use super::collision::movable_mask;
use super::entity::{Body, Entity, EntityId, EntityKind};
use super::events::EventQueue;
use super::level::{Level, LevelError};
use super::movement::randomize_direction;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    /// Terminal; no further ticks run
    GameOver,
}

pub struct GameState {
    pub settings: Settings,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Active entities, replaced wholesale on every level load
    pub entities: EntityArena,
    pub events: EventQueue,
    pub rng: Pcg32,
    levels: Vec<Level>,
    level_index: usize,
    player: EntityId,
    player_start: DVec2,
    score: u64,
}

impl GameState {
    /// Start on the first built-in level
    pub fn new(settings: Settings) -> Result<Self, LevelError> {
        Self::with_levels(settings, Level::builtin_levels())
    }

    /// Start on the first of `levels`
    pub fn with_levels(settings: Settings, levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        let rng = Pcg32::seed_from_u64(settings.seed);
        let mut state = Self {
            settings,
            time_ticks: 0,
            phase: GamePhase::Running,
            entities: EntityArena::new(),
            events: EventQueue::new(),
            rng,
            levels,
            level_index: 0,
            player: EntityId(0),
            player_start: DVec2::ZERO,
            score: 0,
        };
        state.load_level()?;
        Ok(state)
    }

    /// Rebuild the entity collection from the current level, as a fresh map
    /// load. Score survives; the player respawns at the start cell with full
    /// health.
    pub fn load_level(&mut self) -> Result<(), LevelError> {
        let level = self.levels.get(self.level_index).ok_or(LevelError::NoLevels)?;
        let spawned = level.spawn(&self.settings, &mut self.rng)?;
        self.entities = spawned.arena;
        self.player = spawned.player;
        self.player_start = spawned.player_start;
        self.events.resubscribe(&self.entities);
        self.aim_enemies();
        Ok(())
    }

    /// Give every enemy a first direction among the ones it can actually take
    fn aim_enemies(&mut self) {
        for id in self.entities.ids() {
            if self.entities.get(id).map(|e| e.kind) != Some(EntityKind::Enemy) {
                continue;
            }
            let Some(mut enemy) = self.entities.take(id) else {
                continue;
            };
            let mask = movable_mask(&enemy.bounds, self.entities.iter());
            if let Some(motion) = enemy.motion_mut() {
                motion.movable = mask;
                randomize_direction(motion, &mut self.rng);
            }
            self.entities.restore(enemy);
        }
    }

    /// Select a level by index. Out-of-range indices are ignored.
    /// Takes effect on the next `load_level`.
    pub fn set_current_level(&mut self, index: usize) -> bool {
        if index >= self.levels.len() {
            log::warn!("ignoring level index {} ({} levels)", index, self.levels.len());
            return false;
        }
        self.level_index = index;
        true
    }

    /// Advance to the next level, wrapping after the last, and load it
    pub fn next_level(&mut self) {
        self.level_index = (self.level_index + 1) % self.levels.len();
        log::info!("advancing to level {}", self.level_index);
        if let Err(e) = self.load_level() {
            log::error!("failed to load level {}: {}", self.level_index, e);
        }
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> Option<&Level> {
        self.levels.get(self.level_index)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Negative values clamp to zero
    pub fn set_score(&mut self, score: i64) {
        self.score = score.max(0) as u64;
    }

    pub fn add_score(&mut self, value: u32) {
        self.score = self.score.saturating_add(u64::from(value));
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.get(self.player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities.get_mut(self.player)
    }

    pub fn player_health(&self) -> Option<u32> {
        self.player().and_then(Entity::health)
    }

    /// Pixel position of the current level's start cell
    pub fn player_start(&self) -> DVec2 {
        self.player_start
    }

    pub fn set_player_health(&mut self, value: u32) {
        if let Some(Body::Player { health, .. }) = self.player_mut().map(|p| &mut p.body) {
            *health = value;
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Game over predicate: the player is out of health
    pub fn player_defeated(&self) -> bool {
        self.player_health() == Some(0)
    }

    /// End the game from outside the simulation (host shutting down)
    pub fn end_game(&mut self) {
        if self.phase != GamePhase::GameOver {
            log::info!("game ended by host");
            self.phase = GamePhase::GameOver;
        }
    }
}
