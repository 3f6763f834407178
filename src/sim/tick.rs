//! Per-frame simulation tick
//!
//! A tick runs three phases in order:
//! 1. update pass: advance every non-block entity in collection order
//! 2. apply buffered events: score, collectable removal, level swap
//! 3. game-over check
//!
//! Structural changes to the arena only happen in phase 2, never while the
//! update pass is iterating.

use serde::{Deserialize, Serialize};

use super::entity::{Direction, EntityId, EntityKind};
use super::events::GameEvent;
use super::movement::{StepContext, StepOutcome, advance};
use super::state::{GamePhase, GameState};

/// Resolved player movement intent, written by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerIntent {
    pub direction: Direction,
    pub moving: bool,
}

impl PlayerIntent {
    pub fn go(direction: Direction) -> Self {
        Self {
            direction,
            moving: direction != Direction::None,
        }
    }

    pub fn stop() -> Self {
        Self::default()
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub intent: PlayerIntent,
}

/// What a tick did, for the host and for tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Entities advanced in the update pass
    pub updated: usize,
    /// Collectables removed after pickup
    pub collected: Vec<EntityId>,
    pub level_changed: bool,
    /// Entities skipped because of a kind/payload mismatch
    pub skipped: usize,
}

/// Advance the game state by one tick. `delta_ms` is the wall time since the
/// previous tick.
pub fn tick(state: &mut GameState, input: &TickInput, delta_ms: f64) -> TickReport {
    let mut report = TickReport::default();
    if state.phase == GamePhase::GameOver {
        return report;
    }
    state.time_ticks += 1;

    if let Some(motion) = state.player_mut().and_then(|p| p.motion_mut()) {
        motion.direction = input.intent.direction;
        motion.moving = input.intent.moving;
    }

    let step_scale = if state.settings.scale_by_delta {
        delta_ms.max(0.0) / state.settings.tick_interval_ms.max(1) as f64
    } else {
        1.0
    };

    update_pass(state, step_scale, &mut report);
    apply_events(state, &mut report);

    if state.player_defeated() {
        log::info!("GAME OVER after {} ticks, score {}", state.time_ticks, state.score());
        state.phase = GamePhase::GameOver;
    }
    report
}

fn update_pass(state: &mut GameState, step_scale: f64, report: &mut TickReport) {
    for id in state.entities.ids() {
        if state.entities.get(id).is_none_or(|e| e.kind == EntityKind::Block) {
            continue;
        }
        let Some(mut entity) = state.entities.take(id) else {
            continue;
        };
        let mut ctx = StepContext {
            others: &mut state.entities,
            events: &mut state.events,
            rng: &mut state.rng,
            step_scale,
        };
        match advance(&mut entity, &mut ctx) {
            StepOutcome::Skipped => report.skipped += 1,
            StepOutcome::Passive => {}
            _ => report.updated += 1,
        }
        state.entities.restore(entity);
    }
}

fn apply_events(state: &mut GameState, report: &mut TickReport) {
    let mut level_complete = false;
    for event in state.events.drain() {
        match event {
            GameEvent::PickedUp { id, value } => {
                // Removal succeeding is what makes a pickup count exactly once
                if state.entities.remove(id).is_some() {
                    state.add_score(value);
                    report.collected.push(id);
                    log::info!("score: {}", state.score());
                }
            }
            GameEvent::LevelComplete { id } => {
                log::info!("level complete via portal {:?}", id);
                level_complete = true;
            }
        }
    }
    if level_complete {
        state.next_level();
        report.level_changed = true;
    }
}
