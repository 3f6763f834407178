//! Fixed-cadence tick thread
//!
//! The simulation thread is the only writer of the game state. The host (renderer
//! and input layer) holds a `SimHandle` and reads snapshots or writes the
//! player's intent. Both sides go through one mutex, so a whole tick (update pass
//! plus event application) is a single critical section.
//!
//! Pacing is a plain sleep after each tick. A slow tick is not compensated; the
//! cadence degrades instead of catching up.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::sim::{EntityId, EntityKind, GameState, PlayerIntent, SpriteId, TickInput, tick};

struct Shared {
    state: GameState,
    input: TickInput,
}

/// One entity as the renderer needs it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub sprite: Option<SpriteId>,
}

/// Consistent view of the state between two ticks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub entities: Vec<EntityView>,
    pub score: u64,
    pub health: Option<u32>,
    pub level: usize,
    pub game_over: bool,
}

/// Cloneable access to a running (or not yet started) simulation
#[derive(Clone)]
pub struct SimHandle {
    shared: Arc<Mutex<Shared>>,
}

impl SimHandle {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the player's movement intent; applied at the start of the next tick
    pub fn set_intent(&self, intent: PlayerIntent) {
        self.lock().input.intent = intent;
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let shared = self.lock();
        let state = &shared.state;
        RenderSnapshot {
            entities: state
                .entities
                .iter()
                .map(|e| EntityView {
                    id: e.id,
                    kind: e.kind,
                    x: e.bounds.x(),
                    y: e.bounds.y(),
                    width: e.bounds.width(),
                    height: e.bounds.height(),
                    sprite: e.sprite,
                })
                .collect(),
            score: state.score(),
            health: state.player_health(),
            level: state.level_index(),
            game_over: state.is_game_over(),
        }
    }

    pub fn score(&self) -> u64 {
        self.lock().state.score()
    }

    pub fn is_game_over(&self) -> bool {
        self.lock().state.is_game_over()
    }

    /// Force the game into its terminal state; the loop exits after its current sleep
    pub fn end_game(&self) {
        self.lock().state.end_game();
    }

    /// Run a closure against the state under the lock
    pub fn with_state<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.lock().state)
    }
}

/// Wall time between consecutive ticks
struct TickClock {
    previous: Instant,
}

impl TickClock {
    /// Starts one interval in the past, so the first tick sees a full step
    fn start(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            previous: now.checked_sub(interval).unwrap_or(now),
        }
    }

    fn delta_ms(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.previous);
        self.previous = now;
        delta.as_secs_f64() * 1000.0
    }
}

/// Owns the tick loop until it is started on its own thread
pub struct Simulation {
    handle: SimHandle,
    interval: Duration,
}

impl Simulation {
    pub fn new(state: GameState) -> Self {
        let interval = state.settings.tick_interval();
        Self {
            handle: SimHandle {
                shared: Arc::new(Mutex::new(Shared {
                    state,
                    input: TickInput::default(),
                })),
            },
            interval,
        }
    }

    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    /// Start the loop on a dedicated thread. The thread returns the number of
    /// ticks run once the game is over.
    pub fn spawn(self) -> std::io::Result<JoinHandle<u64>> {
        thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || self.run())
    }

    /// Run the loop on the current thread until game over
    pub fn run(self) -> u64 {
        log::info!("starting game loop ({:?} per tick)", self.interval);
        let mut clock = TickClock::start(self.interval);
        let mut ticks = 0u64;
        loop {
            let delta_ms = clock.delta_ms();

            let over = {
                let mut shared = self.handle.lock();
                let input = shared.input.clone();
                tick(&mut shared.state, &input, delta_ms);
                shared.state.is_game_over()
            };
            if over {
                break;
            }
            ticks += 1;
            thread::sleep(self.interval);
        }
        log::info!("game loop finished after {} ticks", ticks);
        ticks
    }
}
