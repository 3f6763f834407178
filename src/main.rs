//! Tilegrid Arcade entry point
//!
//! Headless host: loads settings, starts the simulation thread and steers the
//! player with a scripted key sequence until the run time is up or the game ends.
//!
//! Usage: `tilegrid-arcade [settings.json]`

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tilegrid_arcade::controls::{Controls, Key};
use tilegrid_arcade::sim::GameState;
use tilegrid_arcade::{Settings, Simulation};

/// Keys held in turn by the scripted player, each for `HOLD`
const SCRIPT: [Key; 4] = [Key::Left, Key::Up, Key::Right, Key::Down];
const HOLD: Duration = Duration::from_millis(600);

fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1) else {
        return Settings::default();
    };
    match Settings::load(Path::new(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("failed to load settings from {}: {}, using defaults", path, e);
            Settings::default()
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Tilegrid Arcade (headless) starting...");

    let settings = load_settings();
    let run_for = Duration::from_secs(settings.run_seconds);
    let state = match GameState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("failed to build levels: {}", e);
            return;
        }
    };

    let sim = Simulation::new(state);
    let handle = sim.handle();
    let worker = match sim.spawn() {
        Ok(worker) => worker,
        Err(e) => {
            log::error!("failed to start simulation thread: {}", e);
            return;
        }
    };

    let started = Instant::now();
    let mut controls = Controls::new();
    let mut held: Option<Key> = None;
    for key in SCRIPT.iter().copied().cycle() {
        if handle.is_game_over() || started.elapsed() >= run_for {
            break;
        }
        if let Some(previous) = held.take() {
            if let Some(intent) = controls.release(previous) {
                handle.set_intent(intent);
            }
        }
        if let Some(intent) = controls.press(key) {
            handle.set_intent(intent);
        }
        held = Some(key);
        thread::sleep(HOLD);
        log::info!("score {} after {:.1}s", handle.score(), started.elapsed().as_secs_f64());
    }

    handle.end_game();
    match worker.join() {
        Ok(ticks) => log::info!("simulation ran {} ticks", ticks),
        Err(_) => log::error!("simulation thread panicked"),
    }

    let snapshot = handle.snapshot();
    log::info!(
        "final score {}, level {}, health {:?}",
        snapshot.score,
        snapshot.level,
        snapshot.health
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("failed to serialize snapshot: {}", e),
    }
}
