//! Keyboard state to player intent
//!
//! The host forwards raw key presses and releases; `Controls` tracks which keys
//! are held and resolves them into a `PlayerIntent`. Pressing a direction starts
//! moving that way. Releasing a direction stops the player unless the key for
//! the current direction is still held.

use std::collections::HashSet;

use crate::sim::{Direction, PlayerIntent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Reserved for pausing; currently no effect
    Pause,
    /// Reserved for a player action; currently no effect
    Action,
}

impl Key {
    fn direction(self) -> Option<Direction> {
        match self {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::Pause | Key::Action => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Controls {
    held: HashSet<Key>,
    intent: PlayerIntent,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(&self) -> PlayerIntent {
        self.intent
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Record a key press. Returns the new intent if it changed.
    pub fn press(&mut self, key: Key) -> Option<PlayerIntent> {
        self.held.insert(key);
        let dir = key.direction()?;
        let next = PlayerIntent::go(dir);
        (next != self.intent).then(|| {
            self.intent = next;
            next
        })
    }

    /// Record a key release. Returns the new intent if it changed.
    pub fn release(&mut self, key: Key) -> Option<PlayerIntent> {
        self.held.remove(&key);
        key.direction()?;
        if self.still_moving() || self.intent == PlayerIntent::stop() {
            return None;
        }
        log::debug!("stopped moving");
        self.intent = PlayerIntent::stop();
        Some(self.intent)
    }

    /// The key for the current direction is still held
    fn still_moving(&self) -> bool {
        let key = match self.intent.direction {
            Direction::Up => Key::Up,
            Direction::Down => Key::Down,
            Direction::Left => Key::Left,
            Direction::Right => Key::Right,
            Direction::None => return false,
        };
        self.is_held(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut controls = Controls::new();
        assert_eq!(controls.press(Key::Up), Some(PlayerIntent::go(Direction::Up)));
        assert_eq!(controls.press(Key::Up), None);
        assert_eq!(controls.release(Key::Up), Some(PlayerIntent::stop()));
        assert!(!controls.intent().moving);
    }

    #[test]
    fn test_latest_direction_wins() {
        let mut controls = Controls::new();
        controls.press(Key::Up);
        controls.press(Key::Left);
        assert_eq!(controls.intent().direction, Direction::Left);

        // Releasing the older key keeps moving left
        assert_eq!(controls.release(Key::Up), None);
        assert_eq!(controls.intent(), PlayerIntent::go(Direction::Left));

        // Releasing the current key stops, even with nothing else held
        assert_eq!(controls.release(Key::Left), Some(PlayerIntent::stop()));
    }

    #[test]
    fn test_non_direction_keys_do_not_steer() {
        let mut controls = Controls::new();
        assert_eq!(controls.press(Key::Pause), None);
        assert_eq!(controls.press(Key::Action), None);
        assert!(controls.is_held(Key::Action));
        assert_eq!(controls.release(Key::Action), None);
        assert_eq!(controls.intent(), PlayerIntent::stop());
    }
}
