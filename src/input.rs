//! Maps terminal key events onto simulation input events.

use std::time::{Duration, Instant};

use blockfall::components::InputEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

// Without release reporting a held key is assumed released after this much silence.
// Longer than the usual OS key-repeat delay, so a held key is not dropped before it repeats
const SYNTHETIC_RELEASE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldKey {
    Left,
    Right,
    SoftDrop,
}

impl HeldKey {
    fn start(self) -> InputEvent {
        match self {
            HeldKey::Left => InputEvent::MoveLeftStart,
            HeldKey::Right => InputEvent::MoveRightStart,
            HeldKey::SoftDrop => InputEvent::SoftDropStart,
        }
    }

    fn stop(self) -> InputEvent {
        match self {
            HeldKey::Left => InputEvent::MoveLeftStop,
            HeldKey::Right => InputEvent::MoveRightStop,
            HeldKey::SoftDrop => InputEvent::SoftDropStop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(InputEvent),
    ToggleSound,
    Quit,
    None,
}

/// Turns presses (and releases, when the terminal reports them) into start/stop pairs.
#[derive(Debug)]
pub struct KeyTracker {
    reports_release: bool,
    held: Vec<(HeldKey, Instant)>,
}

impl KeyTracker {
    pub fn new(reports_release: bool) -> Self {
        Self {
            reports_release,
            held: Vec::new(),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Action> {
        if let Some(held) = held_key(key.code) {
            return self.on_held_key(held, key.kind, now);
        }

        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }

        let action = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Up | KeyCode::Char('x' | 'w') => Action::Game(InputEvent::RotateCw),
            KeyCode::Char('z' | 'y') => Action::Game(InputEvent::RotateCcw),
            KeyCode::Char(' ') | KeyCode::Enter => Action::Game(InputEvent::HardDrop),
            KeyCode::Char('c') => Action::Game(InputEvent::Hold),
            KeyCode::Char('p') => Action::Game(InputEvent::TogglePause),
            KeyCode::Char('r') => Action::Game(InputEvent::Reset),
            KeyCode::Char('m') => Action::ToggleSound,
            _ => Action::None,
        };
        vec![action]
    }

    fn on_held_key(&mut self, held: HeldKey, kind: KeyEventKind, now: Instant) -> Vec<Action> {
        let existing = self.held.iter().position(|(key, _)| *key == held);

        match (kind, existing) {
            (KeyEventKind::Release, Some(index)) => {
                self.held.remove(index);
                vec![Action::Game(held.stop())]
            }
            (KeyEventKind::Release, None) => Vec::new(),
            // OS auto-repeat; the simulation runs its own
            (_, Some(index)) => {
                self.held[index].1 = now;
                Vec::new()
            }
            (_, None) => {
                self.held.push((held, now));
                vec![Action::Game(held.start())]
            }
        }
    }

    /// Releases keys that went quiet when the terminal cannot report releases.
    pub fn expire(&mut self, now: Instant) -> Vec<Action> {
        if self.reports_release {
            return Vec::new();
        }

        let mut actions = Vec::new();
        self.held.retain(|(key, last_seen)| {
            if now.duration_since(*last_seen) >= SYNTHETIC_RELEASE {
                actions.push(Action::Game(key.stop()));
                false
            } else {
                true
            }
        });
        actions
    }
}

fn held_key(code: KeyCode) -> Option<HeldKey> {
    match code {
        KeyCode::Left | KeyCode::Char('a' | 'h') => Some(HeldKey::Left),
        KeyCode::Right | KeyCode::Char('d' | 'l') => Some(HeldKey::Right),
        KeyCode::Down | KeyCode::Char('s' | 'j') => Some(HeldKey::SoftDrop),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn test_press_and_release_pair() {
        let mut keys = KeyTracker::new(true);
        let now = Instant::now();

        assert_eq!(
            keys.on_key(key(KeyCode::Left, KeyEventKind::Press), now),
            vec![Action::Game(InputEvent::MoveLeftStart)]
        );
        // Auto-repeat from the terminal is swallowed
        assert!(keys.on_key(key(KeyCode::Left, KeyEventKind::Repeat), now).is_empty());
        assert_eq!(
            keys.on_key(key(KeyCode::Left, KeyEventKind::Release), now),
            vec![Action::Game(InputEvent::MoveLeftStop)]
        );
        assert!(keys.expire(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_synthetic_release() {
        let mut keys = KeyTracker::new(false);
        let start = Instant::now();

        keys.on_key(key(KeyCode::Down, KeyEventKind::Press), start);
        // Survives the OS key-repeat delay
        assert!(keys.expire(start + Duration::from_millis(400)).is_empty());

        // A repeat press keeps the key alive
        keys.on_key(
            key(KeyCode::Down, KeyEventKind::Press),
            start + Duration::from_millis(400),
        );
        assert!(keys.expire(start + Duration::from_millis(850)).is_empty());
        assert_eq!(
            keys.expire(start + Duration::from_millis(900)),
            vec![Action::Game(InputEvent::SoftDropStop)]
        );
    }

    #[test]
    fn test_one_shot_bindings() {
        let mut keys = KeyTracker::new(true);
        let now = Instant::now();

        let press = |keys: &mut KeyTracker, code| keys.on_key(key(code, KeyEventKind::Press), now);
        assert_eq!(press(&mut keys, KeyCode::Char(' ')), vec![Action::Game(InputEvent::HardDrop)]);
        assert_eq!(press(&mut keys, KeyCode::Char('z')), vec![Action::Game(InputEvent::RotateCcw)]);
        assert_eq!(press(&mut keys, KeyCode::Char('q')), vec![Action::Quit]);
        assert!(
            keys.on_key(key(KeyCode::Char('c'), KeyEventKind::Release), now)
                .is_empty()
        );
    }
}
