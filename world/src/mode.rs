//! Minimal mode switch standing in for the external mode timer.

use std::sync::{PoisonError, RwLock};

use maze_chase_core::{GameMode, ModeSnapshot, ModeSource};

/// Shared mode cell that remembers the last mode other than paused.
#[derive(Debug)]
pub struct ModeSwitch {
    state: RwLock<ModeSnapshot>,
}

impl ModeSwitch {
    /// Creates a switch reporting `initial`.
    #[must_use]
    pub fn new(initial: GameMode) -> Self {
        let last_unpaused = (initial != GameMode::Paused).then_some(initial);
        Self {
            state: RwLock::new(ModeSnapshot {
                mode: initial,
                last_unpaused,
            }),
        }
    }

    /// Switches to `mode`, returning whether the reported mode changed.
    pub fn set(&self, mode: GameMode) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.mode == mode {
            return false;
        }
        if state.mode != GameMode::Paused {
            state.last_unpaused = Some(state.mode);
        }
        if mode != GameMode::Paused {
            state.last_unpaused = Some(mode);
        }
        state.mode = mode;
        true
    }
}

impl Default for ModeSwitch {
    fn default() -> Self {
        Self::new(GameMode::Scatter)
    }
}

impl ModeSource for ModeSwitch {
    fn snapshot(&self) -> ModeSnapshot {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pausing_keeps_last_unpaused_mode() {
        let switch = ModeSwitch::new(GameMode::Scatter);
        assert!(switch.set(GameMode::Chase));
        assert!(switch.set(GameMode::Paused));
        assert_eq!(
            switch.snapshot(),
            ModeSnapshot {
                mode: GameMode::Paused,
                last_unpaused: Some(GameMode::Chase),
            }
        );
        assert_eq!(switch.snapshot().effective(), Some(GameMode::Chase));
    }

    #[test]
    fn starting_paused_has_no_fallback() {
        let switch = ModeSwitch::new(GameMode::Paused);
        assert_eq!(switch.snapshot().effective(), None);
        assert!(!switch.set(GameMode::Paused));
    }
}
