//! Button press classification.
//!
//! The caller polls an already-debounced level once per tick (see
//! `ui::debounce`). A press
//! session starts on the released → pressed edge and is classified
//! exactly once, on the pressed → released edge, by its hold duration:
//!
//! | Hold                          | Intent        |
//! |-------------------------------|---------------|
//! | `< long_press_ms`             | `NextScreen`  |
//! | `long_press_ms..debug_press`  | `ResetTrip`   |
//! | `>= debug_press_ms`           | `ToggleDebug` |

use super::Intent;
use crate::config::ClusterConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PressState {
    Released,
    Pressed { since_ms: u64 },
}

/// Edge detector plus hold-duration classifier for one button.
#[derive(Clone, Debug)]
pub struct ButtonClassifier {
    state: PressState,
    long_press_ms: u64,
    debug_press_ms: u64,
}

impl ButtonClassifier {
    pub const fn new(config: &ClusterConfig) -> Self {
        Self {
            state: PressState::Released,
            long_press_ms: config.long_press_ms,
            debug_press_ms: config.debug_press_ms,
        }
    }

    /// Feed one sample. `pressed` is the active level (active-low wiring
    /// is converted by the caller). Returns an intent on release only.
    pub fn sample(&mut self, pressed: bool, now_ms: u64) -> Option<Intent> {
        match (self.state, pressed) {
            (PressState::Released, true) => {
                self.state = PressState::Pressed { since_ms: now_ms };
                None
            }
            (PressState::Pressed { since_ms }, false) => {
                self.state = PressState::Released;
                let intent = self.classify(now_ms.saturating_sub(since_ms));
                crate::log_debug!(
                    "Button: released after {} ms -> {:?}",
                    now_ms.saturating_sub(since_ms),
                    intent
                );
                Some(intent)
            }
            _ => None,
        }
    }

    /// What releasing right now would produce, without ending the session.
    pub fn held_class(&self, now_ms: u64) -> Option<Intent> {
        match self.state {
            PressState::Pressed { since_ms } => {
                Some(self.classify(now_ms.saturating_sub(since_ms)))
            }
            PressState::Released => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.state, PressState::Pressed { .. })
    }

    fn classify(&self, held_ms: u64) -> Intent {
        if held_ms >= self.debug_press_ms {
            Intent::ToggleDebug
        } else if held_ms >= self.long_press_ms {
            Intent::ResetTrip
        } else {
            Intent::NextScreen
        }
    }
}
