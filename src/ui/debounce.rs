//! Time-based debouncing of the raw button level.
//!
//! A new level is only accepted once it has been sampled continuously for
//! `debounce_ms`. Shorter glitches, like contact bounce on release or a
//! blip during a long hold, never reach `ButtonClassifier`.

use crate::config::ClusterConfig;

#[derive(Clone, Debug)]
pub struct Debouncer {
    stable: bool,
    candidate: bool,
    since_ms: u64,
    debounce_ms: u64,
}

impl Debouncer {
    /// Starts in the released state.
    pub const fn new(config: &ClusterConfig) -> Self {
        Self {
            stable: false,
            candidate: false,
            since_ms: 0,
            debounce_ms: config.button_debounce_ms,
        }
    }

    /// Feed one raw sample and return the debounced level.
    pub fn sample(&mut self, level: bool, now_ms: u64) -> bool {
        if level != self.candidate {
            self.candidate = level;
            self.since_ms = now_ms;
        }
        if self.candidate != self.stable
            && now_ms.saturating_sub(self.since_ms) >= self.debounce_ms
        {
            self.stable = self.candidate;
        }
        self.stable
    }

    pub fn level(&self) -> bool {
        self.stable
    }
}
