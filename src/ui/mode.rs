//! Display mode state machine.
//!
//! Owns `UiState`. `ResetTrip` is forwarded to the trip owner; this
//! controller holds no distance data itself.

use super::input_logic::next_screen;
use super::{Intent, UiState};
use crate::config::ClusterConfig;
use crate::odometer::TripReset;

#[derive(Clone, Debug)]
pub struct DisplayModeController {
    state: UiState,
    max_screen_index: u8,
}

impl DisplayModeController {
    pub const fn new(config: &ClusterConfig) -> Self {
        Self {
            state: UiState {
                screen_index: 0,
                debug_mode: false,
            },
            max_screen_index: config.max_screen_index,
        }
    }

    /// Apply one intent and return the resulting state.
    pub fn apply(&mut self, intent: Intent, trip: &mut impl TripReset) -> UiState {
        match intent {
            Intent::NextScreen => {
                self.state.screen_index = next_screen(self.state.screen_index, self.max_screen_index);
            }
            Intent::ResetTrip => {
                trip.reset_trip();
                crate::log_info!("Trip meter reset");
            }
            Intent::ToggleDebug => {
                self.state.debug_mode = !self.state.debug_mode;
                crate::log_info!("Debug mode: {}", self.state.debug_mode);
            }
        }
        self.state
    }

    pub fn state(&self) -> UiState {
        self.state
    }
}
