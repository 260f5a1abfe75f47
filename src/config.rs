//! Application-wide constants and runtime thresholds.
//!
//! All timing parameters, distance units and storage placement live here
//! so they can be tuned in one place. `ClusterConfig` carries the values
//! into the logic components; its `Default` is built from the constants.

use crate::error::Error;

// Button

/// Hold time (ms) at or above which a release resets the trip meter.
pub const LONG_PRESS_MS: u64 = 3_000;

/// Hold time (ms) at or above which a release toggles debug mode.
pub const DEBUG_PRESS_MS: u64 = 10_000;

/// A raw button level must hold this long (ms) before it is accepted.
pub const BUTTON_DEBOUNCE_MS: u64 = 20;

// UI

/// Highest screen index; `NextScreen` wraps back to 0 after it.
pub const MAX_SCREEN_INDEX: u8 = 5;

/// Character display (OLED) redraw period (ms).
pub const OLED_UPDATE_MS: u64 = 250;

/// Numeric matrix (speedometer) redraw period (ms).
pub const MATRIX_UPDATE_MS: u64 = 100;

// Distance

/// Base distance unit is the meter.
pub const METERS_PER_KM: u64 = 1_000;

/// Speed samples above this (km/h) are treated as invalid.
pub const MAX_SPEED_KMH: f32 = 400.0;

// Persistence

/// Distance (m) travelled since the last checkpoint that triggers a new one.
pub const CHECKPOINT_INTERVAL_M: u64 = 1_000;

/// Continuous standstill (ms) after which one checkpoint is requested.
pub const STOP_DELAY_MS: u64 = 3_000;

// Control loop

/// Period of the poll-driven control loop (ms).
pub const TICK_MS: u64 = 10;

// GPIO pin assignments (nRF52840-DK defaults)
//
//   Mode button    → P0.11 (active-low, internal pull-up)

// Odometer storage

/// Flash page index where odometer storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for odometer storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;

/// Checkpoint requests that may queue up for the storage task.
pub const CHECKPOINT_QUEUE_DEPTH: usize = 2;

/// Runtime thresholds shared by the cluster components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClusterConfig {
    pub long_press_ms: u64,
    pub debug_press_ms: u64,
    pub button_debounce_ms: u64,
    pub max_screen_index: u8,
    pub meters_per_km: u64,
    pub checkpoint_interval_m: u64,
    pub stop_delay_ms: u64,
    pub oled_update_ms: u64,
    pub matrix_update_ms: u64,
}

impl ClusterConfig {
    pub const fn new() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            debug_press_ms: DEBUG_PRESS_MS,
            button_debounce_ms: BUTTON_DEBOUNCE_MS,
            max_screen_index: MAX_SCREEN_INDEX,
            meters_per_km: METERS_PER_KM,
            checkpoint_interval_m: CHECKPOINT_INTERVAL_M,
            stop_delay_ms: STOP_DELAY_MS,
            oled_update_ms: OLED_UPDATE_MS,
            matrix_update_ms: MATRIX_UPDATE_MS,
        }
    }

    /// Reject threshold combinations the components cannot honour.
    ///
    /// `meters_per_km` must be a non-zero multiple of 10 so the trip
    /// readout can resolve tenths of a kilometer.
    pub fn validate(&self) -> Result<(), Error> {
        if self.long_press_ms >= self.debug_press_ms {
            return Err(Error::InvalidConfig);
        }
        if self.button_debounce_ms >= self.long_press_ms {
            return Err(Error::InvalidConfig);
        }
        if self.checkpoint_interval_m == 0 {
            return Err(Error::InvalidConfig);
        }
        if self.meters_per_km == 0 || self.meters_per_km % 10 != 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::new()
    }
}
