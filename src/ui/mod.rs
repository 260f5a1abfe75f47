//! User interface logic - one physical button, two displays.
//!
//! The render collaborator (character OLED + numeric matrix) only reads
//! `UiState`; every change to it goes through `DisplayModeController`.
//!
//! ## Components
//!
//! - **Debounce**: stable-level filter for the raw pin sample
//! - **Button**: press-duration classification into `Intent`s
//! - **Mode**: screen index / debug flag state machine
//! - **Refresh**: redraw cadence for both displays

pub mod button;
pub mod debounce;
pub mod input_logic;
pub mod mode;
pub mod refresh;

/// High-level actions produced by a completed button press.
///
/// Selected by hold duration:
///   - short: next screen
///   - long (≥ 3 s): reset trip meter
///   - very long (≥ 10 s): toggle debug mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Intent {
    NextScreen,
    ResetTrip,
    ToggleDebug,
}

/// Display state read by the render layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UiState {
    /// Screen shown on the character display, in `0..=MAX_SCREEN_INDEX`.
    pub screen_index: u8,
    /// While set, the matrix shows the debug banner and normal updates freeze.
    pub debug_mode: bool,
}
