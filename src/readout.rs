//! Values handed to the render collaborator each tick.
//!
//! Display values are derived from the integer totals on every tick,
//! never cached across them, and always truncate.

use core::fmt::Write;

use heapless::String;

use crate::error::Error;
use crate::odometer::DistanceAccumulator;
use crate::ui::UiState;

/// Capacity of a formatted readout line ("18446744073709551615 km").
pub const READOUT_LEN: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readout {
    /// Whole kilometers.
    pub odometer_km: u64,
    /// Trip in tenths of a kilometer (123 = 12.3 km).
    pub trip_tenths: u32,
    pub screen_index: u8,
    pub debug_mode: bool,
}

impl Readout {
    pub fn capture(odometer: &DistanceAccumulator, ui: UiState) -> Self {
        Self {
            odometer_km: odometer.odometer_km(),
            trip_tenths: odometer.trip_tenths(),
            screen_index: ui.screen_index,
            debug_mode: ui.debug_mode,
        }
    }

    /// "12345 km"
    pub fn odometer_text(&self) -> Result<String<READOUT_LEN>, Error> {
        format_odometer(self.odometer_km)
    }

    /// "12.3 km"
    pub fn trip_text(&self) -> Result<String<READOUT_LEN>, Error> {
        format_trip(self.trip_tenths)
    }
}

pub fn format_odometer(km: u64) -> Result<String<READOUT_LEN>, Error> {
    let mut s = String::new();
    write!(s, "{} km", km).map_err(|_| Error::BufferOverflow)?;
    Ok(s)
}

pub fn format_trip(tenths: u32) -> Result<String<READOUT_LEN>, Error> {
    let mut s = String::new();
    write!(s, "{}.{} km", tenths / 10, tenths % 10).map_err(|_| Error::BufferOverflow)?;
    Ok(s)
}
