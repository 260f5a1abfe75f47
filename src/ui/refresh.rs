//! Redraw cadence for the two displays.
//!
//! The character display refreshes every `oled_update_ms`; the numeric
//! matrix every `matrix_update_ms`, and never while debug mode is on so
//! the debug banner stays frozen.

use crate::config::ClusterConfig;

/// Which displays are due for a redraw this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RedrawFlags {
    pub oled: bool,
    pub matrix: bool,
}

/// Fixed-period "is it time yet" gate.
#[derive(Clone, Copy, Debug)]
struct Cadence {
    period_ms: u64,
    last_ms: Option<u64>,
}

impl Cadence {
    const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_ms: None,
        }
    }

    fn due(&mut self, now_ms: u64) -> bool {
        match self.last_ms {
            Some(last) if now_ms.saturating_sub(last) < self.period_ms && now_ms >= last => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct RefreshTimer {
    oled: Cadence,
    matrix: Cadence,
}

impl RefreshTimer {
    pub const fn new(config: &ClusterConfig) -> Self {
        Self {
            oled: Cadence::new(config.oled_update_ms),
            matrix: Cadence::new(config.matrix_update_ms),
        }
    }

    pub fn poll(&mut self, now_ms: u64, debug_mode: bool) -> RedrawFlags {
        RedrawFlags {
            oled: self.oled.due(now_ms),
            matrix: !debug_mode && self.matrix.due(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_refresh_at_their_periods() {
        let mut timer = RefreshTimer::new(&ClusterConfig::default());
        assert_eq!(timer.poll(0, false), RedrawFlags { oled: true, matrix: true });
        assert_eq!(timer.poll(99, false), RedrawFlags { oled: false, matrix: false });
        assert_eq!(timer.poll(100, false), RedrawFlags { oled: false, matrix: true });
        assert_eq!(timer.poll(250, false), RedrawFlags { oled: true, matrix: true });
    }

    #[test]
    fn matrix_frozen_in_debug_mode() {
        let mut timer = RefreshTimer::new(&ClusterConfig::default());
        timer.poll(0, false);
        for now in (100..2_000).step_by(100) {
            assert!(!timer.poll(now, true).matrix);
        }
        assert!(timer.poll(2_000, false).matrix);
    }

    #[test]
    fn clock_regression_forces_redraw() {
        let mut timer = RefreshTimer::new(&ClusterConfig::default());
        timer.poll(10_000, false);
        assert!(timer.poll(50, false).oled);
    }
}
