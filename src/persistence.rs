//! Checkpoint policy - decides when odometer state must be saved.
//!
//! Two independent triggers:
//!   - Interval: distance since the last checkpoint reaches the interval.
//!     Crossing several intervals in one tick yields ONE batched request.
//!   - Stationary: speed held at zero for the stop delay. Fires once per
//!     standstill; any non-zero sample re-arms it.
//!
//! The scheduler never writes anything itself. Requests are handed to the
//! storage collaborator, which owns write failures and retries.

use crate::config::ClusterConfig;
use crate::odometer::sanitize_speed;

/// Why a checkpoint was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CheckpointCause {
    /// Distance interval reached; `crossings` interval widths covered.
    Interval { crossings: u32 },
    /// Vehicle stationary for the stop delay.
    Stationary,
}

/// Values to persist plus the trigger that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CheckpointRequest {
    pub total_m: u64,
    pub trip_m: u32,
    pub cause: CheckpointCause,
}

/// Interval and standstill checkpoint triggers.
#[derive(Clone, Debug)]
pub struct PersistenceScheduler {
    interval_m: u64,
    stop_delay_ms: u64,
    last_checkpoint_total: u64,
    stop_since_ms: Option<u64>,
    saved_while_stopped: bool,
}

impl PersistenceScheduler {
    pub const fn new(config: &ClusterConfig) -> Self {
        Self {
            interval_m: config.checkpoint_interval_m,
            stop_delay_ms: config.stop_delay_ms,
            last_checkpoint_total: 0,
            stop_since_ms: None,
            saved_while_stopped: false,
        }
    }

    /// Move the interval baseline, e.g. to the total restored at boot.
    pub fn rebase(&mut self, total_m: u64) {
        self.last_checkpoint_total = total_m;
    }

    /// Total covered by the most recent checkpoint (or the baseline).
    pub fn last_checkpoint_total(&self) -> u64 {
        self.last_checkpoint_total
    }

    /// Evaluate both triggers against the post-tick totals.
    pub fn evaluate(
        &mut self,
        total_m: u64,
        trip_m: u32,
        speed_kmh: f32,
        now_ms: u64,
    ) -> Option<CheckpointRequest> {
        let stationary = self.poll_stationary(speed_kmh, now_ms);
        let interval = self.poll_interval(total_m);

        let cause = match (interval, stationary) {
            (Some(crossings), _) => CheckpointCause::Interval { crossings },
            (None, true) => CheckpointCause::Stationary,
            (None, false) => return None,
        };

        self.last_checkpoint_total = total_m;
        crate::log_info!(
            "Checkpoint {:?}: total={} trip={}",
            cause,
            total_m,
            trip_m
        );
        Some(CheckpointRequest {
            total_m,
            trip_m,
            cause,
        })
    }

    fn poll_interval(&self, total_m: u64) -> Option<u32> {
        let travelled = total_m.saturating_sub(self.last_checkpoint_total);
        if travelled >= self.interval_m {
            Some(u32::try_from(travelled / self.interval_m).unwrap_or(u32::MAX))
        } else {
            None
        }
    }

    fn poll_stationary(&mut self, speed_kmh: f32, now_ms: u64) -> bool {
        if sanitize_speed(speed_kmh) > 0.0 {
            self.stop_since_ms = None;
            self.saved_while_stopped = false;
            return false;
        }

        if self.saved_while_stopped {
            return false;
        }

        let since = *self.stop_since_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(since) >= self.stop_delay_ms {
            self.saved_while_stopped = true;
            return true;
        }
        false
    }
}
