//! One control-loop step for the whole cluster.
//!
//! Each tick feeds the components in a fixed order:
//!
//! ```text
//! speed ──► DistanceAccumulator ──► PersistenceScheduler ──► CheckpointRequest?
//! button ─► ButtonClassifier ─────► DisplayModeController ─► UiState
//! ```
//!
//! The scheduler always sees the post-accumulation totals of the same
//! tick. Nothing here blocks; checkpoint requests are returned to the
//! caller, which hands them to the storage task.

use crate::config::ClusterConfig;
use crate::error::Error;
use crate::odometer::{AdvanceOutcome, DistanceAccumulator};
use crate::persistence::{CheckpointRequest, PersistenceScheduler};
use crate::readout::Readout;
use crate::storage::StoredOdometer;
use crate::ui::button::ButtonClassifier;
use crate::ui::mode::DisplayModeController;
use crate::ui::refresh::{RedrawFlags, RefreshTimer};
use crate::ui::{Intent, UiState};

/// Inputs sampled once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSample {
    /// Monotonic time (ms).
    pub now_ms: u64,
    /// Vehicle speed (km/h).
    pub speed_kmh: f32,
    /// Button at its active level.
    pub button_pressed: bool,
}

/// Everything the render and storage collaborators need from one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub distance: AdvanceOutcome,
    pub checkpoint: Option<CheckpointRequest>,
    pub intent: Option<Intent>,
    pub ui: UiState,
    pub redraw: RedrawFlags,
    pub readout: Readout,
}

pub struct Cluster {
    odometer: DistanceAccumulator,
    scheduler: PersistenceScheduler,
    button: ButtonClassifier,
    mode: DisplayModeController,
    refresh: RefreshTimer,
}

impl Cluster {
    pub fn new(config: ClusterConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            odometer: DistanceAccumulator::new(&config),
            scheduler: PersistenceScheduler::new(&config),
            button: ButtonClassifier::new(&config),
            mode: DisplayModeController::new(&config),
            refresh: RefreshTimer::new(&config),
        })
    }

    /// Seed totals from storage; the interval trigger counts from here.
    pub fn restore(&mut self, stored: StoredOdometer) {
        self.odometer.restore(stored.total_m, stored.trip_m);
        self.scheduler.rebase(self.odometer.total_m());
    }

    pub fn tick(&mut self, sample: TickSample) -> TickReport {
        let distance = self.odometer.advance(sample.speed_kmh, sample.now_ms);
        let checkpoint = self.scheduler.evaluate(
            distance.total_m,
            distance.trip_m,
            sample.speed_kmh,
            sample.now_ms,
        );

        let intent = self.button.sample(sample.button_pressed, sample.now_ms);
        let ui = match intent {
            Some(intent) => self.mode.apply(intent, &mut self.odometer),
            None => self.mode.state(),
        };

        TickReport {
            distance,
            checkpoint,
            intent,
            ui,
            redraw: self.refresh.poll(sample.now_ms, ui.debug_mode),
            readout: Readout::capture(&self.odometer, ui),
        }
    }

    pub fn odometer(&self) -> &DistanceAccumulator {
        &self.odometer
    }

    pub fn ui(&self) -> UiState {
        self.mode.state()
    }

    /// Press feedback for the render layer while the button is held.
    pub fn pending_intent(&self, now_ms: u64) -> Option<Intent> {
        self.button.held_class(now_ms)
    }
}
