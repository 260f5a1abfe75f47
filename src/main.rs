//! dashcluster firmware entry point (nRF52840).
//!
//! Tasks:
//!   - control loop: polls speed + button every `TICK_MS`, debounces the
//!     button, runs `Cluster::tick`, publishes the readout
//!   - storage: commits checkpoint requests to flash
//!
//! The control loop never waits on flash; checkpoints go through a
//! bounded channel with `try_send`.

#![no_std]
#![no_main]

use dashcluster::config::{CHECKPOINT_QUEUE_DEPTH, TICK_MS};
use dashcluster::readout::Readout;
use dashcluster::storage::{self, FlashStore};
use dashcluster::ui::debounce::Debouncer;
use dashcluster::{CheckpointRequest, Cluster, ClusterConfig, TickSample};
use defmt::{debug, error, info, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use {defmt_rtt as _, panic_probe as _};

type Flash = FlashStore<BlockingAsync<Nvmc<'static>>>;

/// Latest vehicle speed (km/h), published by the vehicle bus decoder.
pub static SPEED_KMH: Signal<CriticalSectionRawMutex, f32> = Signal::new();

/// Latest readout for the display task, published on each OLED redraw.
pub static READOUT: Signal<CriticalSectionRawMutex, Readout> = Signal::new();

static CHECKPOINTS: Channel<CriticalSectionRawMutex, CheckpointRequest, CHECKPOINT_QUEUE_DEPTH> =
    Channel::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("dashcluster booting");

    let mut flash = FlashStore::new(BlockingAsync::new(Nvmc::new(p.NVMC)));

    let config = ClusterConfig::default();
    let mut cluster = match Cluster::new(config) {
        Ok(cluster) => cluster,
        Err(e) => {
            error!("Invalid cluster config: {:?}", e);
            return;
        }
    };

    match storage::restore(&mut flash).await {
        Ok(stored) => cluster.restore(stored),
        Err(e) => warn!("Odometer restore failed, starting from zero: {:?}", e),
    }

    if spawner
        .spawn(storage_task(flash, CHECKPOINTS.receiver()))
        .is_err()
    {
        error!("Failed to spawn storage task");
    }

    // Mode button: active-low with internal pull-up.
    let button = Input::new(p.P0_11, Pull::Up);
    let mut debouncer = Debouncer::new(&config);
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    let mut speed_kmh = 0.0f32;

    loop {
        if let Some(speed) = SPEED_KMH.try_take() {
            speed_kmh = speed;
        }

        let now_ms = Instant::now().as_millis();
        let report = cluster.tick(TickSample {
            now_ms,
            speed_kmh,
            button_pressed: debouncer.sample(button.is_low(), now_ms),
        });

        if let Some(request) = report.checkpoint {
            if CHECKPOINTS.try_send(request).is_err() {
                warn!("Checkpoint queue full, dropping {:?}", request.cause);
            }
        }

        if let Some(intent) = report.intent {
            info!("Button intent: {:?} -> {:?}", intent, report.ui);
        }

        if report.redraw.oled {
            debug!(
                "ODO {} km, trip {} x100 m, screen {}",
                report.readout.odometer_km,
                report.readout.trip_tenths,
                report.readout.screen_index
            );
            READOUT.signal(report.readout);
        }

        ticker.next().await;
    }
}

#[embassy_executor::task]
async fn storage_task(
    mut flash: Flash,
    requests: Receiver<'static, CriticalSectionRawMutex, CheckpointRequest, CHECKPOINT_QUEUE_DEPTH>,
) {
    loop {
        let request = requests.receive().await;
        match storage::commit(&mut flash, &request).await {
            Ok(()) => info!(
                "Saved odometer ({:?}): total={} trip={}",
                request.cause, request.total_m, request.trip_m
            ),
            Err(e) => error!("Checkpoint write failed: {:?}", e),
        }
    }
}
