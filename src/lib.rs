//! Instrument cluster core logic.
//!
//! This library holds the pure logic that runs unchanged on the host
//! and on target: distance integration, checkpoint policy, button
//! classification and display mode state, wired together by `Cluster`.
//!
//! Usage: `cargo test --lib` / `cargo test --test integration`
//!
//! Note: The embedded binary (main.rs, `embedded` feature) adds the
//! embassy runtime, GPIO polling and the flash-backed `storage::FlashStore`
//! on top of this library.

#![cfg_attr(not(test), no_std)]

// ═══════════════════════════════════════════════════════════════════════════
// Ambient modules
// ═══════════════════════════════════════════════════════════════════════════

#[macro_use]
mod log;

pub mod config;
pub mod error;

// ═══════════════════════════════════════════════════════════════════════════
// Cluster logic
// ═══════════════════════════════════════════════════════════════════════════

pub mod cluster;
pub mod odometer;
pub mod persistence;
pub mod readout;
pub mod storage;
pub mod ui;

pub use cluster::{Cluster, TickReport, TickSample};
pub use config::ClusterConfig;
pub use error::{Error, StorageError};
pub use persistence::{CheckpointCause, CheckpointRequest};
pub use ui::{Intent, UiState};
