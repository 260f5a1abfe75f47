//! Unified error type for dashcluster.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.
//!
//! Malformed sensor samples are not errors: the logic components clamp
//! them locally and keep the control loop running.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// The key-value storage collaborator failed.
    Storage(StorageError),

    // Configuration
    /// `ClusterConfig` thresholds are inconsistent.
    InvalidConfig,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Subset of storage failures we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash read failed.
    Read,
    /// Flash write or erase failed.
    Write,
    /// A stored record could not be decoded.
    Corrupt,
}

// Convenience conversions

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}
