//! `KeyValueStore` on internal flash via `sequential-storage`.

use core::ops::Range;

use defmt::{error, warn};
use embedded_storage_async::nor_flash::MultiwriteNorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

use super::{KeyValueStore, StorageKey};
use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use crate::error::{Error, StorageError};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Scratch buffer for one map item (1 key byte + 8 value bytes + header).
const ITEM_BUFFER_SIZE: usize = 32;

pub struct FlashStore<F> {
    flash: F,
    range: Range<u32>,
}

impl<F: MultiwriteNorFlash> FlashStore<F> {
    pub fn new(flash: F) -> Self {
        Self {
            flash,
            range: STORAGE_START..STORAGE_END,
        }
    }
}

fn map_error<E>(e: sequential_storage::Error<E>, fallback: StorageError) -> Error {
    match e {
        sequential_storage::Error::Corrupted { .. } => StorageError::Corrupt.into(),
        _ => fallback.into(),
    }
}

impl<F: MultiwriteNorFlash> KeyValueStore for FlashStore<F> {
    async fn write(&mut self, key: StorageKey, value: u64) -> Result<(), Error> {
        let mut buf = [0u8; ITEM_BUFFER_SIZE];
        store_item::<u8, u64, _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &key.id(),
            &value,
        )
        .await
        .map_err(|e| {
            error!("Flash write error on {}: {:?}", key.name(), defmt::Debug2Format(&e));
            map_error(e, StorageError::Write)
        })
    }

    async fn read(&mut self, key: StorageKey) -> Result<Option<u64>, Error> {
        let mut buf = [0u8; ITEM_BUFFER_SIZE];
        fetch_item::<u8, u64, _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &key.id(),
        )
        .await
        .map_err(|e| {
            warn!("Flash read error on {}: {:?}", key.name(), defmt::Debug2Format(&e));
            map_error(e, StorageError::Read)
        })
    }
}
