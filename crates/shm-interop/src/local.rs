//! Process-local named regions.
//!
//! A heap-backed stand-in for OS shared memory: a producer in the same
//! process publishes a byte buffer under a name, and consumers open and map
//! it through the same trait surface as the OS-backed implementation. Views
//! snapshot the bytes at map time, which tolerates the same concurrent-write
//! tearing the OS path does.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::{SharedMemory, SharedRegion};

/// Shared backing storage for one published region.
pub type RegionBuffer = Arc<RwLock<Vec<u8>>>;

static REGIONS: Lazy<Mutex<HashMap<String, RegionBuffer>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Publish (or replace) a region under `name`.
///
/// Returns the backing buffer so the producer can keep rewriting frames
/// through it while consumers hold the region open.
pub fn publish(name: &str, bytes: Vec<u8>) -> RegionBuffer {
    let buffer: RegionBuffer = Arc::new(RwLock::new(bytes));
    REGIONS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.to_owned(), Arc::clone(&buffer));
    debug!(name, "published local region");
    buffer
}

/// Remove the region published under `name`. Already-open handles keep their
/// backing buffer alive; new opens fail.
pub fn unpublish(name: &str) {
    REGIONS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(name);
}

/// Opens regions from the process-local registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSharedMemory;

impl SharedMemory for LocalSharedMemory {
    type Region = LocalRegion;

    fn open(&self, name: &str) -> Option<LocalRegion> {
        if name.is_empty() {
            return None;
        }
        let data = REGIONS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()?;
        Some(LocalRegion { data })
    }
}

/// An open handle onto a published buffer.
pub struct LocalRegion {
    data: RegionBuffer,
}

impl SharedRegion for LocalRegion {
    type View = LocalView;

    fn map(&self, len: u64) -> Option<LocalView> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let len = usize::try_from(len).ok()?;
        if data.len() < len {
            return None;
        }
        Some(LocalView {
            bytes: data[..len].to_vec(),
        })
    }
}

/// A mapped view: a snapshot of the region's first `len` bytes.
pub struct LocalView {
    bytes: Vec<u8>,
}

impl Deref for LocalView {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}
