//! Access to named, externally-owned shared memory regions.
//!
//! A producer process creates and sizes the region; this crate only opens it
//! for reading and maps bounded views. Two implementations exist:
//!
//! - [`windows`] — Win32 named file mappings (`OpenFileMappingW` /
//!   `MapViewOfFile`), the production path.
//! - [`local`] — a process-local named registry backed by heap buffers, used
//!   on other targets and throughout the test suite for synthetic producers.
//!
//! Handles and views are RAII: dropping a region closes the handle, dropping
//! a view unmaps it. There is no producer synchronization beyond what the
//! caller layers on top; a view mapped while the producer is mid-write can
//! observe a torn frame.

use std::ops::Deref;

pub mod local;
#[cfg(target_os = "windows")]
pub mod windows;

/// Opens named shared memory regions for reading.
pub trait SharedMemory {
    type Region: SharedRegion;

    /// Open the region published under `name`, read-only.
    ///
    /// `None` when the name is empty or no producer has published a region
    /// under it — an expected, recoverable condition, not an error.
    fn open(&self, name: &str) -> Option<Self::Region>;
}

/// An open read-only region handle. Dropping it closes the handle.
pub trait SharedRegion {
    type View: Deref<Target = [u8]>;

    /// Map the first `len` bytes of the region read-only.
    ///
    /// `None` on mapping failure (including a region smaller than `len`);
    /// the handle itself stays usable. Dropping the view unmaps it.
    fn map(&self, len: u64) -> Option<Self::View>;
}

/// Region provider for the current platform.
#[cfg(target_os = "windows")]
pub type PlatformSharedMemory = windows::FileMappings;
#[cfg(not(target_os = "windows"))]
pub type PlatformSharedMemory = local::LocalSharedMemory;
