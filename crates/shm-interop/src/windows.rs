//! Named file-mapping access via the Win32 API.
//!
//! The producer creates the mapping; we open it with `FILE_MAP_READ` only.
//! `FileMapping` closes its handle on drop and `MappedView` unmaps on drop,
//! so no error path can leak either.

use std::ops::Deref;
use std::slice;

use tracing::debug;
use windows::core::HSTRING;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Memory::{
    MapViewOfFile, OpenFileMappingW, UnmapViewOfFile, FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS,
};

use crate::{SharedMemory, SharedRegion};

/// Opens named Win32 file mappings read-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileMappings;

impl SharedMemory for FileMappings {
    type Region = FileMapping;

    fn open(&self, name: &str) -> Option<FileMapping> {
        if name.is_empty() {
            return None;
        }
        let handle =
            match unsafe { OpenFileMappingW(FILE_MAP_READ.0, false, &HSTRING::from(name)) } {
                Ok(handle) if !handle.is_invalid() => handle,
                _ => {
                    debug!(name, "file mapping not available");
                    return None;
                }
            };
        Some(FileMapping { handle })
    }
}

/// An open file-mapping handle. Closed exactly once, on drop.
pub struct FileMapping {
    handle: HANDLE,
}

impl SharedRegion for FileMapping {
    type View = MappedView;

    fn map(&self, len: u64) -> Option<MappedView> {
        let len = usize::try_from(len).ok()?;
        let address = unsafe { MapViewOfFile(self.handle, FILE_MAP_READ, 0, 0, len) };
        if address.Value.is_null() {
            return None;
        }
        Some(MappedView { address, len })
    }
}

impl Drop for FileMapping {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

// SAFETY: the handle is a kernel object reference; ownership may move across
// threads, and all access goes through &self calls the host serializes.
unsafe impl Send for FileMapping {}

/// A mapped read-only view over the first `len` bytes of the region.
pub struct MappedView {
    address: MEMORY_MAPPED_VIEW_ADDRESS,
    len: usize,
}

impl Deref for MappedView {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the view covers `len` readable bytes until unmapped, and
        // unmap only happens in Drop.
        unsafe { slice::from_raw_parts(self.address.Value as *const u8, self.len) }
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        unsafe {
            let _ = UnmapViewOfFile(self.address);
        }
    }
}
