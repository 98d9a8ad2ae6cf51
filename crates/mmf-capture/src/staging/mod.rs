//! CPU-side staging bitmap for the compatibility upload path.
//!
//! When the backend cannot hand out a device context per texture, frame
//! pixels are first blitted into a CPU bitmap and then pushed into a dynamic
//! texture. On Windows the bitmap is a top-down 32 bpp DIB section selected
//! into a memory DC, so the pixels go through the same bitmap-to-DC transfer
//! as the direct path. Elsewhere a heap buffer reproduces the identical
//! transfer semantics.
//!
//! Either way the staged image holds the source rows in reversed order (the
//! transfer delivers rows bottom-up into a top-down surface); the render
//! pass compensates with a vertical flip.

#[cfg(target_os = "windows")]
mod gdi;
#[cfg(target_os = "windows")]
pub use gdi::{blit_bgra_to_dc, GdiSurface, StagingBitmap};

#[cfg(not(target_os = "windows"))]
mod heap;
#[cfg(not(target_os = "windows"))]
pub use heap::StagingBitmap;
