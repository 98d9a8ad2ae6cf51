//! Shared-memory frame capture source.
//!
//! Reads BGRA frames an external producer writes into a named shared memory
//! region and keeps a GPU texture current for the host compositor. The
//! region carries a small header (validity flag plus dimensions) ahead of
//! the pixel payload; each tick the source re-reads the header, maps the
//! payload, and pushes it into GPU memory.
//!
//! # Overview
//!
//! - [`MmfCapture`] — per-instance state and the tick/render entry points.
//! - [`upload::TexturePipeline`] — texture (re)allocation and the two upload
//!   paths (device-context blit, or CPU staging + dynamic update).
//! - [`staging`] — the CPU staging bitmap behind the compatibility path.
//! - [`module`] — registration surface handed to the host at load time.
//!
//! The host engine is consumed through the traits in [`capture_core`]; the
//! shared region through [`shm_interop`].

pub mod capture;
pub mod module;
pub mod render;
pub mod staging;
pub mod upload;

pub use capture::MmfCapture;
pub use staging::StagingBitmap;
pub use upload::TexturePipeline;
