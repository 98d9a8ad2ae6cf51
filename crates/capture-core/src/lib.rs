//! Host capability surface for the shared-memory capture source.
//!
//! The capture core talks to its host compositing engine through the narrow
//! interfaces defined here:
//!
//! - [`GraphicsDevice`] — texture creation/destruction, device-context and
//!   dynamic upload paths, the final sprite draw, and color-space queries.
//! - [`SourceQueries`] — per-source visibility and texcoord-centering state.
//! - [`SettingsStore`] — the host's key/value settings object.
//! - [`FrameHeader`] — the fixed-layout prefix the producer writes ahead of
//!   each frame's pixel payload.
//! - [`SourceDescriptor`] — the registration record handed to the host's
//!   source registry at module load.
//!
//! The host engine itself is never reimplemented; real implementations of
//! these traits live in host adapter code, and the test suite substitutes
//! in-memory ones.

pub mod graphics;
pub mod header;
pub mod settings;
pub mod source;

pub use graphics::{
    BlitSurface, ColorSpace, DrawParams, GraphicsDevice, GraphicsScope, Technique,
};
pub use header::{FrameHeader, HEADER_PREFIX_LEN};
pub use settings::{CaptureSettings, MemorySettings, SettingsStore};
pub use source::{Property, SourceDescriptor, SourceQueries, SourceRegistry, SourceType};
