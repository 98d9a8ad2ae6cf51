//! Per-instance capture state and the tick orchestrator.
//!
//! A tick runs the full ingestion chain: visibility gate, region open (with
//! reconnect cooldown), header read, payload map, texture (re)allocation,
//! pixel upload. Every failure along the way abandons the rest of the tick
//! and leaves the instance ready to retry; nothing here is fatal to the
//! host.

use capture_core::{
    CaptureSettings, FrameHeader, GraphicsDevice, GraphicsScope, SettingsStore, SourceQueries,
    HEADER_PREFIX_LEN,
};
use shm_interop::{SharedMemory, SharedRegion};

use crate::upload::TexturePipeline;

/// Seconds to wait between attempts to open an absent region.
const REOPEN_COOLDOWN_SECS: f32 = 1.0;

/// A shared-memory capture source instance.
///
/// The host drives it through [`update`](Self::update),
/// [`tick`](Self::tick) and [`render`](Self::render), and must call
/// [`destroy`](Self::destroy) before dropping the instance so GPU resources
/// are released through the device. All entry points are safe to call in
/// any order and on an already-torn-down instance.
pub struct MmfCapture<S: SharedMemory, D: GraphicsDevice> {
    shm: S,
    settings: CaptureSettings,
    region: Option<S::Region>,
    reopen_elapsed: f32,
    last_header: FrameHeader,
    pub(crate) pipeline: TexturePipeline<D>,
}

impl<S: SharedMemory, D: GraphicsDevice> MmfCapture<S, D> {
    /// Create an instance from the host settings and attempt an immediate
    /// open of the configured region.
    pub fn new(shm: S, settings: &dyn SettingsStore) -> Self {
        let mut capture = Self {
            shm,
            settings: CaptureSettings::load(settings),
            region: None,
            reopen_elapsed: 0.0,
            last_header: FrameHeader::default(),
            pipeline: TexturePipeline::default(),
        };
        capture.try_open();
        capture
    }

    /// Reported width: the last validated frame, or the configured fallback
    /// while no valid frame has been read.
    pub fn width(&self) -> u32 {
        if self.last_header.is_valid() {
            self.last_header.width
        } else {
            self.settings.initial_width
        }
    }

    /// Reported height, same fallback rule as [`width`](Self::width).
    pub fn height(&self) -> u32 {
        if self.last_header.is_valid() {
            self.last_header.height
        } else {
            self.settings.initial_height
        }
    }

    /// Settings changed: full teardown, reload, immediate reconnect attempt.
    pub fn update(&mut self, settings: &dyn SettingsStore, device: &mut D) {
        self.region = None;
        self.pipeline.destroy(device);
        self.last_header = FrameHeader::default();
        self.reopen_elapsed = 0.0;
        self.settings = CaptureSettings::load(settings);
        self.try_open();
    }

    /// Release the region handle and all GPU resources. Idempotent.
    pub fn destroy(&mut self, device: &mut D) {
        self.region = None;
        self.pipeline.destroy(device);
    }

    /// Try to open the configured region. An empty map name also clears the
    /// last header so the reported size reverts to the configured fallback.
    fn try_open(&mut self) -> bool {
        if self.settings.map_name.is_empty() {
            self.last_header = FrameHeader::default();
            self.region = None;
            return false;
        }
        self.region = self.shm.open(&self.settings.map_name);
        self.region.is_some()
    }

    /// Ingest one frame if the producer has published one.
    ///
    /// `seconds` is the host's elapsed time since the previous tick and only
    /// feeds the reconnect cooldown. A hidden source returns before touching
    /// the region or the device.
    pub fn tick<Q: SourceQueries>(&mut self, source: &Q, device: &mut D, seconds: f32) {
        if !source.showing() {
            return;
        }

        if self.region.is_none() {
            self.reopen_elapsed += seconds;
            if self.reopen_elapsed < REOPEN_COOLDOWN_SECS {
                return;
            }
            self.reopen_elapsed = 0.0;
            if !self.try_open() {
                return;
            }
        } else {
            self.reopen_elapsed = 0.0;
        }

        let Some(region) = self.region.as_ref() else {
            return;
        };

        // Header view: copy the fields out, unmap before touching anything
        // else.
        let header = {
            let Some(view) = region.map(HEADER_PREFIX_LEN as u64) else {
                return;
            };
            let Some(header) = FrameHeader::parse(&view) else {
                return;
            };
            header
        };
        if !header.is_valid() {
            return;
        }

        let size = header.payload_len();
        let Some(view) = region.map(size.saturating_add(HEADER_PREFIX_LEN as u64)) else {
            return;
        };
        let Ok(payload_len) = usize::try_from(size) else {
            return;
        };
        let Some(end) = HEADER_PREFIX_LEN.checked_add(payload_len) else {
            return;
        };
        let Some(pixels) = view.get(HEADER_PREFIX_LEN..end) else {
            return;
        };

        {
            let mut device = GraphicsScope::enter(device);
            self.pipeline.probe_compatibility(&device);
            if self.pipeline.needs_rebuild(&device, &header, size) {
                self.pipeline.rebuild(&mut device, header.width, header.height, size);
            }
            if self.pipeline.has_texture() {
                self.last_header = header;
                self.pipeline.upload(&mut device, &header, pixels);
            }
        }
        // `view` drops here: the payload mapping never outlives the tick.
    }
}
