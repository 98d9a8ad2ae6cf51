//! Shared test doubles: a recording graphics device, a host source stub,
//! and helpers for publishing synthetic producer frames.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use capture_core::settings::SETTING_MAP_NAME;
use capture_core::{
    BlitSurface, ColorSpace, DrawParams, GraphicsDevice, MemorySettings, SourceQueries,
    HEADER_PREFIX_LEN,
};
use shm_interop::local::{self, LocalRegion, LocalSharedMemory, RegionBuffer};
use shm_interop::{SharedMemory, SharedRegion};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Region bytes for one producer frame: header prefix plus payload.
pub fn frame_bytes(valid: u8, width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_PREFIX_LEN + pixels.len()];
    bytes[0] = valid;
    bytes[1..5].copy_from_slice(&width.to_ne_bytes());
    bytes[5..9].copy_from_slice(&height.to_ne_bytes());
    bytes[HEADER_PREFIX_LEN..].copy_from_slice(pixels);
    bytes
}

/// Publish a frame under `name` in the process-local registry.
pub fn publish_frame(
    name: &str,
    valid: u8,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> RegionBuffer {
    local::publish(name, frame_bytes(valid, width, height, pixels))
}

/// Settings store with this source's defaults plus the given map name.
pub fn settings_for(map_name: &str) -> MemorySettings {
    let mut store = MemorySettings::new();
    mmf_capture::module::apply_defaults(&mut store);
    store.set_string(SETTING_MAP_NAME, map_name);
    store
}

// ---------------------------------------------------------------------------
// Shared memory with call counters
// ---------------------------------------------------------------------------

/// Wraps the local registry, counting open and map calls.
#[derive(Clone, Default)]
pub struct CountingShm {
    pub opens: Arc<AtomicUsize>,
    pub maps: Arc<AtomicUsize>,
}

impl CountingShm {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SharedMemory for CountingShm {
    type Region = CountingRegion;

    fn open(&self, name: &str) -> Option<CountingRegion> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let inner = LocalSharedMemory.open(name)?;
        Some(CountingRegion {
            inner,
            maps: Arc::clone(&self.maps),
        })
    }
}

pub struct CountingRegion {
    inner: LocalRegion,
    maps: Arc<AtomicUsize>,
}

impl SharedRegion for CountingRegion {
    type View = <LocalRegion as SharedRegion>::View;

    fn map(&self, len: u64) -> Option<Self::View> {
        self.maps.fetch_add(1, Ordering::SeqCst);
        self.inner.map(len)
    }
}

// ---------------------------------------------------------------------------
// Host source stub
// ---------------------------------------------------------------------------

pub struct MockSource {
    pub showing: Cell<bool>,
    pub centered: Cell<bool>,
}

impl MockSource {
    pub fn visible() -> Self {
        Self {
            showing: Cell::new(true),
            centered: Cell::new(false),
        }
    }
}

impl SourceQueries for MockSource {
    fn showing(&self) -> bool {
        self.showing.get()
    }

    fn texcoords_centered(&self) -> bool {
        self.centered.get()
    }
}

// ---------------------------------------------------------------------------
// Recording graphics device
// ---------------------------------------------------------------------------

pub struct MockTexture {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    bytes: Rc<RefCell<Vec<u8>>>,
}

pub struct MockDc {
    target: Rc<RefCell<Vec<u8>>>,
}

impl BlitSurface for MockDc {
    fn blit_bgra(&mut self, width: u32, height: u32, pixels: &[u8]) -> bool {
        let len = width as usize * height as usize * 4;
        if pixels.len() < len {
            return false;
        }
        let mut target = self.target.borrow_mut();
        target.clear();
        target.extend_from_slice(&pixels[..len]);
        true
    }
}

/// Graphics backend double that records every call and can be told to fail
/// specific operations.
pub struct MockDevice {
    pub gdi_available: bool,
    pub fail_create: bool,
    pub fail_extra: bool,
    pub fail_dc: bool,
    pub color_space: ColorSpace,
    pub white_level: f32,

    next_id: u32,
    pub created: usize,
    pub destroyed: usize,
    /// Live texture id -> dimensions. Destroying an id twice panics.
    pub live: HashMap<u32, (u32, u32)>,
    /// Texture id -> its current GPU-side bytes (shared with the handle).
    pub texture_bytes: HashMap<u32, Rc<RefCell<Vec<u8>>>>,
    pub dc_acquired: Vec<u32>,
    pub dc_releases: usize,
    /// (texture id, stride) per dynamic update.
    pub dynamic_updates: Vec<(u32, u32)>,
    /// (dst id, src id) per full copy.
    pub copies: Vec<(u32, u32)>,
    /// (texture id, params) per sprite draw.
    pub draws: Vec<(u32, DrawParams)>,
    pub context_enters: usize,
    pub context_leaves: usize,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            gdi_available: true,
            fail_create: false,
            fail_extra: false,
            fail_dc: false,
            color_space: ColorSpace::Srgb,
            white_level: 300.0,
            next_id: 0,
            created: 0,
            destroyed: 0,
            live: HashMap::new(),
            texture_bytes: HashMap::new(),
            dc_acquired: Vec::new(),
            dc_releases: 0,
            dynamic_updates: Vec::new(),
            copies: Vec::new(),
            draws: Vec::new(),
            context_enters: 0,
            context_leaves: 0,
        }
    }

    fn alloc(&mut self, width: u32, height: u32) -> MockTexture {
        self.next_id += 1;
        let id = self.next_id;
        let bytes = Rc::new(RefCell::new(vec![0u8; (width * height * 4) as usize]));
        self.created += 1;
        self.live.insert(id, (width, height));
        self.texture_bytes.insert(id, Rc::clone(&bytes));
        MockTexture {
            id,
            width,
            height,
            bytes,
        }
    }

    pub fn bytes_of(&self, id: u32) -> Vec<u8> {
        self.texture_bytes[&id].borrow().clone()
    }
}

impl GraphicsDevice for MockDevice {
    type Texture = MockTexture;
    type Dc = MockDc;

    fn enter_context(&mut self) {
        self.context_enters += 1;
    }

    fn leave_context(&mut self) {
        self.context_leaves += 1;
    }

    fn gdi_texture_available(&self) -> bool {
        self.gdi_available
    }

    fn create_texture(&mut self, width: u32, height: u32, _dynamic: bool) -> Option<MockTexture> {
        if self.fail_create || self.fail_extra {
            return None;
        }
        Some(self.alloc(width, height))
    }

    fn create_gdi_texture(&mut self, width: u32, height: u32) -> Option<MockTexture> {
        if self.fail_create {
            return None;
        }
        Some(self.alloc(width, height))
    }

    fn destroy_texture(&mut self, texture: MockTexture) {
        assert!(
            self.live.remove(&texture.id).is_some(),
            "double free of texture {}",
            texture.id
        );
        self.destroyed += 1;
    }

    fn texture_size(&self, texture: &MockTexture) -> (u32, u32) {
        (texture.width, texture.height)
    }

    fn texture_dc(&mut self, texture: &MockTexture) -> Option<MockDc> {
        if self.fail_dc {
            return None;
        }
        self.dc_acquired.push(texture.id);
        Some(MockDc {
            target: Rc::clone(&texture.bytes),
        })
    }

    fn release_texture_dc(&mut self, _texture: &MockTexture) {
        self.dc_releases += 1;
    }

    fn set_texture_image(&mut self, texture: &MockTexture, pixels: &[u8], stride: u32) {
        self.dynamic_updates.push((texture.id, stride));
        let mut bytes = texture.bytes.borrow_mut();
        bytes.clear();
        bytes.extend_from_slice(pixels);
    }

    fn copy_texture(&mut self, dst: &MockTexture, src: &MockTexture) {
        self.copies.push((dst.id, src.id));
        let copied = src.bytes.borrow().clone();
        *dst.bytes.borrow_mut() = copied;
    }

    fn draw_sprite(&mut self, texture: &MockTexture, params: &DrawParams) {
        self.draws.push((texture.id, *params));
    }

    fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    fn sdr_white_level(&self) -> f32 {
        self.white_level
    }
}
