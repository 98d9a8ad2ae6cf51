//! Texture allocation and the two pixel upload paths.
//!
//! The pipeline owns every GPU-side resource of a capture instance: the
//! primary texture, the extra texture used for the render-time copy pass
//! (direct mode), and the CPU staging bitmap (compatibility mode). All of
//! them are recreated together whenever the incoming frame's dimensions or
//! byte size change, and the old generation is destroyed before the new one
//! is allocated.

use capture_core::{BlitSurface, FrameHeader, GraphicsDevice, GraphicsScope};
use tracing::{debug, warn};

use crate::staging::StagingBitmap;

/// GPU resources and upload-path state for one capture instance.
pub struct TexturePipeline<D: GraphicsDevice> {
    pub(crate) texture: Option<D::Texture>,
    pub(crate) extra: Option<D::Texture>,
    pub(crate) staging: Option<StagingBitmap>,
    last_size: u64,
    compatibility: bool,
    probed: bool,
}

impl<D: GraphicsDevice> Default for TexturePipeline<D> {
    fn default() -> Self {
        Self {
            texture: None,
            extra: None,
            staging: None,
            last_size: 0,
            compatibility: false,
            probed: false,
        }
    }
}

impl<D: GraphicsDevice> TexturePipeline<D> {
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Whether the compatibility upload path is active.
    pub fn compatibility(&self) -> bool {
        self.compatibility
    }

    /// Decide the upload path from the backend's capabilities. Probed once
    /// per instance, then cached.
    pub fn probe_compatibility(&mut self, device: &D) {
        if !self.probed {
            self.compatibility = !device.gdi_texture_available();
            self.probed = true;
            debug!(
                compatibility = self.compatibility,
                "probed texture upload capability"
            );
        }
    }

    /// Whether the current resources fit a frame described by `header`.
    pub fn needs_rebuild(&self, device: &D, header: &FrameHeader, size: u64) -> bool {
        match &self.texture {
            None => true,
            Some(texture) => {
                self.last_size != size
                    || device.texture_size(texture) != (header.width, header.height)
            }
        }
    }

    /// Destroy the current resource generation and allocate one sized
    /// `width` x `height`.
    ///
    /// On the direct path a failure to allocate the extra texture rolls the
    /// primary back too; the instance renders nothing until a later tick's
    /// rebuild succeeds. Must be called inside a graphics scope.
    pub fn rebuild(&mut self, device: &mut D, width: u32, height: u32, size: u64) {
        self.release(device);
        self.last_size = size;

        if self.compatibility {
            self.texture = device.create_texture(width, height, true);
            if self.texture.is_some() {
                match StagingBitmap::new(width, height) {
                    Ok(staging) => self.staging = Some(staging),
                    Err(e) => warn!("failed to create staging bitmap: {e:#}"),
                }
            }
        } else {
            self.texture = device.create_gdi_texture(width, height);
            if let Some(texture) = self.texture.take() {
                match device.create_texture(width, height, false) {
                    Some(extra) => {
                        self.texture = Some(texture);
                        self.extra = Some(extra);
                    }
                    None => device.destroy_texture(texture),
                }
            }
        }

        if self.texture.is_none() {
            warn!("failed to create capture textures");
        }
    }

    /// Copy one frame's pixels into the primary texture.
    ///
    /// Direct path: acquire the texture's device context, blit, release.
    /// Compatibility path: blit into the staging bitmap, then push the
    /// staged bytes as a full dynamic update. Must be called inside a
    /// graphics scope; failures skip this tick's upload and keep the
    /// previous contents on screen.
    pub fn upload(&mut self, device: &mut D, header: &FrameHeader, pixels: &[u8]) {
        let Some(texture) = &self.texture else {
            return;
        };

        if self.compatibility {
            let Some(staging) = self.staging.as_mut() else {
                warn!("failed to get staging surface");
                return;
            };
            if !staging.blit_bgra(header.width, header.height, pixels) {
                warn!("failed to stage frame pixels");
                return;
            }
            device.set_texture_image(texture, staging.bytes(), staging.stride());
        } else {
            let Some(mut dc) = device.texture_dc(texture) else {
                warn!("failed to get texture DC");
                return;
            };
            if !dc.blit_bgra(header.width, header.height, pixels) {
                warn!("failed to blit frame pixels");
            }
            device.release_texture_dc(texture);
        }
    }

    /// Destroy all GPU resources, entering a graphics scope of its own.
    /// Idempotent; safe on an already-released pipeline.
    pub fn destroy(&mut self, device: &mut D) {
        self.last_size = 0;
        let mut device = GraphicsScope::enter(device);
        self.release(&mut device);
    }

    /// Drop the staging bitmap and destroy both textures. Caller holds the
    /// graphics scope.
    fn release(&mut self, device: &mut D) {
        self.staging = None;
        if let Some(extra) = self.extra.take() {
            device.destroy_texture(extra);
        }
        if let Some(texture) = self.texture.take() {
            device.destroy_texture(texture);
        }
    }
}
