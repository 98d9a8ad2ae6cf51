//! Graphics-device capability interface consumed by the capture source.
//!
//! The host compositor owns the actual GPU backend; the capture core only
//! needs the handful of operations listed on [`GraphicsDevice`]. Textures
//! are always 32-bit BGRA.

use std::ops::{Deref, DerefMut};

/// Output color space reported by the rendering backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Standard sRGB output.
    #[default]
    Srgb,
    /// 16-bit float sRGB.
    Srgb16f,
    /// Rec. 709 with extended range.
    Rec709Extended,
    /// Rec. 709 scRGB.
    Rec709ScRgb,
}

/// Shader technique selected for the composite draw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    #[default]
    Draw,
    DrawSrgbDecompress,
    DrawMultiply,
    DrawSrgbDecompressMultiply,
}

/// Parameters for the sprite draw issued by the render adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub technique: Technique,
    /// Bind the texture for linear (sRGB-decoded) sampling.
    pub linear_srgb: bool,
    /// Output multiplier; `1.0` except for scRGB outputs.
    pub multiplier: f32,
    /// Flip the sprite vertically. Set only on the compatibility upload
    /// path, whose staged rows arrive in reversed order.
    pub flip_vertical: bool,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            technique: Technique::Draw,
            linear_srgb: false,
            multiplier: 1.0,
            flip_vertical: false,
        }
    }
}

/// Target surface for the bitmap-to-DC pixel transfer.
///
/// Implemented by host texture device contexts (direct upload path) and by
/// the CPU staging bitmap (compatibility path).
pub trait BlitSurface {
    /// Transfer `width * height` BGRA pixels with stride `width * 4`.
    /// Returns `false` when the transfer failed; the caller skips this
    /// tick's upload and keeps whatever the texture held before.
    fn blit_bgra(&mut self, width: u32, height: u32, pixels: &[u8]) -> bool;
}

/// The host's graphics backend, reduced to what frame capture needs.
///
/// Every texture create/destroy/update call must happen between
/// [`enter_context`](Self::enter_context) and
/// [`leave_context`](Self::leave_context); use [`GraphicsScope`] so the
/// scope is released on every path out.
pub trait GraphicsDevice {
    type Texture;
    /// Device-context handle handed out by [`texture_dc`](Self::texture_dc).
    type Dc: BlitSurface;

    fn enter_context(&mut self);
    fn leave_context(&mut self);

    /// Whether the backend can create device-context-linked textures. Probed
    /// once per instance; `false` selects the compatibility upload path.
    fn gdi_texture_available(&self) -> bool;

    /// Create a BGRA texture. `dynamic` textures accept full-image updates
    /// through [`set_texture_image`](Self::set_texture_image).
    fn create_texture(&mut self, width: u32, height: u32, dynamic: bool) -> Option<Self::Texture>;

    /// Create a BGRA texture that can hand out a device context.
    fn create_gdi_texture(&mut self, width: u32, height: u32) -> Option<Self::Texture>;

    fn destroy_texture(&mut self, texture: Self::Texture);

    fn texture_size(&self, texture: &Self::Texture) -> (u32, u32);

    /// Acquire the texture's device context for a CPU blit. `None` is a
    /// per-tick failure, not a reason to drop the texture.
    fn texture_dc(&mut self, texture: &Self::Texture) -> Option<Self::Dc>;

    /// Release a device context previously acquired with
    /// [`texture_dc`](Self::texture_dc), finalizing the upload.
    fn release_texture_dc(&mut self, texture: &Self::Texture);

    /// Replace a dynamic texture's contents with `pixels` at `stride` bytes
    /// per row.
    fn set_texture_image(&mut self, texture: &Self::Texture, pixels: &[u8], stride: u32);

    /// Full GPU-side copy of `src` into `dst`.
    fn copy_texture(&mut self, dst: &Self::Texture, src: &Self::Texture);

    /// Composite the texture with the given parameters.
    fn draw_sprite(&mut self, texture: &Self::Texture, params: &DrawParams);

    fn color_space(&self) -> ColorSpace;

    /// SDR white level in nits (scRGB outputs scale by `level / 80`).
    fn sdr_white_level(&self) -> f32;
}

/// Scope guard around the host's graphics context.
///
/// Entering takes the context immediately; dropping the guard leaves it, so
/// early returns and failure paths cannot leak the scope.
pub struct GraphicsScope<'a, D: GraphicsDevice> {
    device: &'a mut D,
}

impl<'a, D: GraphicsDevice> GraphicsScope<'a, D> {
    pub fn enter(device: &'a mut D) -> Self {
        device.enter_context();
        Self { device }
    }
}

impl<D: GraphicsDevice> Deref for GraphicsScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: GraphicsDevice> DerefMut for GraphicsScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: GraphicsDevice> Drop for GraphicsScope<'_, D> {
    fn drop(&mut self) {
        self.device.leave_context();
    }
}
