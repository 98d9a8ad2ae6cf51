//! Render-time compositing: sampling decision and the sprite draw.
//!
//! Runs once per displayed frame, independently of the tick, inside the
//! host's render callback (which already holds the graphics context).

use capture_core::{ColorSpace, DrawParams, GraphicsDevice, SourceQueries, Technique};
use shm_interop::SharedMemory;

use crate::capture::MmfCapture;

/// Decide how the captured texture is sampled and composited this frame.
///
/// Returns whether the primary texture must first be copied into the extra
/// texture (the primary cannot be sampled linearly when the host has not
/// centered the texture coordinates), plus the draw parameters.
pub(crate) fn select_draw(
    compatibility: bool,
    texcoords_centered: bool,
    color_space: ColorSpace,
    sdr_white_level: f32,
) -> (bool, DrawParams) {
    let mut linear_srgb = compatibility;
    let use_copy = !linear_srgb && !texcoords_centered;
    if use_copy {
        linear_srgb = true;
    }

    let mut technique = Technique::Draw;
    let mut multiplier = 1.0;
    match color_space {
        ColorSpace::Srgb => {}
        ColorSpace::Srgb16f | ColorSpace::Rec709Extended => {
            if !linear_srgb {
                technique = Technique::DrawSrgbDecompress;
            }
        }
        ColorSpace::Rec709ScRgb => {
            technique = if linear_srgb {
                Technique::DrawMultiply
            } else {
                Technique::DrawSrgbDecompressMultiply
            };
            multiplier = sdr_white_level / 80.0;
        }
    }

    (
        use_copy,
        DrawParams {
            technique,
            linear_srgb,
            multiplier,
            flip_vertical: compatibility,
        },
    )
}

impl<S: SharedMemory, D: GraphicsDevice> MmfCapture<S, D> {
    /// Draw the captured frame, if one exists and the source is showing.
    pub fn render<Q: SourceQueries>(&mut self, source: &Q, device: &mut D) {
        if !source.showing() || !self.pipeline.has_texture() {
            return;
        }

        let (use_copy, params) = select_draw(
            self.pipeline.compatibility(),
            source.texcoords_centered(),
            device.color_space(),
            device.sdr_white_level(),
        );

        let Some(texture) = self.pipeline.texture.as_ref() else {
            return;
        };
        if use_copy {
            // Direct mode always allocates the extra texture alongside the
            // primary, so this only misses when allocation was rolled back
            // and there is nothing to draw anyway.
            let Some(extra) = self.pipeline.extra.as_ref() else {
                return;
            };
            device.copy_texture(extra, texture);
            device.draw_sprite(extra, &params);
        } else {
            device.draw_sprite(texture, &params);
        }
    }
}
