//! Heap-backed staging bitmap.

use anyhow::{anyhow, Result};
use capture_core::BlitSurface;

/// A top-down 32 bpp staging image backed by process memory.
pub struct StagingBitmap {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl StagingBitmap {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = u64::from(width) * u64::from(height) * 4;
        let len = usize::try_from(len).map_err(|_| anyhow!("staging image too large"))?;
        Ok(Self {
            width,
            height,
            bytes: vec![0; len],
        })
    }

    /// Staged pixel bytes, `height` rows at [`stride`](Self::stride) bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn stride(&self) -> u32 {
        self.width.wrapping_mul(4)
    }
}

impl BlitSurface for StagingBitmap {
    /// The bitmap-to-DC transfer hands rows over bottom-up while the staging
    /// surface is top-down, so row `i` of the source lands in row
    /// `height - 1 - i` of the staging image.
    fn blit_bgra(&mut self, width: u32, height: u32, pixels: &[u8]) -> bool {
        if width != self.width || height != self.height {
            return false;
        }
        let stride = width as usize * 4;
        let rows = height as usize;
        if pixels.len() < stride * rows {
            return false;
        }
        for row in 0..rows {
            let src = &pixels[row * stride..(row + 1) * stride];
            let dst = rows - 1 - row;
            self.bytes[dst * stride..(dst + 1) * stride].copy_from_slice(src);
        }
        true
    }
}
