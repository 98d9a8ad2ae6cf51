//! GDI staging: a DIB section plus the bitmap-to-DC pixel transfer.

use std::slice;

use anyhow::{anyhow, Result};
use capture_core::BlitSurface;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject,
    SelectObject, SetDIBits, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP, HDC,
    HGDIOBJ, SRCCOPY,
};

fn bitmap_info(width: i32, height: i32) -> BITMAPINFO {
    BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: height,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Blit top-down BGRA rows into a device context through an intermediate
/// compatible bitmap (`SetDIBits` + `BitBlt`).
///
/// Dimensions are narrowed to the signed 32-bit values the bitmap header
/// requires.
pub fn blit_bgra_to_dc(dc: HDC, width: u32, height: u32, pixels: &[u8]) -> bool {
    let (w, h) = (width as i32, height as i32);
    unsafe {
        let mem_dc = CreateCompatibleDC(Some(dc));
        if mem_dc.is_invalid() {
            return false;
        }
        let bitmap = CreateCompatibleBitmap(dc, w, h);
        if bitmap.is_invalid() {
            let _ = DeleteDC(mem_dc);
            return false;
        }
        let previous = SelectObject(mem_dc, bitmap.into());

        let info = bitmap_info(w, h);
        SetDIBits(
            Some(mem_dc),
            bitmap,
            0,
            height,
            pixels.as_ptr().cast(),
            &info,
            DIB_RGB_COLORS,
        );
        let ok = BitBlt(dc, 0, 0, w, h, Some(mem_dc), 0, 0, SRCCOPY).is_ok();

        SelectObject(mem_dc, previous);
        let _ = DeleteObject(bitmap.into());
        let _ = DeleteDC(mem_dc);
        ok
    }
}

/// [`BlitSurface`] adapter for a host-provided texture device context.
pub struct GdiSurface(pub HDC);

impl BlitSurface for GdiSurface {
    fn blit_bgra(&mut self, width: u32, height: u32, pixels: &[u8]) -> bool {
        blit_bgra_to_dc(self.0, width, height, pixels)
    }
}

/// A top-down 32 bpp DIB section selected into a memory DC.
///
/// The negative `biHeight` makes the section top-down; the transfer in
/// [`blit_bgra_to_dc`] still hands rows over bottom-up, so the staged image
/// ends up with the source rows reversed. The render pass flips vertically
/// to compensate.
pub struct StagingBitmap {
    dc: HDC,
    bitmap: HBITMAP,
    previous: HGDIOBJ,
    bits: *mut u8,
    width: u32,
    height: u32,
}

impl StagingBitmap {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let info = bitmap_info(width as i32, -(height as i32));
        unsafe {
            let dc = CreateCompatibleDC(None);
            if dc.is_invalid() {
                return Err(anyhow!("CreateCompatibleDC failed"));
            }
            let mut bits = std::ptr::null_mut();
            let bitmap = match CreateDIBSection(Some(dc), &info, DIB_RGB_COLORS, &mut bits, None, 0)
            {
                Ok(bitmap) => bitmap,
                Err(e) => {
                    let _ = DeleteDC(dc);
                    return Err(anyhow!("CreateDIBSection failed: {e}"));
                }
            };
            let previous = SelectObject(dc, bitmap.into());
            Ok(Self {
                dc,
                bitmap,
                previous,
                bits: bits as *mut u8,
                width,
                height,
            })
        }
    }

    /// Staged pixel bytes, `height` rows at [`stride`](Self::stride) bytes.
    pub fn bytes(&self) -> &[u8] {
        let len = self.width as usize * self.height as usize * 4;
        // SAFETY: the DIB section owns `len` bytes at `bits` for the life of
        // the bitmap, which outlives every borrow of self.
        unsafe { slice::from_raw_parts(self.bits, len) }
    }

    pub fn stride(&self) -> u32 {
        self.width.wrapping_mul(4)
    }
}

impl BlitSurface for StagingBitmap {
    fn blit_bgra(&mut self, width: u32, height: u32, pixels: &[u8]) -> bool {
        if width != self.width || height != self.height {
            return false;
        }
        blit_bgra_to_dc(self.dc, width, height, pixels)
    }
}

impl Drop for StagingBitmap {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc, self.previous);
            let _ = DeleteDC(self.dc);
            let _ = DeleteObject(self.bitmap.into());
        }
    }
}

// SAFETY: the DIB section and DC are only touched through &mut self calls,
// which the host serializes per instance.
unsafe impl Send for StagingBitmap {}
