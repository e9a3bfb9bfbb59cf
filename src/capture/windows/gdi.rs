//! GDI pixel transfer.
//!
//! Every GDI object is held by a guard that releases it on drop, so each
//! capture attempt returns all of its device contexts and bitmaps before the
//! next one starts, including on error paths. GDI enforces a per-process
//! handle quota.

use crate::{
    capture::traits::CaptureSource,
    error::{CaptureError, CaptureResult},
    types::{CaptureRegion, RawImage},
};

use super::to_hwnd;

use ::windows::Win32::{Foundation::HWND, Graphics::Gdi::*};

/// DC obtained with GetWindowDC/GetDC, released with ReleaseDC
struct SourceDc {
    hwnd: HWND,
    hdc: HDC,
}

impl SourceDc {
    fn acquire(source: CaptureSource) -> CaptureResult<Self> {
        let hwnd = match source {
            CaptureSource::Window(handle) => to_hwnd(handle),
            CaptureSource::Desktop => HWND(std::ptr::null_mut()),
        };

        // GetWindowDC(NULL) is the DC of the entire desktop
        let hdc = unsafe { GetWindowDC(hwnd) };
        if hdc.is_invalid() {
            return Err(CaptureError::DeviceContextUnavailable(format!(
                "GetWindowDC failed for {:?}",
                source
            )));
        }
        Ok(Self { hwnd, hdc })
    }
}

impl Drop for SourceDc {
    fn drop(&mut self) {
        unsafe {
            ReleaseDC(self.hwnd, self.hdc);
        }
    }
}

/// Memory DC created with CreateCompatibleDC
struct MemoryDc(HDC);

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteDC(self.0);
        }
    }
}

/// Bitmap created with CreateCompatibleBitmap
struct Bitmap(HBITMAP);

impl Drop for Bitmap {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0);
        }
    }
}

/// Restores the previously selected object of a memory DC
struct Selection {
    hdc: HDC,
    previous: HGDIOBJ,
}

impl Drop for Selection {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.hdc, self.previous);
        }
    }
}

/// GDI-based pixel transfer
pub struct GdiCapture;

impl GdiCapture {
    pub fn new() -> Self {
        Self
    }

    /// Copy `region` of `source` into a top-down BGRA buffer
    pub fn capture(&self, source: CaptureSource, region: CaptureRegion) -> CaptureResult<RawImage> {
        let width = region.width as i32;
        let height = region.height as i32;

        let source_dc = SourceDc::acquire(source)?;

        let mem_dc = MemoryDc(unsafe { CreateCompatibleDC(source_dc.hdc) });
        if mem_dc.0.is_invalid() {
            return Err(CaptureError::DeviceContextUnavailable(
                "CreateCompatibleDC failed".to_string(),
            ));
        }

        let bitmap = Bitmap(unsafe { CreateCompatibleBitmap(source_dc.hdc, width, height) });
        if bitmap.0.is_invalid() {
            return Err(CaptureError::CaptureFailed(format!(
                "CreateCompatibleBitmap failed for {}x{}",
                width, height
            )));
        }

        // Declared after the bitmap and DC guards so it is dropped first
        let selection = Selection {
            hdc: mem_dc.0,
            previous: unsafe { SelectObject(mem_dc.0, bitmap.0) },
        };

        unsafe {
            BitBlt(
                mem_dc.0,
                0,
                0,
                width,
                height,
                source_dc.hdc,
                region.x,
                region.y,
                SRCCOPY,
            )
        }
        .map_err(|e| CaptureError::CaptureFailed(format!("BitBlt failed: {}", e)))?;

        // GetDIBits requires the bitmap not to be selected into any DC
        drop(selection);

        let mut bmp_info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // Negative for top-down bitmap
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut data = vec![0u8; region.pixel_count() * 4];
        let scan_lines = unsafe {
            GetDIBits(
                mem_dc.0,
                bitmap.0,
                0,
                region.height,
                Some(data.as_mut_ptr() as *mut _),
                &mut bmp_info,
                DIB_RGB_COLORS,
            )
        };

        if scan_lines <= 0 {
            return Err(CaptureError::CaptureFailed(
                "GetDIBits returned no scan lines".to_string(),
            ));
        }

        log::trace!("GDI copied {}x{} from {:?}", width, height, source);
        Ok(RawImage::new(data, region.width, region.height))
    }
}
