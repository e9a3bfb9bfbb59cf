//! Traits for querying and capturing desktop surfaces

use crate::error::CaptureResult;
use crate::types::{CaptureRegion, DisplayInfo, RawImage, Rect, WindowHandle};

/// Where pixels are copied from.
///
/// A window source is addressed in the window's own coordinate space, whose
/// origin is the top-left corner of its nominal bounds. The desktop source is
/// addressed in absolute desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureSource {
    Window(WindowHandle),
    Desktop,
}

/// Capability queries against a windowing system, plus the pixel transfer.
///
/// One implementation exists per platform. The discovery engine and region
/// resolution only ever talk to this trait.
pub trait WindowSystem: Send + Sync {
    /// List the attached displays in platform order
    fn enumerate_displays(&self) -> CaptureResult<Vec<DisplayInfo>>;

    /// List the top-level windows in platform z-order
    fn enumerate_top_level_windows(&self) -> CaptureResult<Vec<WindowHandle>>;

    /// Nominal outer bounds of a window, in desktop coordinates
    fn window_bounds(&self, handle: WindowHandle) -> CaptureResult<Rect>;

    /// Visible extent reported by the compositor, without shadows and resize
    /// borders. `None` when the platform or window has no such information.
    fn composited_bounds(&self, handle: WindowHandle) -> Option<Rect>;

    fn is_minimized(&self, handle: WindowHandle) -> bool;

    /// Shown/hidden state only; occlusion by other windows does not count
    fn is_visible(&self, handle: WindowHandle) -> bool;

    /// Present but excluded from the compositor's output (cloaked)
    fn is_hidden_from_user(&self, handle: WindowHandle) -> bool;

    /// Parent or owner of the window, `None` when it has none
    fn parent(&self, handle: WindowHandle) -> Option<WindowHandle>;

    /// The desktop root window, if the platform exposes one as a handle
    fn desktop_root(&self) -> Option<WindowHandle>;

    fn title(&self, handle: WindowHandle) -> String;

    /// Copy a block of pixels out of `source`.
    ///
    /// Any device context needed for the copy is acquired and released
    /// within this call.
    fn grab(&self, source: CaptureSource, region: CaptureRegion) -> CaptureResult<RawImage>;

    /// Get the implementation name
    fn implementation_name(&self) -> String;
}

/// Helper trait for pixel format conversion
pub trait PixelFormatConverter {
    /// Convert BGRA to RGBA in place
    fn convert_bgra_to_rgba(&self, data: &mut [u8]);

    /// Set every alpha byte of a 4-channel buffer to 255
    fn force_opaque(&self, data: &mut [u8]);
}

/// Default implementation for pixel format conversion
pub struct DefaultPixelConverter;

impl PixelFormatConverter for DefaultPixelConverter {
    fn convert_bgra_to_rgba(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(4) {
            chunk.swap(0, 2); // Swap B and R
        }
    }

    fn force_opaque(&self, data: &mut [u8]) {
        // GDI and X11 leave the fourth byte undefined for 24-bit visuals
        for chunk in data.chunks_exact_mut(4) {
            chunk[3] = 0xFF;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgra_to_rgba() {
        let mut data = vec![1, 2, 3, 4, 10, 20, 30, 40];
        DefaultPixelConverter.convert_bgra_to_rgba(&mut data);
        assert_eq!(data, vec![3, 2, 1, 4, 30, 20, 10, 40]);
    }

    #[test]
    fn test_force_opaque_ignores_trailing_bytes() {
        let mut data = vec![1, 2, 3, 0, 9, 9];
        DefaultPixelConverter.force_opaque(&mut data);
        assert_eq!(data, vec![1, 2, 3, 255, 9, 9]);
    }
}
