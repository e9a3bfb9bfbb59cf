//! Core types shared by discovery, region resolution and capture

use std::fmt;
use std::path::PathBuf;

use crate::error::{CaptureError, CaptureResult};

/// Opaque reference to a top-level window.
///
/// The library never owns the window behind a handle; it is only an id the
/// windowing system hands out (an `HWND` on Windows, a window XID on X11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Rectangle given by its edges, in the coordinate space of whoever reported it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// True when the rectangle covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Pixel region handed to the pixel transfer: origin plus a non-zero size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl TryFrom<Rect> for CaptureRegion {
    type Error = CaptureError;

    fn try_from(rect: Rect) -> CaptureResult<Self> {
        if rect.is_empty() {
            return Err(CaptureError::InvalidRegion {
                width: rect.width(),
                height: rect.height(),
            });
        }
        Ok(Self {
            x: rect.left,
            y: rect.top,
            width: rect.width() as u32,
            height: rect.height() as u32,
        })
    }
}

/// Information about a display/monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Device name as reported by the windowing system
    pub name: String,
    /// Bounds in desktop coordinates
    pub rect: Rect,
    /// Whether this is the primary display
    pub is_primary: bool,
}

/// A display, a window, or a synthetic region, described uniformly as
/// something that can be captured.
///
/// Descriptors are produced fresh by every discovery pass and never mutated.
/// When `handle` is present the geometry is resolved from the live window at
/// capture time and `nominal_rect` is unused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceDescriptor {
    handle: Option<WindowHandle>,
    label: String,
    nominal_rect: Rect,
}

impl SurfaceDescriptor {
    /// Descriptor for a top-level window
    pub fn window(handle: WindowHandle, label: impl Into<String>) -> Self {
        Self {
            handle: Some(handle),
            label: label.into(),
            nominal_rect: Rect::default(),
        }
    }

    /// Descriptor for a display or synthetic region in desktop coordinates
    pub fn region(label: impl Into<String>, rect: Rect) -> Self {
        Self {
            handle: None,
            label: label.into(),
            nominal_rect: rect,
        }
    }

    pub fn handle(&self) -> Option<WindowHandle> {
        self.handle
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn nominal_rect(&self) -> Rect {
        self.nominal_rect
    }

    pub fn is_window(&self) -> bool {
        self.handle.is_some()
    }
}

impl fmt::Display for SurfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle {
            Some(handle) => write!(f, "{} [window {}]", self.label, handle),
            None => write!(f, "{} {}", self.label, self.nominal_rect),
        }
    }
}

/// Bytes per pixel of every captured image (BGRA, 8 bits per channel)
pub const BYTES_PER_PIXEL: usize = 4;

/// Raw image data container.
///
/// Pixels are always BGRA, the layout both GDI and X11 Z-pixmaps deliver.
/// The alpha byte is undefined and must not be relied upon.
#[derive(Debug, Clone)]
pub struct RawImage {
    /// Pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Stride (bytes per row, may include padding)
    pub stride: usize,
}

impl RawImage {
    /// Create a new RawImage with tightly packed rows
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        let stride = (width as usize) * BYTES_PER_PIXEL;
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    /// Create a new RawImage with custom stride
    pub fn with_stride(data: Vec<u8>, width: u32, height: u32, stride: usize) -> Self {
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    /// Get the total size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Which surfaces a discovery pass produces.
///
/// Disabled groups are left out; the relative order of the remaining groups
/// (displays, aggregate, windows) never changes. The aggregate is derived
/// from the emitted display descriptors, so it is only produced when
/// `include_displays` is set as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub include_displays: bool,
    pub include_virtual_desktop: bool,
    pub include_windows: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            include_displays: true,
            include_virtual_desktop: true,
            include_windows: true,
        }
    }
}

impl DiscoveryOptions {
    pub fn displays_only() -> Self {
        Self {
            include_windows: false,
            ..Default::default()
        }
    }

    pub fn windows_only() -> Self {
        Self {
            include_displays: false,
            include_virtual_desktop: false,
            include_windows: true,
        }
    }
}

/// Image file format written by the batch capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Bmp,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
        }
    }
}

/// Batch capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Directory the image files are written to; must already exist
    pub output_dir: PathBuf,
    /// Index given to the first surface (output name `<index>.<ext>`)
    pub first_index: usize,
    /// Which surfaces to discover
    pub discovery: DiscoveryOptions,
    /// Output file format
    pub image_format: OutputFormat,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            first_index: 1,
            discovery: DiscoveryOptions::default(),
            image_format: OutputFormat::Png,
        }
    }
}

impl CaptureConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_image_format(mut self, format: OutputFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> CaptureResult<()> {
        if self.first_index == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "first_index must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let rect = Rect::new(50, 50, 450, 350);
        assert_eq!(rect.width(), 400);
        assert_eq!(rect.height(), 300);
        assert!(!rect.is_empty());
        assert!(Rect::new(10, 10, 10, 40).is_empty());
        assert!(Rect::new(10, 10, 5, 40).is_empty());
    }

    #[test]
    fn test_capture_region_from_rect() {
        let region = CaptureRegion::try_from(Rect::new(5, 10, 195, 195)).unwrap();
        assert_eq!(region, CaptureRegion::new(5, 10, 190, 185));

        let err = CaptureRegion::try_from(Rect::new(0, 0, 0, 20)).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidRegion { width: 0, height: 20 }));
    }

    #[test]
    fn test_descriptor_kinds() {
        let window = SurfaceDescriptor::window(WindowHandle::from_raw(7), "Notepad");
        assert!(window.is_window());
        assert_eq!(window.nominal_rect(), Rect::default());

        let display = SurfaceDescriptor::region("DISP1", Rect::new(0, 0, 1920, 1080));
        assert!(!display.is_window());
        assert_eq!(display.to_string(), "DISP1 (0, 0, 1920, 1080)");
    }

    #[test]
    fn test_config_validation() {
        let mut config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.image_format.extension(), "png");

        config.first_index = 0;
        assert!(config.validate().is_err());
    }
}
