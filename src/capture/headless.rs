//! In-memory window system.
//!
//! `HeadlessDesktop` answers every capability query from a scripted list of
//! displays and windows and produces deterministic pixels. It stands in for a
//! real desktop on CI machines, in tests and in benchmarks.

use parking_lot::Mutex;

use crate::capture::traits::{CaptureSource, WindowSystem};
use crate::error::{CaptureError, CaptureResult};
use crate::types::{CaptureRegion, DisplayInfo, RawImage, Rect, WindowHandle};

/// Handle reported as the desktop root
pub const HEADLESS_ROOT: WindowHandle = WindowHandle::from_raw(1);

/// A scripted top-level window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessWindow {
    pub handle: WindowHandle,
    pub title: String,
    pub bounds: Rect,
    pub composited: Option<Rect>,
    pub parent: Option<WindowHandle>,
    pub minimized: bool,
    pub visible: bool,
    pub cloaked: bool,
}

impl HeadlessWindow {
    /// A plain visible window whose composited bounds equal its bounds
    pub fn new(handle: u64, title: impl Into<String>, bounds: Rect) -> Self {
        Self {
            handle: WindowHandle::from_raw(handle),
            title: title.into(),
            bounds,
            composited: Some(bounds),
            parent: None,
            minimized: false,
            visible: true,
            cloaked: false,
        }
    }

    pub fn composited(mut self, rect: Option<Rect>) -> Self {
        self.composited = rect;
        self
    }

    pub fn owned_by(mut self, parent: WindowHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn minimized(mut self, minimized: bool) -> Self {
        self.minimized = minimized;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn cloaked(mut self, cloaked: bool) -> Self {
        self.cloaked = cloaked;
        self
    }
}

/// Scripted desktop
#[derive(Debug, Default)]
pub struct HeadlessDesktop {
    displays: Vec<DisplayInfo>,
    windows: Vec<HeadlessWindow>,
    fail_enumeration: bool,
    grabs: Mutex<Vec<(CaptureSource, CaptureRegion)>>,
}

impl HeadlessDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a display; enumeration follows insertion order
    pub fn with_display(mut self, name: impl Into<String>, rect: Rect, is_primary: bool) -> Self {
        self.displays.push(DisplayInfo {
            name: name.into(),
            rect,
            is_primary,
        });
        self
    }

    /// Add a window on top of the z-order list (enumerated last)
    pub fn with_window(mut self, window: HeadlessWindow) -> Self {
        self.windows.push(window);
        self
    }

    /// Make both enumerations fail, as if the windowing system were gone
    pub fn failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    /// Every grab performed so far, in order
    pub fn grabs(&self) -> Vec<(CaptureSource, CaptureRegion)> {
        self.grabs.lock().clone()
    }

    fn window(&self, handle: WindowHandle) -> Option<&HeadlessWindow> {
        self.windows.iter().find(|w| w.handle == handle)
    }

    /// Bounds of the addressable area of a source, in its own coordinates
    fn source_extent(&self, source: CaptureSource) -> Option<Rect> {
        match source {
            CaptureSource::Window(handle) => self
                .window(handle)
                .map(|w| Rect::from_size(w.bounds.width(), w.bounds.height())),
            CaptureSource::Desktop => {
                let mut extent: Option<Rect> = None;
                for display in &self.displays {
                    let r = display.rect;
                    extent = Some(match extent {
                        None => r,
                        Some(e) => Rect::new(
                            e.left.min(r.left),
                            e.top.min(r.top),
                            e.right.max(r.right),
                            e.bottom.max(r.bottom),
                        ),
                    });
                }
                extent
            }
        }
    }
}

impl WindowSystem for HeadlessDesktop {
    fn enumerate_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        if self.fail_enumeration {
            return Err(CaptureError::EnumerationFailed(
                "headless desktop unavailable".to_string(),
            ));
        }
        Ok(self.displays.clone())
    }

    fn enumerate_top_level_windows(&self) -> CaptureResult<Vec<WindowHandle>> {
        if self.fail_enumeration {
            return Err(CaptureError::EnumerationFailed(
                "headless desktop unavailable".to_string(),
            ));
        }
        Ok(self.windows.iter().map(|w| w.handle).collect())
    }

    fn window_bounds(&self, handle: WindowHandle) -> CaptureResult<Rect> {
        self.window(handle)
            .map(|w| w.bounds)
            .ok_or_else(|| CaptureError::WindowQueryFailed {
                handle,
                reason: "no such window".to_string(),
            })
    }

    fn composited_bounds(&self, handle: WindowHandle) -> Option<Rect> {
        self.window(handle).and_then(|w| w.composited)
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        self.window(handle).is_some_and(|w| w.minimized)
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        self.window(handle).is_some_and(|w| w.visible)
    }

    fn is_hidden_from_user(&self, handle: WindowHandle) -> bool {
        self.window(handle).is_some_and(|w| w.cloaked)
    }

    fn parent(&self, handle: WindowHandle) -> Option<WindowHandle> {
        self.window(handle).and_then(|w| w.parent)
    }

    fn desktop_root(&self) -> Option<WindowHandle> {
        Some(HEADLESS_ROOT)
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.window(handle).map(|w| w.title.clone()).unwrap_or_default()
    }

    fn grab(&self, source: CaptureSource, region: CaptureRegion) -> CaptureResult<RawImage> {
        let extent = self.source_extent(source).ok_or_else(|| {
            CaptureError::DeviceContextUnavailable(format!("no headless surface for {:?}", source))
        })?;

        let requested = Rect::new(
            region.x,
            region.y,
            region.x + region.width as i32,
            region.y + region.height as i32,
        );
        if requested.left < extent.left
            || requested.top < extent.top
            || requested.right > extent.right
            || requested.bottom > extent.bottom
        {
            return Err(CaptureError::CaptureFailed(format!(
                "region {} outside of source extent {}",
                requested, extent
            )));
        }

        self.grabs.lock().push((source, region));

        // Pixel value encodes its absolute source coordinate so callers can
        // check which block was copied.
        let mut data = Vec::with_capacity(region.pixel_count() * 4);
        for y in 0..region.height as i32 {
            for x in 0..region.width as i32 {
                let sx = (region.x + x) as u8;
                let sy = (region.y + y) as u8;
                data.extend_from_slice(&[sy, sx, 0x40, 0x00]);
            }
        }

        Ok(RawImage::new(data, region.width, region.height))
    }

    fn implementation_name(&self) -> String {
        "Headless".to_string()
    }
}
