//! Region resolution: turn a surface descriptor into the exact rectangle to
//! copy pixels from.
//!
//! A window's nominal bounds include whatever padding the desktop reserves
//! for drop shadows and resize borders. The compositor reports the visible
//! extent separately. Window pixels are addressed relative to the window's
//! nominal top-left corner, so the visible extent has to be shifted by the
//! inset between the two before it can be used.

use crate::capture::{CaptureSource, WindowSystem};
use crate::error::CaptureResult;
use crate::types::{CaptureRegion, Rect, SurfaceDescriptor};

/// A resolved capture: what to copy from and which rectangle of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTarget {
    pub source: CaptureSource,
    /// In the source's own coordinate space
    pub rect: Rect,
}

impl CaptureTarget {
    /// Region for the pixel transfer; fails when the rectangle has no area
    pub fn region(&self) -> CaptureResult<CaptureRegion> {
        CaptureRegion::try_from(self.rect)
    }
}

/// Visible part of a window, relative to the window's nominal origin.
///
/// `nominal` is the outer bounding box and `visible` the compositor-reported
/// extent, both in desktop coordinates. Without compositor data the whole
/// nominal box is used.
pub fn inset_rect(nominal: Rect, visible: Option<Rect>) -> Rect {
    match visible {
        Some(visible) => {
            let offset_left = visible.left - nominal.left;
            let offset_top = visible.top - nominal.top;
            Rect::new(
                offset_left,
                offset_top,
                visible.width() + offset_left,
                visible.height() + offset_top,
            )
        }
        None => Rect::from_size(nominal.width(), nominal.height()),
    }
}

/// Resolve the capture target of a descriptor against the live desktop.
///
/// Window geometry is queried now rather than at discovery time since
/// windows move. Displays and synthetic regions are already in desktop
/// coordinates and are used as stored.
pub fn resolve(
    system: &dyn WindowSystem,
    descriptor: &SurfaceDescriptor,
) -> CaptureResult<CaptureTarget> {
    let target = match descriptor.handle() {
        Some(handle) => {
            let nominal = system.window_bounds(handle)?;
            let visible = system.composited_bounds(handle);
            if visible.is_none() {
                log::debug!("No composited bounds for {}, using nominal bounds", handle);
            }
            CaptureTarget {
                source: CaptureSource::Window(handle),
                rect: inset_rect(nominal, visible),
            }
        }
        None => CaptureTarget {
            source: CaptureSource::Desktop,
            rect: descriptor.nominal_rect(),
        },
    };

    log::debug!("Resolved '{}' to {}", descriptor.label(), target.rect);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::headless::{HeadlessDesktop, HeadlessWindow};
    use crate::types::WindowHandle;

    #[test]
    fn test_equal_bounds_resolve_to_origin() {
        let nominal = Rect::new(40, 70, 840, 670);
        assert_eq!(inset_rect(nominal, Some(nominal)), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn test_missing_composited_bounds_falls_back() {
        let nominal = Rect::new(40, 70, 840, 670);
        assert_eq!(inset_rect(nominal, None), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn test_positive_insets() {
        let resolved = inset_rect(Rect::new(100, 100, 300, 300), Some(Rect::new(105, 110, 295, 295)));
        // 190x185 visible area shifted by (5, 10)
        assert_eq!(resolved, Rect::new(5, 10, 195, 195));
    }

    #[test]
    fn test_resolve_display_uses_nominal_rect() {
        let desktop = HeadlessDesktop::new();
        let descriptor = SurfaceDescriptor::region("DISP2", Rect::new(1920, 0, 3840, 1080));

        let target = resolve(&desktop, &descriptor).unwrap();
        assert_eq!(target.source, CaptureSource::Desktop);
        assert_eq!(target.rect, Rect::new(1920, 0, 3840, 1080));
    }

    #[test]
    fn test_resolve_window_queries_live_geometry() {
        let desktop = HeadlessDesktop::new().with_window(
            HeadlessWindow::new(3, "Notepad", Rect::new(50, 50, 450, 350))
                .composited(Some(Rect::new(55, 60, 445, 340))),
        );
        let descriptor = SurfaceDescriptor::window(WindowHandle::from_raw(3), "Notepad");

        let target = resolve(&desktop, &descriptor).unwrap();
        assert_eq!(target.source, CaptureSource::Window(WindowHandle::from_raw(3)));
        assert_eq!(target.rect, Rect::new(5, 10, 395, 290));
        assert_eq!(target.region().unwrap(), CaptureRegion::new(5, 10, 390, 280));
    }

    #[test]
    fn test_vanished_window_is_an_error() {
        let desktop = HeadlessDesktop::new();
        let descriptor = SurfaceDescriptor::window(WindowHandle::from_raw(3), "Gone");
        assert!(resolve(&desktop, &descriptor).is_err());
    }

    #[test]
    fn test_empty_target_has_no_region() {
        let target = CaptureTarget {
            source: CaptureSource::Desktop,
            rect: Rect::new(0, 0, 0, 0),
        };
        assert!(target.region().is_err());
    }
}
