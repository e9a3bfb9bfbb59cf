//! Surface discovery: enumerate displays and top-level windows and filter
//! out the ones that cannot be captured.
//!
//! A discovery pass yields, in this order:
//!
//! 1. one descriptor per display, in enumeration order,
//! 2. the `"FullScreen"` virtual desktop aggregate, if any display exists,
//! 3. one descriptor per accepted top-level window, in enumeration order.
//!
//! Consumers number surfaces by this order, so it must stay stable.

use std::fmt;
use std::vec;

use crate::capture::WindowSystem;
use crate::error::CaptureResult;
use crate::types::{DiscoveryOptions, DisplayInfo, Rect, SurfaceDescriptor, WindowHandle};

/// Label of the synthetic descriptor spanning all displays
pub const VIRTUAL_DESKTOP_LABEL: &str = "FullScreen";

/// Suffix appended to the primary display's device name
pub const PRIMARY_SUFFIX: &str = "(Primary)";

/// Why a top-level window was left out.
///
/// Variants are listed in the order the checks run; the first failing check
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Has a parent or owner other than the desktop root
    OwnedWindow,
    EmptyTitle,
    /// Minimized windows report bogus geometry
    Minimized,
    NotVisible,
    /// Cloaked by the compositor
    HiddenFromUser,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::OwnedWindow => "not a top-level window",
            RejectReason::EmptyTitle => "empty title",
            RejectReason::Minimized => "minimized",
            RejectReason::NotVisible => "not visible",
            RejectReason::HiddenFromUser => "hidden from user",
        };
        f.write_str(text)
    }
}

/// Run the window filter policy against one handle.
///
/// Returns the window title when the window is accepted.
pub fn evaluate_window(
    system: &dyn WindowSystem,
    handle: WindowHandle,
) -> Result<String, RejectReason> {
    if let Some(parent) = system.parent(handle) {
        if Some(parent) != system.desktop_root() {
            return Err(RejectReason::OwnedWindow);
        }
    }

    let title = system.title(handle);
    if title.is_empty() {
        return Err(RejectReason::EmptyTitle);
    }

    if system.is_minimized(handle) {
        return Err(RejectReason::Minimized);
    }

    if !system.is_visible(handle) {
        return Err(RejectReason::NotVisible);
    }

    if system.is_hidden_from_user(handle) {
        return Err(RejectReason::HiddenFromUser);
    }

    Ok(title)
}

/// Label of a display descriptor
pub fn display_label(display: &DisplayInfo) -> String {
    if display.is_primary {
        format!("{}{}", display.name, PRIMARY_SUFFIX)
    } else {
        display.name.clone()
    }
}

/// One descriptor per display, in the order given
pub fn display_descriptors(displays: &[DisplayInfo]) -> Vec<SurfaceDescriptor> {
    displays
        .iter()
        .map(|display| SurfaceDescriptor::region(display_label(display), display.rect))
        .collect()
}

/// The synthetic descriptor spanning all displays.
///
/// Its size is the sum of the display widths by the tallest display height,
/// anchored at the origin. That matches side-by-side layouts aligned at the
/// top; vertical offsets, stacking or overlap are not reconstructed.
pub fn virtual_desktop_aggregate(displays: &[SurfaceDescriptor]) -> Option<SurfaceDescriptor> {
    if displays.is_empty() {
        return None;
    }

    let (width, height) = displays.iter().fold((0i32, 0i32), |(width, height), display| {
        let rect = display.nominal_rect();
        (width.saturating_add(rect.width()), height.max(rect.height()))
    });

    Some(SurfaceDescriptor::region(
        VIRTUAL_DESKTOP_LABEL,
        Rect::from_size(width, height),
    ))
}

/// Start a discovery pass with default options.
///
/// Both platform enumerations run before this returns; if either fails the
/// whole pass fails and nothing is yielded. Window filtering happens lazily
/// as the returned iterator advances.
pub fn discover(system: &dyn WindowSystem) -> CaptureResult<Surfaces<'_>> {
    discover_with(system, DiscoveryOptions::default())
}

/// Start a discovery pass restricted to the groups enabled in `options`
pub fn discover_with(
    system: &dyn WindowSystem,
    options: DiscoveryOptions,
) -> CaptureResult<Surfaces<'_>> {
    let displays = if options.include_displays {
        display_descriptors(&system.enumerate_displays()?)
    } else {
        Vec::new()
    };

    let windows = if options.include_windows {
        system.enumerate_top_level_windows()?
    } else {
        Vec::new()
    };

    log::debug!(
        "Discovery on {}: {} display(s), {} top-level window candidate(s)",
        system.implementation_name(),
        displays.len(),
        windows.len()
    );

    // Only built from emitted display descriptors: no displays, no aggregate
    let aggregate = if options.include_virtual_desktop {
        virtual_desktop_aggregate(&displays)
    } else {
        None
    };

    Ok(Surfaces {
        system,
        displays: displays.into_iter(),
        aggregate,
        windows: windows.into_iter(),
    })
}

/// Run a full discovery pass and collect the descriptors
pub fn discover_all(system: &dyn WindowSystem) -> CaptureResult<Vec<SurfaceDescriptor>> {
    Ok(discover(system)?.collect())
}

/// One-shot iterator over the surfaces of a discovery pass.
///
/// Obtain a fresh one from [`discover`] to enumerate again.
pub struct Surfaces<'a> {
    system: &'a dyn WindowSystem,
    displays: vec::IntoIter<SurfaceDescriptor>,
    aggregate: Option<SurfaceDescriptor>,
    windows: vec::IntoIter<WindowHandle>,
}

impl Iterator for Surfaces<'_> {
    type Item = SurfaceDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(display) = self.displays.next() {
            return Some(display);
        }

        if let Some(aggregate) = self.aggregate.take() {
            return Some(aggregate);
        }

        for handle in self.windows.by_ref() {
            match evaluate_window(self.system, handle) {
                Ok(title) => return Some(SurfaceDescriptor::window(handle, title)),
                Err(reason) => log::trace!("Skipping window {}: {}", handle, reason),
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let fixed = self.displays.len() + usize::from(self.aggregate.is_some());
        (fixed, Some(fixed + self.windows.len()))
    }
}
