//! X11 window system for Linux.
//!
//! Top-level windows come from the EWMH client list maintained by the window
//! manager. The rough equivalents of the Windows notions used by discovery:
//!
//! - owner: `WM_TRANSIENT_FOR`
//! - minimized: `WM_STATE` iconic, or `_NET_WM_STATE_HIDDEN`
//! - hidden from user: mapped on a virtual desktop other than the current one
//! - composited bounds: window geometry minus `_GTK_FRAME_EXTENTS`, the
//!   shadow area of client-side decorated windows

use crate::{
    capture::traits::{CaptureSource, WindowSystem},
    error::{CaptureError, CaptureResult},
    types::{CaptureRegion, DisplayInfo, RawImage, Rect, WindowHandle},
};

use x11rb::{
    connection::Connection,
    protocol::{
        randr,
        xproto::{self, AtomEnum, ConnectionExt as _, ImageFormat, MapState, Window},
    },
    rust_connection::RustConnection,
};

x11rb::atom_manager! {
    Atoms: AtomsCookie {
        _NET_CLIENT_LIST_STACKING,
        _NET_CLIENT_LIST,
        _NET_CURRENT_DESKTOP,
        _NET_WM_DESKTOP,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_WM_STATE_HIDDEN,
        _GTK_FRAME_EXTENTS,
        WM_STATE,
        UTF8_STRING,
    }
}

/// `_NET_WM_DESKTOP` value of windows shown on all desktops
const ALL_DESKTOPS: u32 = 0xFFFF_FFFF;

/// ICCCM `WM_STATE` value of iconified windows
const ICONIC_STATE: u32 = 3;

/// X11 window system
pub struct X11WindowSystem {
    connection: RustConnection,
    screen_num: usize,
    root_window: Window,
    atoms: Atoms,
}

impl X11WindowSystem {
    /// Connect to the X server named by `$DISPLAY`
    pub fn new() -> CaptureResult<Box<dyn WindowSystem>> {
        if std::env::var_os("DISPLAY").is_none() {
            return Err(CaptureError::PlatformError(
                "No X11 display found (DISPLAY is not set)".to_string(),
            ));
        }

        let (connection, screen_num) = x11rb::connect(None).map_err(|e| {
            CaptureError::PlatformError(format!("Failed to connect to X11: {}", e))
        })?;

        let root_window = connection.setup().roots[screen_num].root;

        let atoms = Atoms::new(&connection)
            .map_err(|e| CaptureError::PlatformError(format!("Failed to intern atoms: {}", e)))?
            .reply()
            .map_err(|e| CaptureError::PlatformError(format!("Failed to intern atoms: {}", e)))?;

        Ok(Box::new(Self {
            connection,
            screen_num,
            root_window,
            atoms,
        }))
    }

    fn property32(&self, window: Window, property: u32, type_: impl Into<u32>) -> Option<Vec<u32>> {
        let reply = self
            .connection
            .get_property(false, window, property, type_, 0, u32::MAX)
            .ok()?
            .reply()
            .ok()?;
        reply.value32().map(|values| values.collect())
    }

    fn property_text(&self, window: Window, property: u32, type_: impl Into<u32>) -> String {
        self.connection
            .get_property(false, window, property, type_, 0, u32::MAX)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| String::from_utf8_lossy(&reply.value).into_owned())
            .unwrap_or_default()
    }

    fn client_list(&self) -> CaptureResult<Vec<Window>> {
        for property in [
            self.atoms._NET_CLIENT_LIST_STACKING,
            self.atoms._NET_CLIENT_LIST,
        ] {
            if let Some(windows) = self.property32(self.root_window, property, AtomEnum::WINDOW) {
                if !windows.is_empty() {
                    return Ok(windows);
                }
            }
        }

        // No EWMH window manager: the root's children are the top-level windows
        let tree = self
            .connection
            .query_tree(self.root_window)
            .map_err(|e| CaptureError::EnumerationFailed(format!("QueryTree error: {}", e)))?
            .reply()
            .map_err(|e| CaptureError::EnumerationFailed(format!("QueryTree reply error: {}", e)))?;
        Ok(tree.children)
    }

    fn root_screen_display(&self) -> DisplayInfo {
        let screen = &self.connection.setup().roots[self.screen_num];
        DisplayInfo {
            name: format!("screen{}", self.screen_num),
            rect: Rect::from_size(
                i32::from(screen.width_in_pixels),
                i32::from(screen.height_in_pixels),
            ),
            is_primary: true,
        }
    }

    fn query_failed(handle: WindowHandle, reason: impl std::fmt::Display) -> CaptureError {
        CaptureError::WindowQueryFailed {
            handle,
            reason: reason.to_string(),
        }
    }
}

fn to_window(handle: WindowHandle) -> Window {
    handle.as_raw() as Window
}

fn from_window(window: Window) -> WindowHandle {
    WindowHandle::from_raw(u64::from(window))
}

impl WindowSystem for X11WindowSystem {
    fn enumerate_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        let resources = randr::get_screen_resources_current(&self.connection, self.root_window)
            .map_err(|e| CaptureError::EnumerationFailed(format!("XRandR error: {}", e)))?
            .reply()
            .map_err(|e| CaptureError::EnumerationFailed(format!("XRandR reply error: {}", e)))?;

        let primary = randr::get_output_primary(&self.connection, self.root_window)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.output)
            .unwrap_or(0);

        let mut displays = Vec::new();
        for &crtc in &resources.crtcs {
            let crtc_info = randr::get_crtc_info(&self.connection, crtc, resources.config_timestamp)
                .map_err(|e| CaptureError::EnumerationFailed(format!("CRTC info error: {}", e)))?
                .reply()
                .map_err(|e| CaptureError::EnumerationFailed(format!("CRTC reply error: {}", e)))?;

            // Skip disabled CRTCs
            if crtc_info.mode == 0 || crtc_info.outputs.is_empty() {
                continue;
            }

            let output = crtc_info.outputs[0];
            let name = randr::get_output_info(&self.connection, output, resources.config_timestamp)
                .ok()
                .and_then(|cookie| cookie.reply().ok())
                .map(|info| String::from_utf8_lossy(&info.name).into_owned())
                .unwrap_or_else(|| format!("CRTC-{}", crtc));

            let left = i32::from(crtc_info.x);
            let top = i32::from(crtc_info.y);
            displays.push(DisplayInfo {
                name,
                rect: Rect::new(
                    left,
                    top,
                    left + i32::from(crtc_info.width),
                    top + i32::from(crtc_info.height),
                ),
                is_primary: primary != 0 && crtc_info.outputs.contains(&primary),
            });
        }

        if displays.is_empty() {
            // Fallback to the root window when XRandR reports nothing active
            displays.push(self.root_screen_display());
        }

        Ok(displays)
    }

    fn enumerate_top_level_windows(&self) -> CaptureResult<Vec<WindowHandle>> {
        Ok(self.client_list()?.into_iter().map(from_window).collect())
    }

    fn window_bounds(&self, handle: WindowHandle) -> CaptureResult<Rect> {
        let window = to_window(handle);

        let geometry = self
            .connection
            .get_geometry(window)
            .map_err(|e| Self::query_failed(handle, e))?
            .reply()
            .map_err(|e| Self::query_failed(handle, e))?;

        let origin = self
            .connection
            .translate_coordinates(window, self.root_window, 0, 0)
            .map_err(|e| Self::query_failed(handle, e))?
            .reply()
            .map_err(|e| Self::query_failed(handle, e))?;

        let left = i32::from(origin.dst_x);
        let top = i32::from(origin.dst_y);
        Ok(Rect::new(
            left,
            top,
            left + i32::from(geometry.width),
            top + i32::from(geometry.height),
        ))
    }

    fn composited_bounds(&self, handle: WindowHandle) -> Option<Rect> {
        let extents = self.property32(
            to_window(handle),
            self.atoms._GTK_FRAME_EXTENTS,
            AtomEnum::CARDINAL,
        )?;
        let [left, right, top, bottom] = <[u32; 4]>::try_from(extents).ok()?;

        let bounds = self.window_bounds(handle).ok()?;
        let visible = Rect::new(
            bounds.left + left as i32,
            bounds.top + top as i32,
            bounds.right - right as i32,
            bounds.bottom - bottom as i32,
        );
        (!visible.is_empty()).then_some(visible)
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        let window = to_window(handle);

        let iconic = self
            .property32(window, self.atoms.WM_STATE, self.atoms.WM_STATE)
            .and_then(|state| state.first().copied())
            == Some(ICONIC_STATE);

        iconic
            || self
                .property32(window, self.atoms._NET_WM_STATE, AtomEnum::ATOM)
                .is_some_and(|states| states.contains(&self.atoms._NET_WM_STATE_HIDDEN))
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        self.connection
            .get_window_attributes(to_window(handle))
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .is_some_and(|attributes| attributes.map_state == MapState::VIEWABLE)
    }

    fn is_hidden_from_user(&self, handle: WindowHandle) -> bool {
        let desktop = self
            .property32(to_window(handle), self.atoms._NET_WM_DESKTOP, AtomEnum::CARDINAL)
            .and_then(|values| values.first().copied());
        let current = self
            .property32(self.root_window, self.atoms._NET_CURRENT_DESKTOP, AtomEnum::CARDINAL)
            .and_then(|values| values.first().copied());

        match (desktop, current) {
            (Some(desktop), Some(current)) => desktop != ALL_DESKTOPS && desktop != current,
            _ => false,
        }
    }

    fn parent(&self, handle: WindowHandle) -> Option<WindowHandle> {
        // Managed clients are reparented into WM frames, so the tree parent
        // says nothing; ownership is expressed through WM_TRANSIENT_FOR.
        self.property32(
            to_window(handle),
            AtomEnum::WM_TRANSIENT_FOR.into(),
            AtomEnum::WINDOW,
        )
        .and_then(|owners| owners.first().copied())
        .filter(|&owner| owner != x11rb::NONE)
        .map(from_window)
    }

    fn desktop_root(&self) -> Option<WindowHandle> {
        Some(from_window(self.root_window))
    }

    fn title(&self, handle: WindowHandle) -> String {
        let window = to_window(handle);
        let title = self.property_text(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING);
        if !title.is_empty() {
            return title;
        }
        self.property_text(window, AtomEnum::WM_NAME.into(), AtomEnum::ANY)
    }

    fn grab(&self, source: CaptureSource, region: CaptureRegion) -> CaptureResult<RawImage> {
        let drawable = match source {
            CaptureSource::Window(handle) => to_window(handle),
            CaptureSource::Desktop => self.root_window,
        };

        let out_of_range =
            || CaptureError::CaptureFailed(format!("Region {:?} exceeds X11 limits", region));
        let x = i16::try_from(region.x).map_err(|_| out_of_range())?;
        let y = i16::try_from(region.y).map_err(|_| out_of_range())?;
        let width = u16::try_from(region.width).map_err(|_| out_of_range())?;
        let height = u16::try_from(region.height).map_err(|_| out_of_range())?;

        let image_reply = xproto::get_image(
            &self.connection,
            ImageFormat::Z_PIXMAP,
            drawable,
            x,
            y,
            width,
            height,
            !0, // All planes
        )
        .map_err(|e| CaptureError::DeviceContextUnavailable(format!("X11 GetImage error: {}", e)))?
        .reply()
        .map_err(|e| CaptureError::CaptureFailed(format!("X11 GetImage reply error: {}", e)))?;

        if !matches!(image_reply.depth, 24 | 32) {
            return Err(CaptureError::CaptureFailed(format!(
                "Unsupported bit depth: {}",
                image_reply.depth
            )));
        }

        // 24 and 32 bit visuals are transferred as 32 bits per pixel, BGRX
        let expected = region.pixel_count() * 4;
        if image_reply.data.len() < expected {
            return Err(CaptureError::CaptureFailed(format!(
                "Short X11 image: expected {} bytes, got {}",
                expected,
                image_reply.data.len()
            )));
        }

        Ok(RawImage::new(image_reply.data, region.width, region.height))
    }

    fn implementation_name(&self) -> String {
        "Linux X11".to_string()
    }
}
