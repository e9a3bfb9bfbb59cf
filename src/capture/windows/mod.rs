//! Windows implementation on top of User32, DWM and GDI

mod gdi;

use std::ffi::c_void;

use crate::{
    capture::traits::{CaptureSource, WindowSystem},
    error::{CaptureError, CaptureResult},
    types::{CaptureRegion, DisplayInfo, RawImage, Rect, WindowHandle},
};

use ::windows::Win32::{
    Foundation::*,
    Graphics::{Dwm::*, Gdi::*},
    UI::WindowsAndMessaging::*,
};

/// Win32 window system
pub struct Win32WindowSystem {
    gdi: gdi::GdiCapture,
}

pub(crate) fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.as_raw() as usize as *mut c_void)
}

fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle::from_raw(hwnd.0 as usize as u64)
}

fn from_win_rect(rect: RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}

fn utf16_until_nul(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}

impl Win32WindowSystem {
    /// Create a new Win32 window system
    pub fn new() -> CaptureResult<Box<dyn WindowSystem>> {
        Ok(Box::new(Self {
            gdi: gdi::GdiCapture::new(),
        }))
    }

    fn dwm_rect(hwnd: HWND, attribute: DWMWINDOWATTRIBUTE) -> Option<RECT> {
        let mut rect = RECT::default();
        unsafe {
            DwmGetWindowAttribute(
                hwnd,
                attribute,
                &mut rect as *mut RECT as *mut c_void,
                std::mem::size_of::<RECT>() as u32,
            )
        }
        .ok()
        .map(|_| rect)
    }
}

impl WindowSystem for Win32WindowSystem {
    fn enumerate_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        unsafe extern "system" fn monitor_enum_proc(
            hmonitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            lparam: LPARAM,
        ) -> BOOL {
            let displays = &mut *(lparam.0 as *mut Vec<DisplayInfo>);

            let mut info = MONITORINFOEXW {
                monitorInfo: MONITORINFO {
                    cbSize: std::mem::size_of::<MONITORINFOEXW>() as u32,
                    ..Default::default()
                },
                ..Default::default()
            };

            if GetMonitorInfoW(hmonitor, &mut info.monitorInfo as *mut _ as *mut MONITORINFO)
                .as_bool()
            {
                displays.push(DisplayInfo {
                    name: utf16_until_nul(&info.szDevice),
                    rect: from_win_rect(info.monitorInfo.rcMonitor),
                    is_primary: (info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY) != 0,
                });
            }

            TRUE
        }

        let mut displays: Vec<DisplayInfo> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(monitor_enum_proc),
                LPARAM(&mut displays as *mut Vec<DisplayInfo> as isize),
            )
        };

        if !ok.as_bool() {
            return Err(CaptureError::EnumerationFailed(
                "EnumDisplayMonitors failed".to_string(),
            ));
        }

        Ok(displays)
    }

    fn enumerate_top_level_windows(&self) -> CaptureResult<Vec<WindowHandle>> {
        // Only collects handles; all filtering happens after EnumWindows returns
        unsafe extern "system" fn enum_windows_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let handles = &mut *(lparam.0 as *mut Vec<WindowHandle>);
            handles.push(from_hwnd(hwnd));
            TRUE
        }

        let mut handles: Vec<WindowHandle> = Vec::new();
        unsafe {
            EnumWindows(
                Some(enum_windows_proc),
                LPARAM(&mut handles as *mut Vec<WindowHandle> as isize),
            )
        }
        .map_err(|e| CaptureError::EnumerationFailed(format!("EnumWindows failed: {}", e)))?;

        Ok(handles)
    }

    fn window_bounds(&self, handle: WindowHandle) -> CaptureResult<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(to_hwnd(handle), &mut rect) }.map_err(|e| {
            CaptureError::WindowQueryFailed {
                handle,
                reason: format!("GetWindowRect: {}", e),
            }
        })?;
        Ok(from_win_rect(rect))
    }

    fn composited_bounds(&self, handle: WindowHandle) -> Option<Rect> {
        Self::dwm_rect(to_hwnd(handle), DWMWA_EXTENDED_FRAME_BOUNDS).map(from_win_rect)
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        unsafe { IsIconic(to_hwnd(handle)) }.as_bool()
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        unsafe { IsWindowVisible(to_hwnd(handle)) }.as_bool()
    }

    fn is_hidden_from_user(&self, handle: WindowHandle) -> bool {
        let mut cloaked: u32 = 0;
        let result = unsafe {
            DwmGetWindowAttribute(
                to_hwnd(handle),
                DWMWA_CLOAKED,
                &mut cloaked as *mut u32 as *mut c_void,
                std::mem::size_of::<u32>() as u32,
            )
        };
        result.is_ok() && cloaked != 0
    }

    fn parent(&self, handle: WindowHandle) -> Option<WindowHandle> {
        // GetParent may return the owner; GA_PARENT is the real parent
        let parent = unsafe { GetAncestor(to_hwnd(handle), GA_PARENT) };
        if parent.is_invalid() {
            None
        } else {
            Some(from_hwnd(parent))
        }
    }

    fn desktop_root(&self) -> Option<WindowHandle> {
        Some(from_hwnd(unsafe { GetDesktopWindow() }))
    }

    fn title(&self, handle: WindowHandle) -> String {
        let hwnd = to_hwnd(handle);
        let len = unsafe { GetWindowTextLengthW(hwnd) };
        if len <= 0 {
            return String::new();
        }

        let mut buffer = vec![0u16; len as usize + 1];
        let copied = unsafe { GetWindowTextW(hwnd, &mut buffer) };
        utf16_until_nul(&buffer[..copied.max(0) as usize])
    }

    fn grab(&self, source: CaptureSource, region: CaptureRegion) -> CaptureResult<RawImage> {
        self.gdi.capture(source, region)
    }

    fn implementation_name(&self) -> String {
        "Windows GDI".to_string()
    }
}
