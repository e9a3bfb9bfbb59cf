//! Windowing-system backends with platform-specific implementations

pub mod headless;
pub mod traits;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

pub use headless::{HeadlessDesktop, HeadlessWindow};
pub use traits::{CaptureSource, DefaultPixelConverter, PixelFormatConverter, WindowSystem};

use crate::error::CaptureResult;

/// Platform-specific window system factory
pub struct Platform;

impl Platform {
    /// Connect to the windowing system of the current platform.
    ///
    /// The returned backend holds whatever process-wide state the platform
    /// needs (the X11 connection, for instance) and releases it on drop.
    pub fn new() -> CaptureResult<Box<dyn WindowSystem>> {
        #[cfg(target_os = "windows")]
        {
            windows::Win32WindowSystem::new()
        }

        #[cfg(target_os = "linux")]
        {
            linux::X11WindowSystem::new()
        }

        #[cfg(not(any(target_os = "windows", target_os = "linux")))]
        {
            Err(crate::error::CaptureError::PlatformError(
                "Unsupported platform".to_string(),
            ))
        }
    }
}
