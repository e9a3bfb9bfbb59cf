//! Error types for the surface-capture library

use crate::types::WindowHandle;
use thiserror::Error;

/// Main error type for discovery and capture operations
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The windowing system refused to enumerate displays or windows
    #[error("Failed to enumerate surfaces: {0}")]
    EnumerationFailed(String),

    /// A query against a single window failed (usually because it vanished)
    #[error("Window query failed for {handle}: {reason}")]
    WindowQueryFailed { handle: WindowHandle, reason: String },

    /// The resolved capture rectangle has no area
    #[error("Invalid capture region: {width}x{height}")]
    InvalidRegion { width: i32, height: i32 },

    /// No device context (or equivalent drawable) could be acquired
    #[error("Device context unavailable: {0}")]
    DeviceContextUnavailable(String),

    /// Pixel transfer failed
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Platform-specific error
    #[error("Platform error: {0}")]
    PlatformError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Errors from backends implemented outside this crate
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Error type for image file encoding
#[derive(Error, Debug)]
pub enum EncodingError {
    /// Invalid image dimensions
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer shorter than width * height requires
    #[error("Pixel buffer too small: need {required} bytes, got {provided}")]
    BufferTooSmall { required: usize, provided: usize },

    /// The image crate rejected the buffer or the destination
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// Errors from encoders implemented outside this crate
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Combined result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Combined result type for encoding operations
pub type EncodingResult<T> = Result<T, EncodingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_display() {
        let err = CaptureError::InvalidRegion { width: 0, height: 40 };
        assert_eq!(err.to_string(), "Invalid capture region: 0x40");

        let err = CaptureError::WindowQueryFailed {
            handle: WindowHandle::from_raw(0x2a),
            reason: "gone".to_string(),
        };
        assert_eq!(err.to_string(), "Window query failed for 0x2a: gone");
    }

    #[test]
    fn test_encoding_error_display() {
        let err = EncodingError::BufferTooSmall { required: 16, provided: 4 };
        assert_eq!(err.to_string(), "Pixel buffer too small: need 16 bytes, got 4");
    }

    #[test]
    fn test_foreign_errors_pass_through() {
        fn query() -> CaptureResult<()> {
            let reply: anyhow::Result<()> = Err(anyhow::anyhow!("compositor went away"));
            reply?;
            Ok(())
        }

        let err = query().unwrap_err();
        assert!(matches!(err, CaptureError::Other(_)));
        assert_eq!(err.to_string(), "compositor went away");
    }
}
