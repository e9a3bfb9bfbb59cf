//! Surface Capture Library
//!
//! Discovers every capturable surface on the desktop (displays, a synthetic
//! virtual desktop spanning them, and visible top-level windows), resolves
//! the exact pixel rectangle of each one and saves a snapshot per surface.
//!
//! # Example
//!
//! ```no_run
//! use surface_capture_rust::{CaptureConfig, SurfaceCapture};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let capture = SurfaceCapture::new()?;
//! for (index, surface) in capture.discover()?.iter().enumerate() {
//!     println!("{:2}. {}", index + 1, surface.label());
//! }
//!
//! // Write 1.png, 2.png, ... into an existing directory
//! let capture = capture.with_config(CaptureConfig::default().with_output_dir("shots"));
//! let report = capture.capture_all()?;
//! println!("{} of {} surfaces saved", report.saved(), report.len());
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod capture;
pub mod discovery;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod types;

// Re-export main types
pub use capture::{CaptureSource, HeadlessDesktop, HeadlessWindow, Platform, WindowSystem};
pub use discovery::{discover, discover_all, RejectReason, Surfaces};
pub use encoder::{FileEncoder, ImageEncoder};
pub use error::{CaptureError, CaptureResult, EncodingError, EncodingResult};
pub use pipeline::{BatchCapture, BatchReport, SurfaceOutcome, SurfaceReport};
pub use region::CaptureTarget;
pub use types::{
    CaptureConfig, CaptureRegion, DiscoveryOptions, DisplayInfo, OutputFormat, RawImage,
    Rect, SurfaceDescriptor, WindowHandle,
};

/// Main entry point: a windowing-system backend plus a capture configuration
pub struct SurfaceCapture {
    system: Box<dyn WindowSystem>,
    config: CaptureConfig,
}

impl SurfaceCapture {
    /// Connect to the current platform with default configuration
    pub fn new() -> CaptureResult<Self> {
        Ok(Self::with_system(Platform::new()?))
    }

    /// Use an explicit backend, e.g. a [`HeadlessDesktop`]
    pub fn with_system(system: Box<dyn WindowSystem>) -> Self {
        Self {
            system,
            config: CaptureConfig::default(),
        }
    }

    /// Replace the capture configuration
    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the current capture configuration
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Set the capture configuration
    pub fn set_config(&mut self, config: CaptureConfig) {
        self.config = config;
    }

    /// The underlying windowing-system backend
    pub fn system(&self) -> &dyn WindowSystem {
        self.system.as_ref()
    }

    /// Run a discovery pass with the configured options
    pub fn discover(&self) -> CaptureResult<Vec<SurfaceDescriptor>> {
        Ok(discovery::discover_with(self.system(), self.config.discovery)?.collect())
    }

    /// Attached displays as reported by the backend
    pub fn displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        self.system.enumerate_displays()
    }

    /// Resolve the capture target of one surface
    pub fn resolve(&self, surface: &SurfaceDescriptor) -> CaptureResult<CaptureTarget> {
        region::resolve(self.system(), surface)
    }

    /// Capture one surface into memory
    pub fn capture(&self, surface: &SurfaceDescriptor) -> CaptureResult<RawImage> {
        pipeline::capture_surface(self.system(), surface)
    }

    /// Discover all surfaces and write one file per surface.
    ///
    /// Only configuration and enumeration failures are returned as errors;
    /// failures on individual surfaces end up in the report.
    pub fn capture_all(&self) -> CaptureResult<BatchReport> {
        self.config.validate()?;
        let surfaces = discovery::discover_with(self.system(), self.config.discovery)?;
        self.capture_surfaces(surfaces)
    }

    /// Write one file per surface of an already discovered list.
    ///
    /// Numbering follows the order of `surfaces`, so a list printed before
    /// capturing matches the file names exactly even if windows come and go
    /// in between.
    pub fn capture_surfaces<I>(&self, surfaces: I) -> CaptureResult<BatchReport>
    where
        I: IntoIterator<Item = SurfaceDescriptor>,
    {
        self.config.validate()?;

        let encoder = FileEncoder::new(self.config.image_format);
        let mut batch = BatchCapture::new(self.system(), encoder, self.config.output_dir.clone())
            .starting_at(self.config.first_index);
        Ok(batch.run(surfaces))
    }

    /// Get the implementation name
    pub fn implementation_name(&self) -> String {
        self.system.implementation_name()
    }
}

/// Convenience function to list the surfaces of the current desktop
pub fn list_surfaces() -> CaptureResult<Vec<SurfaceDescriptor>> {
    SurfaceCapture::new()?.discover()
}

/// Convenience function to capture every surface into `output_dir`
pub fn capture_all_to(output_dir: impl Into<std::path::PathBuf>) -> CaptureResult<BatchReport> {
    SurfaceCapture::new()?
        .with_config(CaptureConfig::default().with_output_dir(output_dir))
        .capture_all()
}

/// Library version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get library capabilities
pub fn capabilities() -> String {
    let mut caps = vec!["Headless"];

    #[cfg(target_os = "windows")]
    caps.push("Windows GDI/DWM");
    #[cfg(target_os = "linux")]
    caps.push("Linux X11");

    caps.join(", ")
}
