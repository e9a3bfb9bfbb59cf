//! Capture pipeline: drives discovered surfaces through capture and encoding

pub mod batch;

pub use batch::{capture_surface, BatchCapture, BatchReport, SurfaceOutcome, SurfaceReport};
