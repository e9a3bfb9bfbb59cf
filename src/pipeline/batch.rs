//! Batch capture: resolve, grab and encode every discovered surface in turn.
//!
//! A failure on one surface is logged and recorded, never propagated; the
//! remaining surfaces are still captured. Nothing is retried.

use std::path::PathBuf;

use crate::{
    capture::WindowSystem,
    encoder::{EncoderStats, ImageEncoder},
    error::CaptureResult,
    region,
    types::{RawImage, SurfaceDescriptor},
};

/// What happened to one surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOutcome {
    /// Captured and written to this path
    Saved(PathBuf),
    /// Not captured: unresolvable geometry, empty region or failed transfer
    Skipped(String),
    /// Captured, but the encoder failed to write the file
    EncodeFailed(String),
}

/// Per-surface entry of a [`BatchReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceReport {
    /// Sequential index, also the output file stem
    pub index: usize,
    pub label: String,
    pub outcome: SurfaceOutcome,
}

/// Result of a batch capture, one entry per surface in capture order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub surfaces: Vec<SurfaceReport>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn saved(&self) -> usize {
        self.count(|outcome| matches!(outcome, SurfaceOutcome::Saved(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, SurfaceOutcome::Skipped(_)))
    }

    pub fn encode_failures(&self) -> usize {
        self.count(|outcome| matches!(outcome, SurfaceOutcome::EncodeFailed(_)))
    }

    /// Paths of all written files, in capture order
    pub fn saved_paths(&self) -> Vec<&PathBuf> {
        self.surfaces
            .iter()
            .filter_map(|surface| match &surface.outcome {
                SurfaceOutcome::Saved(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&SurfaceOutcome) -> bool) -> usize {
        self.surfaces.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Capture a single surface into memory
pub fn capture_surface(
    system: &dyn WindowSystem,
    descriptor: &SurfaceDescriptor,
) -> CaptureResult<RawImage> {
    let target = region::resolve(system, descriptor)?;
    let region = target.region()?;
    system.grab(target.source, region)
}

/// Captures a sequence of surfaces and hands each image to an encoder
pub struct BatchCapture<'a, E: ImageEncoder> {
    system: &'a dyn WindowSystem,
    encoder: E,
    output_dir: PathBuf,
    first_index: usize,
    stats: EncoderStats,
}

impl<'a, E: ImageEncoder> BatchCapture<'a, E> {
    pub fn new(system: &'a dyn WindowSystem, encoder: E, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            system,
            encoder,
            output_dir: output_dir.into(),
            first_index: 1,
            stats: EncoderStats::default(),
        }
    }

    /// Index of the first surface (default 1)
    pub fn starting_at(mut self, first_index: usize) -> Self {
        self.first_index = first_index;
        self
    }

    /// Output path for the surface with the given index
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", index, self.encoder.extension()))
    }

    pub fn stats(&self) -> &EncoderStats {
        &self.stats
    }

    /// Capture every surface in order.
    ///
    /// Indices are assigned to all surfaces, including skipped ones, so a
    /// surface keeps its number whether or not its neighbours succeed.
    pub fn run<I>(&mut self, surfaces: I) -> BatchReport
    where
        I: IntoIterator<Item = SurfaceDescriptor>,
    {
        let mut report = BatchReport::default();

        for (offset, descriptor) in surfaces.into_iter().enumerate() {
            let index = self.first_index + offset;
            let outcome = self.capture_one(index, &descriptor);
            report.surfaces.push(SurfaceReport {
                index,
                label: descriptor.label().to_string(),
                outcome,
            });
        }

        log::debug!(
            "Batch finished: {} saved, {} skipped, {} encode failure(s)",
            report.saved(),
            report.skipped(),
            report.encode_failures()
        );
        report
    }

    fn capture_one(&mut self, index: usize, descriptor: &SurfaceDescriptor) -> SurfaceOutcome {
        let image = match capture_surface(self.system, descriptor) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Skipping surface {} '{}': {}", index, descriptor.label(), e);
                return SurfaceOutcome::Skipped(e.to_string());
            }
        };

        let path = self.output_path(index);
        match self.encoder.encode_to(&image, &path) {
            Ok(()) => {
                self.stats.record_success(image.size());
                SurfaceOutcome::Saved(path)
            }
            Err(e) => {
                log::warn!(
                    "Failed to write surface {} '{}' to {}: {}",
                    index,
                    descriptor.label(),
                    path.display(),
                    e
                );
                self.stats.record_failure();
                SurfaceOutcome::EncodeFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::headless::{HeadlessDesktop, HeadlessWindow};
    use crate::error::{EncodingError, EncodingResult};
    use crate::types::{Rect, WindowHandle};
    use parking_lot::Mutex;
    use std::path::Path;

    /// Records calls instead of writing files; fails for configured indices
    #[derive(Default)]
    struct RecordingEncoder {
        written: Mutex<Vec<(PathBuf, u32, u32)>>,
        fail_on: Vec<PathBuf>,
    }

    impl ImageEncoder for RecordingEncoder {
        fn encode_to(&self, image: &RawImage, path: &Path) -> EncodingResult<()> {
            if self.fail_on.iter().any(|p| p == path) {
                return Err(EncodingError::Other(anyhow::anyhow!("disk full")));
            }
            self.written
                .lock()
                .push((path.to_path_buf(), image.width, image.height));
            Ok(())
        }

        fn extension(&self) -> &str {
            "png"
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn desktop() -> HeadlessDesktop {
        HeadlessDesktop::new()
            .with_display("DISP1", Rect::new(0, 0, 64, 48), true)
            .with_window(HeadlessWindow::new(7, "Editor", Rect::new(4, 4, 36, 28)))
    }

    #[test]
    fn test_every_surface_gets_sequential_output_name() {
        let desktop = desktop();
        let encoder = RecordingEncoder::default();
        let surfaces = crate::discovery::discover_all(&desktop).unwrap();

        let report = BatchCapture::new(&desktop, &encoder, "out").run(surfaces);

        assert_eq!(report.saved(), 3);
        let written = encoder.written.lock();
        let names: Vec<PathBuf> = written.iter().map(|(p, _, _)| p.clone()).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("out/1.png"),
                PathBuf::from("out/2.png"),
                PathBuf::from("out/3.png")
            ]
        );
        assert_eq!((written[2].1, written[2].2), (32, 24));
    }

    #[test]
    fn test_failed_surface_does_not_abort_batch() {
        let desktop = desktop();
        let encoder = RecordingEncoder::default();
        let surfaces = vec![
            SurfaceDescriptor::window(WindowHandle::from_raw(99), "Vanished"),
            SurfaceDescriptor::region("Empty", Rect::new(10, 10, 10, 30)),
            SurfaceDescriptor::region("DISP1", Rect::new(0, 0, 64, 48)),
        ];

        let report = BatchCapture::new(&desktop, &encoder, "out").run(surfaces);

        assert_eq!(report.len(), 3);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.saved(), 1);
        assert_eq!(report.surfaces[2].index, 3);
        assert_eq!(report.saved_paths(), vec![&PathBuf::from("out/3.png")]);
    }

    #[test]
    fn test_encoding_failure_is_recorded_and_batch_continues() {
        let desktop = desktop();
        let encoder = RecordingEncoder {
            fail_on: vec![PathBuf::from("out/1.png")],
            ..Default::default()
        };
        let surfaces = crate::discovery::discover_all(&desktop).unwrap();

        let mut batch = BatchCapture::new(&desktop, &encoder, "out");
        let report = batch.run(surfaces);

        assert_eq!(report.encode_failures(), 1);
        assert_eq!(report.saved(), 2);
        assert_eq!(batch.stats().failures, 1);
        assert_eq!(batch.stats().images_encoded, 2);
    }

    #[test]
    fn test_custom_first_index() {
        let desktop = desktop();
        let encoder = RecordingEncoder::default();
        let batch = BatchCapture::new(&desktop, &encoder, "shots").starting_at(10);
        assert_eq!(batch.output_path(10), PathBuf::from("shots/10.png"));
    }
}
