//! Capture every surface on the desktop
//!
//! Prints the numbered list of discovered surfaces and writes one PNG per
//! surface into the directory given as first argument (default: current
//! directory). Set RUST_LOG=debug to see region resolution details.

use std::env;
use surface_capture_rust::{CaptureConfig, SurfaceCapture, SurfaceOutcome};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_dir = env::args().nth(1).unwrap_or_else(|| ".".to_string());

    let capture = SurfaceCapture::new()?
        .with_config(CaptureConfig::default().with_output_dir(&output_dir));
    println!("Using implementation: {}", capture.implementation_name());

    // One discovery pass, so printed numbers always match the file names
    let surfaces = capture.discover()?;
    for (index, surface) in surfaces.iter().enumerate() {
        println!("{:2}. {}", index + 1, surface.label());
    }

    let report = capture.capture_surfaces(surfaces)?;
    for surface in &report.surfaces {
        match &surface.outcome {
            SurfaceOutcome::Saved(path) => println!("Saved {}", path.display()),
            SurfaceOutcome::Skipped(reason) => {
                println!("Skipped {} ({}): {}", surface.index, surface.label, reason)
            }
            SurfaceOutcome::EncodeFailed(reason) => {
                println!("Failed to write {} ({}): {}", surface.index, surface.label, reason)
            }
        }
    }

    println!(
        "\n{} of {} surface(s) saved to {}",
        report.saved(),
        report.len(),
        output_dir
    );
    Ok(())
}
