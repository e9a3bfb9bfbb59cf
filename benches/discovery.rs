//! Discovery and Capture Benchmarks
//!
//! Benchmarks for surface discovery, region resolution and batch capture
//! against an in-memory desktop using criterion

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;
use surface_capture_rust::*;

/// Desktop with two displays and `windows` top-level windows, every fourth
/// one minimized so the filter has work to do
fn busy_desktop(windows: u64) -> HeadlessDesktop {
    let mut desktop = HeadlessDesktop::new()
        .with_display("DISP1", Rect::new(0, 0, 1920, 1080), true)
        .with_display("DISP2", Rect::new(1920, 0, 3840, 1080), false);

    for i in 0..windows {
        let offset = (i % 100) as i32 * 8;
        let window = HeadlessWindow::new(
            0x1000 + i,
            format!("Window {}", i),
            Rect::new(offset, offset, offset + 640, offset + 480),
        )
        .composited(Some(Rect::new(offset + 7, offset, offset + 633, offset + 473)))
        .minimized(i % 4 == 0);
        desktop = desktop.with_window(window);
    }
    desktop
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");

    for windows in [10u64, 100, 1000] {
        let desktop = busy_desktop(windows);
        group.throughput(Throughput::Elements(windows));

        group.bench_with_input(BenchmarkId::new("discover_all", windows), &desktop, |b, desktop| {
            b.iter(|| black_box(discover_all(desktop).unwrap()))
        });
    }

    group.finish();
}

fn bench_region_resolution(c: &mut Criterion) {
    let desktop = busy_desktop(100);
    let surfaces = discover_all(&desktop).unwrap();

    c.bench_function("resolve_all_surfaces", |b| {
        b.iter(|| {
            for surface in &surfaces {
                black_box(region::resolve(&desktop, surface).unwrap());
            }
        })
    });
}

fn bench_batch_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_capture");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let desktop = busy_desktop(20);
    let surfaces = discover_all(&desktop).unwrap();
    let dir = tempfile::tempdir().unwrap();

    for format in [OutputFormat::Png, OutputFormat::Bmp] {
        group.bench_with_input(
            BenchmarkId::new("capture_to_files", format.extension()),
            &format,
            |b, &format| {
                b.iter(|| {
                    let mut batch = BatchCapture::new(&desktop, FileEncoder::new(format), dir.path());
                    black_box(batch.run(surfaces.iter().cloned()))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_discovery,
    bench_region_resolution,
    bench_batch_capture
);
criterion_main!(benches);
