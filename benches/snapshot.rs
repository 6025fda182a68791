use criterion::{criterion_group, criterion_main, Criterion};
use cardboard_atlas::snapshot::Snapshot;
use cardboard_atlas::Workspace;
use glam::Vec3;
use image::Rgba;

/// Workspace with a painted raster and a mix of outlines and triangles.
fn make_workspace() -> Workspace {
    let mut ws = Workspace::default();
    for i in 0..20 {
        let x = i as f32 * 3.0;
        if i % 2 == 0 {
            ws.add_outline(&[
                Vec3::new(x, 0.0, 0.0),
                Vec3::new(x + 1.5, 0.0, 0.0),
                Vec3::new(x + 1.5, 0.0, 1.0),
                Vec3::new(x + 0.75, 0.0, 1.5),
                Vec3::new(x, 0.0, 1.0),
            ])
            .unwrap();
        } else {
            ws.add_triangle(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 0.0), Vec3::new(x, 1.0, 1.0))
                .unwrap();
        }
    }
    for i in 0..64 {
        let c = (i * 4) as u8;
        ws.raster_mut().write_rect(i * 8, 0, 8, 512, Rgba([c, 255 - c, c / 2, 255]));
    }
    ws
}

fn bench_capture(c: &mut Criterion) {
    let ws = make_workspace();

    c.bench_function("snapshot_capture_to_json", |b| {
        b.iter(|| Snapshot::capture(&ws).unwrap().to_json().unwrap());
    });
}

fn bench_restore(c: &mut Criterion) {
    let json = Snapshot::capture(&make_workspace()).unwrap().to_json().unwrap();
    let mut ws = Workspace::default();

    c.bench_function("snapshot_from_json_restore", |b| {
        b.iter(|| Snapshot::from_json(&json).unwrap().restore(&mut ws).unwrap());
    });
}

criterion_group!(benches, bench_capture, bench_restore);
criterion_main!(benches);
