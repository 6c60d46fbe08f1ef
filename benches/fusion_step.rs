use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fake_ar::assets::normalizer::center_and_scale;
use fake_ar::assets::Geometry;
use fake_ar::camera::CameraRig;
use fake_ar::math::Transform;
use fake_ar::scene::{ObjectRegistry, SceneObject};
use fake_ar::sensors::{OrientationSample, SensorFusion};
use fake_ar::telemetry::TelemetrySnapshot;
use glam::Vec3;
use std::sync::Arc;

/// Deterministic pseudo-random point in a 10-unit cube
fn scatter(seed: u32) -> Vec3 {
    let f = |k: u32| ((seed.wrapping_mul(2654435761).wrapping_add(k * 40503)) % 10_000) as f32 / 1000.0;
    Vec3::new(f(1), f(2), f(3))
}

fn registry(count: usize) -> ObjectRegistry {
    let geometry = Arc::new(Geometry::Points {
        positions: vec![Vec3::ZERO],
        colors: vec![[1.0; 3]],
    });

    let mut registry = ObjectRegistry::new();
    for i in 0..count {
        let object = SceneObject {
            name: format!("object-{}", i),
            geometry: Arc::clone(&geometry),
            transform: Transform::from_scale(1.0),
            target_position: scatter(i as u32),
        };
        let _ = registry.insert(object);
    }
    registry
}

fn engaged_fusion() -> SensorFusion {
    let mut fusion = SensorFusion::new();
    fusion.begin_session();
    fusion.on_orientation(OrientationSample::new(0.0, 90.0, 0.0));
    fusion.on_orientation(OrientationSample::new(12.0, 97.0, -4.0));
    fusion
}

fn bench_fusion_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion_step");

    for count in [1usize, 16, 256].iter() {
        let fusion = engaged_fusion();
        let mut objects = registry(*count);
        group.bench_with_input(BenchmarkId::new("engaged", count), count, |b, _| {
            b.iter(|| fusion.step(black_box(objects.iter_mut())));
        });

        let idle = SensorFusion::new();
        let mut objects = registry(*count);
        group.bench_with_input(BenchmarkId::new("fallback", count), count, |b, _| {
            b.iter(|| idle.step(black_box(objects.iter_mut())));
        });
    }

    group.finish();
}

fn bench_telemetry_derive(c: &mut Criterion) {
    let rig = CameraRig::new(16.0 / 9.0);
    let objects = registry(64);

    c.bench_function("telemetry_derive_64", |b| {
        b.iter(|| TelemetrySnapshot::derive(black_box(1), &rig, &objects, (1920, 1080)));
    });
}

fn bench_normalize(c: &mut Criterion) {
    let source: Vec<Vec3> = (0..100_000).map(scatter).collect();

    c.bench_function("center_and_scale_100k", |b| {
        b.iter(|| {
            let mut positions = source.clone();
            center_and_scale(black_box(&mut positions))
        });
    });
}

criterion_group!(benches, bench_fusion_step, bench_telemetry_derive, bench_normalize);
criterion_main!(benches);
