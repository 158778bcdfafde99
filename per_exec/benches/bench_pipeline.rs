//! # Perception Pipeline Benchmark

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::eqpt::{cam::Frame, nav::ObstacleBox};
use per_lib::perception::{FrameGeometry, Perception};

fn pipeline_benchmark(c: &mut Criterion) {
    // ---- Build a frame with both boundaries and an obstacle ----

    let mut frame = Frame::filled(Utc::now(), 640, 480, [60, 60, 60, 255]).unwrap();
    frame.fill_rect(80, 330, 30, 60, [0, 255, 255, 255]);
    frame.fill_rect(200, 260, 20, 40, [0, 255, 255, 255]);
    frame.fill_rect(530, 330, 30, 60, [140, 0, 0, 255]);
    frame.fill_rect(420, 260, 20, 40, [140, 0, 0, 255]);

    let obstacle = ObstacleBox {
        x: 300,
        y: 250,
        w: 60,
        h: 40,
        image_width: 640,
        image_height: 480,
        count: 1
    };

    let mut per = Perception::new(FrameGeometry::new(640, 480));

    c.bench_function("perception 640x480", |b| b.iter(|| {
        per.detect(black_box(&frame), Some(&obstacle)).ok()
    }));
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
