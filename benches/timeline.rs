use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use scroll_orbit::timeline::ScrollTimeline;

const VIEWPORT_HEIGHT: f32 = 900.0;

fn build(sections: usize) -> ScrollTimeline {
    ScrollTimeline::build(
        &vec![0.0; sections],
        VIEWPORT_HEIGHT,
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(0.0, -8.0, -1.0),
        15.0,
        5.0,
    )
    .unwrap()
}

/// Cost of rebuilding the timeline once the model lands
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline_build");
    for sections in [3, 12, 48] {
        group.bench_with_input(BenchmarkId::from_parameter(sections), &sections, |b, &n| {
            b.iter(|| build(black_box(n)))
        });
    }
    group.finish();
}

/// Cost of one scroll event: sampling camera and every overlay
fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline_sample");
    for sections in [3, 12, 48] {
        let timeline = build(sections);
        let end = timeline.trigger().end;
        group.bench_with_input(BenchmarkId::from_parameter(sections), &timeline, |b, timeline| {
            let mut i = 0u32;
            b.iter(|| {
                i = i.wrapping_add(1);
                let scroll = end * (i % 1000) as f32 / 1000.0;
                timeline.sample(black_box(scroll))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_sample);
criterion_main!(benches);
