//! Benchmarks for parsing, sampling and frame composition.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grapher_core::{compose_frame, parse, Color, Layer, Overlay, Sampler, Theme, Viewport};

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_nested", |b| {
        b.iter(|| parse(black_box("sin(2x)^2 + |cos(x)|/(1 + x^2) - atan2(x, 3)")))
    });
}

fn bench_eval(c: &mut Criterion) {
    let expr = parse("sin(2x)^2 + |cos(x)|/(1 + x^2)").expect("valid formula");

    c.bench_function("eval_1000", |b| {
        b.iter(|| {
            (0..1000)
                .map(|i| expr.eval(black_box(f64::from(i) * 0.01)).unwrap_or(0.0))
                .sum::<f64>()
        })
    });
}

fn bench_sample_smooth(c: &mut Criterion) {
    let expr = parse("sin(x)").expect("valid formula");
    let viewport = Viewport::new(-10.0, 10.0, -2.0, 2.0, 1920, 1080).expect("valid viewport");
    let sampler = Sampler::default();

    c.bench_function("sample_sin_1920px", |b| {
        b.iter(|| sampler.sample(&expr, black_box(&viewport)).count())
    });
}

fn bench_sample_poles(c: &mut Criterion) {
    let expr = parse("tan(x)").expect("valid formula");
    let viewport = Viewport::new(-20.0, 20.0, -5.0, 5.0, 1920, 1080).expect("valid viewport");
    let sampler = Sampler::default();

    c.bench_function("sample_tan_1920px", |b| {
        b.iter(|| sampler.sample(&expr, black_box(&viewport)).count())
    });
}

fn bench_compose_frame(c: &mut Criterion) {
    let viewport = Viewport::new(-10.0, 10.0, -6.0, 6.0, 1280, 768).expect("valid viewport");
    let sampler = Sampler::default();
    let layers: Vec<Layer> = ["x^2", "sin(x)", "1/x"]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let expr = parse(text).expect("valid formula");
            Layer {
                label: (*text).to_string(),
                color: Color::palette(i),
                polylines: sampler.sample(&expr, &viewport).collect(),
            }
        })
        .collect();
    let theme = Theme::dark();

    c.bench_function("compose_frame_3_layers", |b| {
        b.iter(|| compose_frame(black_box(&viewport), &theme, &layers, &Overlay::default()))
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_eval,
    bench_sample_smooth,
    bench_sample_poles,
    bench_compose_frame,
);
criterion_main!(benches);
