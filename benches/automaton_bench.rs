//! Benchmarks for automaton construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use treematch::{AutomatonBuilder, Odometer, Pattern};

fn reference_patterns() -> Vec<Pattern> {
    vec![
        Pattern::node(
            "a",
            vec![
                Pattern::node("a", vec![Pattern::leaf("b"), Pattern::wildcard()]),
                Pattern::leaf("b"),
            ],
        ),
        Pattern::node(
            "a",
            vec![
                Pattern::node("a", vec![Pattern::wildcard(), Pattern::leaf("c")]),
                Pattern::leaf("c"),
            ],
        ),
    ]
}

/// A small instruction-selection style rule set.
fn isel_patterns() -> Vec<Pattern> {
    let reg = || Pattern::leaf("reg");
    let imm = || Pattern::leaf("imm");
    let any = Pattern::wildcard;
    vec![
        Pattern::node("add", vec![reg(), reg()]),
        Pattern::node("add", vec![reg(), imm()]),
        Pattern::node("add", vec![any(), Pattern::node("mul", vec![any(), imm()])]),
        Pattern::node("load", vec![Pattern::node("add", vec![reg(), imm()])]),
        Pattern::node("load", vec![any()]),
        Pattern::node("store", vec![any(), Pattern::node("load", vec![reg()])]),
        Pattern::node("mul", vec![reg(), imm()]),
        Pattern::node("neg", vec![Pattern::node("neg", vec![any()])]),
    ]
}

fn bench_reference(c: &mut Criterion) {
    c.bench_function("build_reference", |b| {
        b.iter(|| {
            AutomatonBuilder::new()
                .patterns(black_box(reference_patterns()))
                .build()
                .unwrap()
        })
    });
}

fn bench_isel(c: &mut Criterion) {
    c.bench_function("build_isel", |b| {
        b.iter(|| {
            AutomatonBuilder::new()
                .patterns(black_box(isel_patterns()))
                .build()
                .unwrap()
        })
    });
}

fn bench_odometer(c: &mut Criterion) {
    c.bench_function("odometer_16_3", |b| {
        b.iter(|| Odometer::new(black_box(16), black_box(3)).count())
    });
}

criterion_group!(benches, bench_reference, bench_isel, bench_odometer);
criterion_main!(benches);
