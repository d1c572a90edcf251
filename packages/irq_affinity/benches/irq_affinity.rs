//! Benchmarking processor list parsing, mask prediction and the hex codec.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use irq_affinity::{AffinityMode, decode_hex, encode_hex, groups, parse_cpu_range};
use new_zealand::nz;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("irq_affinity");

    group.bench_function("parse_small", |b| {
        b.iter(|| parse_cpu_range(black_box("0,1,3-4,11-16,23-27"), None).unwrap());
    });

    group.bench_function("parse_wide", |b| {
        b.iter(|| parse_cpu_range(black_box("0-1023:2,1-1023:4"), Some(nz!(1024))).unwrap());
    });

    let cpu_count = nz!(1024_u32);
    let isolated = parse_cpu_range("2-511,600-700,1000-1023", Some(cpu_count)).unwrap();

    group.bench_function("exclude_from_default", |b| {
        b.iter(|| {
            AffinityMode::ExcludeFromDefault
                .apply(black_box(cpu_count), black_box(&isolated))
                .unwrap()
        });
    });

    group.bench_function("include_only", |b| {
        b.iter(|| {
            AffinityMode::IncludeOnly
                .apply(black_box(cpu_count), black_box(&isolated))
                .unwrap()
        });
    });

    let mask = AffinityMode::ExcludeFromDefault
        .apply(cpu_count, &isolated)
        .unwrap();
    let canonical = encode_hex(&mask);
    let kernel = mask.to_kernel_string();

    group.bench_function("encode_hex", |b| {
        b.iter(|| encode_hex(black_box(&mask)));
    });

    group.bench_function("decode_hex_canonical", |b| {
        b.iter(|| decode_hex(black_box(&canonical), groups(cpu_count)).unwrap());
    });

    group.bench_function("decode_hex_kernel", |b| {
        b.iter(|| decode_hex(black_box(&kernel), groups(cpu_count)).unwrap());
    });

    group.finish();
}
