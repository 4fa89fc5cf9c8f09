//! Benchmarks for numpress encoding/decoding operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use msnumpress::{LinearCodec, PicCodec, SafeCodec, SlofCodec};

/// An m/z-like ramp with small irregular steps.
fn generate_mz(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + i as f64 * 0.0125 + (i as f64 * 0.37).sin() * 0.001)
        .collect()
}

/// Non-negative intensities spanning several orders of magnitude.
fn generate_intensities(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| ((i as f64 * 0.01).sin().abs() * 10.0).exp() * 3.0)
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [1000, 10000, 100000] {
        let mz = generate_mz(size);
        let intensities = generate_intensities(size);
        let linear = LinearCodec::default();
        let slof = SlofCodec::default();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("linear", size), &mz, |b, data| {
            b.iter(|| linear.encode(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("pic", size), &intensities, |b, data| {
            b.iter(|| PicCodec.encode(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("slof", size), &intensities, |b, data| {
            b.iter(|| slof.encode(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("safe", size), &mz, |b, data| {
            b.iter(|| SafeCodec.encode(black_box(data)))
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [1000, 10000, 100000] {
        let mz = generate_mz(size);
        let intensities = generate_intensities(size);
        let linear = LinearCodec::default();
        let slof = SlofCodec::default();

        let linear_bytes = linear.encode(&mz).unwrap();
        let pic_bytes = PicCodec.encode(&intensities).unwrap();
        let slof_bytes = slof.encode(&intensities).unwrap();
        let safe_bytes = SafeCodec.encode(&mz);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("linear", size), &linear_bytes, |b, bytes| {
            b.iter(|| linear.decode(black_box(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("pic", size), &pic_bytes, |b, bytes| {
            b.iter(|| PicCodec.decode(black_box(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("slof", size), &slof_bytes, |b, bytes| {
            b.iter(|| slof.decode(black_box(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("safe", size), &safe_bytes, |b, bytes| {
            b.iter(|| SafeCodec.decode(black_box(bytes)))
        });
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");

    for size in [1000, 10000, 100000] {
        let data = generate_mz(size);
        let codec = LinearCodec::optimal(&data);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let encoded = codec.encode(black_box(data)).unwrap();
                codec.decode(&encoded)
            })
        });
    }

    group.finish();
}

fn bench_compression_ratio(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_ratio");

    for fixed_point in [1e3, 1e5, 1e7] {
        let data = generate_mz(10000);
        let codec = LinearCodec::new(fixed_point);
        let encoded = codec.encode(&data).unwrap();

        let original_size = data.len() * std::mem::size_of::<f64>();
        let compressed_size = encoded.len();
        let ratio = compressed_size as f64 / original_size as f64;

        println!(
            "Fixed point {}: {} bytes -> {} bytes (ratio: {:.3})",
            fixed_point, original_size, compressed_size, ratio
        );

        group.throughput(Throughput::Bytes(original_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("fixed_point_{}", fixed_point)),
            &data,
            |b, data| b.iter(|| codec.encode(black_box(data))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_roundtrip,
    bench_compression_ratio
);
criterion_main!(benches);
