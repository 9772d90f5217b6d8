//! Session and stream throughput across the three algorithms.

use std::hint::black_box;
use std::io::{Read, Write};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qat_core::codec::Algorithm;
use qat_core::session::{SessionBuilder, SessionConfig};
use qat_core::stream::{CompressorWriter, DecompressorReader};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALGORITHMS: [Algorithm; 3] = [Algorithm::Deflate, Algorithm::Lz4, Algorithm::Zstd];
const SIZES: [usize; 3] = [4 * 1024, 64 * 1024, 1024 * 1024];

/// Half random, half text, so ratios sit between the extremes.
fn sample(size: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let text = b"The quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        if rng.gen_bool(0.5) {
            data.extend_from_slice(text);
        } else {
            data.extend((0..text.len()).map(|_| rng.gen::<u8>()));
        }
    }
    data.truncate(size);
    data
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    for &alg in &ALGORITHMS {
        for &size in &SIZES {
            let data = sample(size);
            let mut session = SessionBuilder::new().algorithm(alg).build().unwrap();
            let mut packed = vec![0u8; session.max_compressed_length(size).unwrap()];
            let mut restored = vec![0u8; size];

            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::new(format!("compress/{}", alg), size), &data, |b, d| {
                b.iter(|| session.compress(black_box(d), &mut packed).unwrap())
            });

            let n = session.compress(&data, &mut packed).unwrap();
            group.bench_with_input(BenchmarkId::new(format!("decompress/{}", alg), size), &packed[..n], |b, p| {
                b.iter(|| session.decompress(black_box(p), &mut restored).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");
    let size = 4 * 1024 * 1024;
    let data = sample(size);
    group.throughput(Throughput::Bytes(size as u64));
    for &alg in &ALGORITHMS {
        let config = SessionConfig::new(alg);
        group.bench_function(BenchmarkId::new("write", alg), |b| {
            b.iter(|| {
                let mut w = CompressorWriter::new(Vec::new(), config).unwrap();
                w.write_all(black_box(&data)).unwrap();
                w.into_inner().unwrap()
            })
        });

        let mut w = CompressorWriter::new(Vec::new(), config).unwrap();
        w.write_all(&data).unwrap();
        let wire = w.into_inner().unwrap();
        group.bench_function(BenchmarkId::new("read", alg), |b| {
            b.iter(|| {
                let mut r = DecompressorReader::new(black_box(&wire[..]), config).unwrap();
                let mut out = Vec::with_capacity(size);
                r.read_to_end(&mut out).unwrap();
                out
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_session, bench_stream);
criterion_main!(benches);
