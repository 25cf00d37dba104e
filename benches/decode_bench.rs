#![allow(dead_code)]
extern crate criterion;

use self::criterion::*;
use lz4_stream_decode::{Decoder, UncachedDecoder};

#[path = "../tests/common/mod.rs"]
mod common;

fn make_corpus(len: usize) -> Vec<u8> {
    // runs of repeats interspersed with near-random bytes, roughly matching
    // the mixed compressibility of the teacher's own text/JSON corpora.
    (0..len)
        .map(|i| match i % 41 {
            0..=19 => b'a' + (i % 7) as u8,
            _ => ((i * 2654435761) % 251) as u8,
        })
        .collect()
}

const SIZES: &[usize] = &[1024, 34 * 1024, 256 * 1024];

fn bench_baseline_vs_uncached_one_shot(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_one_shot");

    for &size in SIZES {
        let data = make_corpus(size);
        let compressed = common::compress(&data);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("baseline", size), &compressed, |b, i| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                let mut out = vec![0u8; data.len()];
                decoder.decompress(i, &mut out).unwrap();
                black_box(out);
            })
        });

        group.bench_with_input(BenchmarkId::new("uncached", size), &compressed, |b, i| {
            b.iter(|| {
                let mut decoder = UncachedDecoder::new();
                let mut out = vec![0u8; data.len()];
                decoder.decompress(i, &mut out).unwrap();
                black_box(out);
            })
        });
    }

    group.finish();
}

fn bench_baseline_vs_uncached_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_4k_chunks");
    const CHUNK: usize = 4096;

    for &size in SIZES {
        let data = make_corpus(size);
        let compressed = common::compress(&data);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("baseline", size), &compressed, |b, i| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                let mut out = vec![0u8; data.len()];
                let mut in_pos = 0;
                let mut out_pos = 0;
                while in_pos < i.len() {
                    let in_end = (in_pos + CHUNK).min(i.len());
                    let out_end = (out_pos + CHUNK).min(out.len());
                    let p = decoder
                        .decompress(&i[in_pos..in_end], &mut out[out_pos..out_end])
                        .unwrap();
                    in_pos += p.consumed;
                    out_pos += p.written;
                }
                black_box(out);
            })
        });

        group.bench_with_input(BenchmarkId::new("uncached", size), &compressed, |b, i| {
            b.iter(|| {
                let mut decoder = UncachedDecoder::new();
                let mut out = vec![0u8; data.len()];
                let mut in_pos = 0;
                let mut out_pos = 0;
                while in_pos < i.len() {
                    let in_end = (in_pos + CHUNK).min(i.len());
                    let out_end = (out_pos + CHUNK).min(out.len());
                    let p = decoder
                        .decompress(&i[in_pos..in_end], &mut out[out_pos..out_end])
                        .unwrap();
                    in_pos += p.consumed;
                    out_pos += p.written;
                }
                black_box(out);
            })
        });
    }

    group.finish();
}

criterion_group!(
    decode_benches,
    bench_baseline_vs_uncached_one_shot,
    bench_baseline_vs_uncached_chunked,
);
criterion_main!(decode_benches);
