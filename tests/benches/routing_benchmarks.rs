//! # Routing Benchmarks
//!
//! | Operation | Input |
//! |-----------|-------|
//! | Path digest insert/contains | 1 to 32 routers |
//! | Advertisement merge | 100 to 10k prefixes |
//! | Wire encode/decode | 100 to 10k prefixes |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndvr_routing::{
    Cost, InvertibleBloomFilter, MergeContext, NextHop, RoutingEntry, RoutingTable, WireCodec,
};
use rand::Rng;
use std::time::Duration;

const LOCAL: &str = "/bench/%C1.Router/local";
const NEIGHBOR: &str = "/bench/%C1.Router/neighbor";

/// A neighbor's table: `size` prefixes, each with a random cost and a
/// digest of a few random routers.
fn advertised_table(size: usize) -> RoutingTable {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|i| {
            let mut digest = InvertibleBloomFilter::default();
            for _ in 0..rng.gen_range(1..6) {
                digest.insert(format!("/bench/%C1.Router/r{}", rng.gen_range(0..500)));
            }
            let origin = format!("/bench/%C1.Router/o{}", i % 64);
            RoutingEntry::new(format!("/bench/prefix/{}", i), rng.gen_range(1..1_000), origin)
                .with_next_hop(NextHop::new(
                    format!("/bench/%C1.Router/h{}", i % 16),
                    Cost::new(rng.gen_range(0..16)),
                    digest,
                ))
        })
        .collect()
}

fn bench_path_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("path-digest");

    for routers in [1usize, 8, 32] {
        let names: Vec<String> = (0..routers)
            .map(|i| format!("/bench/%C1.Router/r{}", i))
            .collect();

        group.bench_with_input(BenchmarkId::new("insert", routers), &names, |b, names| {
            b.iter(|| {
                let mut digest = InvertibleBloomFilter::default();
                for name in names {
                    digest.insert(name);
                }
                black_box(digest)
            })
        });

        let mut digest = InvertibleBloomFilter::default();
        for name in &names {
            digest.insert(name);
        }
        group.bench_with_input(BenchmarkId::new("contains", routers), &digest, |b, digest| {
            b.iter(|| black_box(digest.contains(LOCAL)))
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    group.measurement_time(Duration::from_secs(10));

    let ctx = MergeContext {
        local_router: LOCAL,
        neighbor: NEIGHBOR,
        link_cost: Cost::new(1),
    };

    for size in [100usize, 1_000, 10_000] {
        let theirs = advertised_table(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("into_empty", size), &theirs, |b, theirs| {
            b.iter(|| {
                let mut ours = RoutingTable::new();
                black_box(ours.merge_advertisement(&ctx, theirs))
            })
        });

        let mut converged = RoutingTable::new();
        converged.merge_advertisement(&ctx, &theirs);
        group.bench_with_input(BenchmarkId::new("repeat", size), &theirs, |b, theirs| {
            b.iter(|| {
                let mut ours = converged.clone();
                black_box(ours.merge_advertisement(&ctx, theirs))
            })
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = WireCodec::new(64 * 1024 * 1024, 3);

    for size in [100usize, 1_000, 10_000] {
        let table = advertised_table(size);
        let bytes = codec.encode(&table);
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &table, |b, table| {
            b.iter(|| black_box(codec.encode(table)))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &bytes, |b, bytes| {
            b.iter(|| black_box(codec.decode(bytes)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_path_digest, bench_merge, bench_codec);
criterion_main!(benches);
