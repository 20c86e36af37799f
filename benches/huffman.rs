use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use smacker::bitstream::BitReader;
use smacker::huffman::{BigTree, SmallTree};
use std::hint::black_box;

#[path = "../tests/common/mod.rs"]
mod common;

use common::{encode_big_tree, encode_small_tree, BitWriter};

/// Deterministic pseudo-random picks
fn picks(count: usize, modulo: usize) -> Vec<usize> {
    (0..count)
        .map(|i| {
            let x = i as u32;
            (x.wrapping_mul(1664525).wrapping_add(1013904223) >> 8) as usize % modulo
        })
        .collect()
}

fn bitstream_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitstream");
    let data: Vec<u8> = (0..65536).map(|i| (i * 31 + 7) as u8).collect();
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("read_bit", |b| {
        b.iter(|| {
            let mut br = BitReader::new(black_box(&data));
            let mut ones = 0u32;
            while let Ok(bit) = br.read_bit() {
                ones += bit as u32;
            }
            ones
        })
    });

    group.bench_function("read_byte_unaligned", |b| {
        b.iter(|| {
            let mut br = BitReader::new(black_box(&data));
            let _ = br.read_bit();
            let mut sum = 0u32;
            while let Ok(byte) = br.read_byte() {
                sum = sum.wrapping_add(byte as u32);
            }
            sum
        })
    });

    group.finish();
}

fn tree_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_lookup");
    let lookups = 10_000;

    for &leaves in &[16usize, 256] {
        let symbols: Vec<u8> = (0..leaves).map(|i| i as u8).collect();
        let mut bw = BitWriter::new();
        let codes = encode_small_tree(&mut bw, &symbols);
        for i in picks(lookups, leaves) {
            bw.put_code(&codes[&symbols[i]]);
        }
        let data = bw.finish();

        group.throughput(Throughput::Elements(lookups as u64));
        group.bench_with_input(BenchmarkId::new("small", leaves), &data, |b, data| {
            b.iter(|| {
                let mut br = BitReader::new(black_box(data));
                let tree = SmallTree::build(&mut br).expect("tree build failed");
                for _ in 0..lookups {
                    black_box(tree.lookup(&mut br).expect("lookup failed"));
                }
            })
        });

        let values: Vec<u16> = (0..leaves as u16).map(|i| i.wrapping_mul(0x0101)).collect();
        let mut bw = BitWriter::new();
        let codes = encode_big_tree(&mut bw, &values, [0xFFF0, 0xFFF1, 0xFFF2]);
        for i in picks(lookups, leaves) {
            bw.put_code(&codes[&values[i]]);
        }
        let data = bw.finish();

        group.bench_with_input(BenchmarkId::new("big", leaves), &data, |b, data| {
            b.iter(|| {
                let mut br = BitReader::new(black_box(data));
                let mut tree = BigTree::build(&mut br).expect("tree build failed");
                tree.reset();
                for _ in 0..lookups {
                    black_box(tree.lookup(&mut br).expect("lookup failed"));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bitstream_reads, tree_lookups);
criterion_main!(benches);
