//! Bit writer and tree encoders for crafting test bitstreams

use std::collections::{BTreeSet, HashMap};

/// LSB-first bit writer, the inverse of `BitReader`
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    bits: usize,
}

impl BitWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put_bit(&mut self, bit: bool) {
        if self.bits % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (self.bits % 8);
        }
        self.bits += 1;
    }

    pub(crate) fn put_byte(&mut self, value: u8) {
        for i in 0..8 {
            self.put_bit((value >> i) & 1 != 0);
        }
    }

    pub(crate) fn put_u16(&mut self, value: u16) {
        self.put_byte(value as u8);
        self.put_byte((value >> 8) as u8);
    }

    pub(crate) fn put_code(&mut self, code: &[bool]) {
        for &bit in code {
            self.put_bit(bit);
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Write a balanced pre-order tree body, returning each leaf's code
fn encode_body<T: Copy + Eq + std::hash::Hash>(
    bw: &mut BitWriter,
    leaves: &[T],
    prefix: &mut Vec<bool>,
    codes: &mut HashMap<T, Vec<bool>>,
    write_leaf: &mut dyn FnMut(&mut BitWriter, T),
) {
    if leaves.len() == 1 {
        bw.put_bit(false);
        write_leaf(bw, leaves[0]);
        codes.insert(leaves[0], prefix.clone());
        return;
    }
    bw.put_bit(true);
    let (left, right) = leaves.split_at(leaves.len() / 2);
    prefix.push(false);
    encode_body(bw, left, prefix, codes, write_leaf);
    prefix.pop();
    prefix.push(true);
    encode_body(bw, right, prefix, codes, write_leaf);
    prefix.pop();
}

/// Write a complete 8-bit tree (presence bit, body, terminator)
pub(crate) fn encode_small_tree(bw: &mut BitWriter, symbols: &[u8]) -> HashMap<u8, Vec<bool>> {
    let mut codes = HashMap::new();
    bw.put_bit(true);
    encode_body(bw, symbols, &mut Vec::new(), &mut codes, &mut |bw: &mut BitWriter, sym: u8| {
        bw.put_byte(sym)
    });
    bw.put_bit(false);
    codes
}

/// Write a complete 16-bit tree with the given escape seeds
pub(crate) fn encode_big_tree(
    bw: &mut BitWriter,
    values: &[u16],
    cache: [u16; 3],
) -> HashMap<u16, Vec<bool>> {
    let lows: Vec<u8> = values
        .iter()
        .map(|v| *v as u8)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let highs: Vec<u8> = values
        .iter()
        .map(|v| (*v >> 8) as u8)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    bw.put_bit(true);
    let low_codes = encode_small_tree(bw, &lows);
    let high_codes = encode_small_tree(bw, &highs);
    for seed in cache {
        bw.put_u16(seed);
    }

    let mut codes = HashMap::new();
    encode_body(bw, values, &mut Vec::new(), &mut codes, &mut |bw: &mut BitWriter, value: u16| {
        bw.put_code(&low_codes[&(value as u8)]);
        bw.put_code(&high_codes[&((value >> 8) as u8)]);
    });
    bw.put_bit(false);
    codes
}

/// Write a tree declared absent
pub(crate) fn encode_absent_tree(bw: &mut BitWriter) {
    bw.put_bit(false);
    bw.put_bit(false);
}
