//! バイナリ記述子用のLSHインデックス

use super::types::{LshParams, MatcherError};
use crate::features::{Descriptor, DESCRIPTOR_BYTES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

const TABLE_SEED: u64 = 0x15b0_0006;
const DESCRIPTOR_BITS: usize = DESCRIPTOR_BYTES * 8;

/// 近傍候補
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: u32,
}

/// 2つの記述子のハミング距離
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.chunks_exact(8)
        .zip(b.chunks_exact(8))
        .map(|(x, y)| {
            let x = u64::from_le_bytes(x.try_into().unwrap_or([0; 8]));
            let y = u64::from_le_bytes(y.try_into().unwrap_or([0; 8]));
            (x ^ y).count_ones()
        })
        .sum()
}

struct HashTable {
    bits: Vec<usize>,
    buckets: HashMap<u32, Vec<usize>>,
}

impl HashTable {
    fn key(&self, descriptor: &Descriptor) -> u32 {
        self.bits.iter().enumerate().fold(0u32, |key, (i, &bit)| {
            if descriptor[bit / 8] & (1 << (bit % 8)) != 0 {
                key | (1 << i)
            } else {
                key
            }
        })
    }
}

/// 候補側の記述子に対して構築するLSHインデックス
pub struct LshIndex<'a> {
    descriptors: &'a [Descriptor],
    tables: Vec<HashTable>,
    probe_masks: Vec<u32>,
}

impl<'a> LshIndex<'a> {
    pub fn build(descriptors: &'a [Descriptor], params: &LshParams) -> Result<Self, MatcherError> {
        if params.table_number == 0 {
            return Err(MatcherError::InvalidIndexParams("table_number = 0".into()));
        }
        if params.key_size == 0 || params.key_size > 32 || params.key_size > DESCRIPTOR_BITS {
            return Err(MatcherError::InvalidIndexParams(format!(
                "key_size = {}",
                params.key_size
            )));
        }
        if params.multi_probe_level > params.key_size {
            return Err(MatcherError::InvalidIndexParams(format!(
                "multi_probe_level = {}",
                params.multi_probe_level
            )));
        }
        if descriptors.is_empty() {
            return Err(MatcherError::EmptyIndex);
        }

        let all_bits: Vec<usize> = (0..DESCRIPTOR_BITS).collect();
        let tables = (0..params.table_number)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(TABLE_SEED + t as u64);
                let bits: Vec<usize> = all_bits
                    .choose_multiple(&mut rng, params.key_size)
                    .copied()
                    .collect();
                let mut table = HashTable {
                    bits,
                    buckets: HashMap::new(),
                };
                for (i, d) in descriptors.iter().enumerate() {
                    let key = table.key(d);
                    table.buckets.entry(key).or_default().push(i);
                }
                table
            })
            .collect();

        Ok(Self {
            descriptors,
            tables,
            probe_masks: probe_masks(params.key_size, params.multi_probe_level),
        })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 最近傍と第2近傍を返す（候補が2つ未満なら `None`）
    pub fn nearest_two(&self, query: &Descriptor) -> Option<(Neighbor, Neighbor)> {
        let mut candidates: Vec<usize> = Vec::new();
        for table in &self.tables {
            let key = table.key(query);
            for mask in &self.probe_masks {
                if let Some(bucket) = table.buckets.get(&(key ^ mask)) {
                    candidates.extend_from_slice(bucket);
                }
            }
        }
        candidates.sort_unstable();
        candidates.dedup();

        let mut best: Option<Neighbor> = None;
        let mut second: Option<Neighbor> = None;
        for index in candidates {
            let distance = hamming_distance(query, &self.descriptors[index]);
            let n = Neighbor { index, distance };
            match best {
                Some(b) if distance >= b.distance => {
                    if second.map_or(true, |s| distance < s.distance) {
                        second = Some(n);
                    }
                }
                _ => {
                    second = best;
                    best = Some(n);
                }
            }
        }

        Some((best?, second?))
    }
}

/// 反転ビット数が `level` 以下のすべてのマスク（0を含む）
fn probe_masks(key_size: usize, level: usize) -> Vec<u32> {
    let mut masks = vec![0u32];
    let mut frontier = vec![0u32];
    for _ in 0..level {
        let mut next = Vec::new();
        for &mask in &frontier {
            let highest = if mask == 0 { 0 } else { 32 - mask.leading_zeros() as usize };
            for bit in highest..key_size {
                next.push(mask | (1 << bit));
            }
        }
        masks.extend_from_slice(&next);
        frontier = next;
    }
    masks
}
