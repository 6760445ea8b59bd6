// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Signed-window decomposition of scalars.
//!
//! Each scalar is cut into `c`-bit windows, lowest first. A window value `v` above
//! `2^(c-1) - 1` is replaced by `v - 2^c` and a carry of one is pushed to the next window, so
//! every digit lies in `[-2^(c-1), 2^(c-1)]` and only `2^(c-1)` buckets are needed per window.
//! The last window never borrows; it is `last_c` bits wide so it can absorb the final carry.
use bitvec::prelude::*;
use byteorder::{ByteOrder, LittleEndian};
use ff::PrimeField;
use rayon::prelude::*;

/// Number of 64-bit words a scalar is decoded into.
pub(crate) const MAX_LIMBS: usize = 4;

/// Windows narrower than this carry no statistics, so their chunks are never split.
const STATS_MIN_WIDTH: usize = 10;

/// Little-endian 64-bit words of the canonical representation of `s`.
pub(crate) fn scalar_words<F: PrimeField>(s: &F) -> [u64; MAX_LIMBS] {
  let repr = s.to_repr();
  let bytes = repr.as_ref();
  let mut buf = [0u8; MAX_LIMBS * 8];
  let len = bytes.len().min(buf.len());
  buf[..len].copy_from_slice(&bytes[..len]);

  let mut words = [0u64; MAX_LIMBS];
  LittleEndian::read_u64_into(&buf, &mut words);
  words
}

/// Returns bit `j` of a scalar decoded by [`scalar_words`].
#[inline(always)]
pub(crate) fn bit(words: &[u64; MAX_LIMBS], j: usize) -> bool {
  (words[j / 64] >> (j % 64)) & 1 == 1
}

/// Window layout for a given width over scalars of `bits` bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Windows {
  pub(crate) c: usize,
  pub(crate) nb_chunks: usize,
  pub(crate) last_c: usize,
}

impl Windows {
  pub(crate) fn new(c: usize, bits: usize) -> Self {
    let nb_chunks = bits.div_ceil(c);
    // unused high bits of the last window; one of them is needed to hold the carry
    let available = nb_chunks * c - bits;
    Self {
      c,
      nb_chunks,
      last_c: c + 1 - available,
    }
  }

  /// Effective width of chunk `j`, which sizes its bucket table.
  pub(crate) fn width(&self, j: usize) -> usize {
    if j + 1 == self.nb_chunks {
      self.last_c
    } else {
      self.c
    }
  }
}

/// Packs a signed digit as `magnitude << 1 | sign`, with negative values stored off by one.
#[inline]
pub(crate) fn encode(digit: i64) -> u32 {
  if digit >= 0 {
    (digit as u32) << 1
  } else {
    (((-digit - 1) as u32) << 1) | 1
  }
}

/// Bucket index (`|digit| - 1`) and sign of a non-zero packed digit.
#[inline(always)]
pub(crate) fn bucket(digit: u32) -> (usize, bool) {
  let neg = digit & 1 == 1;
  let idx = if neg { digit >> 1 } else { (digit >> 1) - 1 };
  (idx as usize, neg)
}

/// Selects the bits of one window, possibly straddling two words.
#[derive(Clone, Copy, Debug)]
struct Selector {
  index: usize,
  shift: usize,
  mask: u64,
  two_words: bool,
}

impl Selector {
  fn new(chunk: usize, c: usize) -> Self {
    let start = chunk * c;
    let index = start / 64;
    let shift = start % 64;
    Self {
      index,
      shift,
      mask: (1u64 << c) - 1,
      two_words: shift + c > 64 && index + 1 < MAX_LIMBS,
    }
  }

  #[inline(always)]
  fn select(&self, words: &[u64; MAX_LIMBS]) -> u64 {
    let mut v = words[self.index] >> self.shift;
    if self.two_words {
      v |= words[self.index + 1] << (64 - self.shift);
    }
    v & self.mask
  }
}

/// Load statistics of one chunk, used only to steer the splitting and accelerator heuristics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ChunkStat {
  /// Non-zero digits of the chunk relative to the mean over all chunks (mean = 100).
  pub(crate) weight: f32,
  /// Number of distinct buckets the chunk touches.
  pub(crate) nb_bucket_filled: usize,
  /// Percentage of the chunk's buckets that are touched.
  pub(crate) fill_ratio: f32,
}

/// Digits of all scalars, laid out chunk-major so each chunk owns one contiguous row.
pub(crate) struct Partition {
  pub(crate) windows: Windows,
  pub(crate) stats: Vec<ChunkStat>,
  digits: Vec<u32>,
  n: usize,
}

impl Partition {
  /// Digits of chunk `j` for every scalar, in input order.
  pub(crate) fn chunk(&self, j: usize) -> &[u32] {
    &self.digits[j * self.n..(j + 1) * self.n]
  }
}

/// Decomposes `scalars` into signed `c`-bit digits.
pub(crate) fn partition_scalars<F: PrimeField>(scalars: &[F], c: usize) -> Partition {
  debug_assert!(F::NUM_BITS as usize <= MAX_LIMBS * 64);
  let windows = Windows::new(c, F::NUM_BITS as usize);
  let nb_chunks = windows.nb_chunks;
  let n = scalars.len();

  let body: Vec<Selector> = (0..nb_chunks - 1).map(|j| Selector::new(j, c)).collect();
  let last = Selector::new(nb_chunks - 1, c);
  let max = (1i64 << (c - 1)) - 1;

  let mut by_scalar = vec![0u32; n * nb_chunks];
  by_scalar
    .par_chunks_mut(nb_chunks)
    .zip(scalars.par_iter())
    .with_min_len(256)
    .for_each(|(out, s)| {
      if s.is_zero_vartime() {
        return;
      }
      let words = scalar_words(s);

      let mut carry = 0;
      for (d, sel) in out.iter_mut().zip(&body) {
        let mut digit = carry + sel.select(&words) as i64;
        carry = 0;
        if digit > max {
          digit -= 1 << c;
          carry = 1;
        }
        *d = encode(digit);
      }
      out[nb_chunks - 1] = encode(carry + last.select(&words) as i64);
    });

  let mut digits = vec![0u32; n * nb_chunks];
  if n > 0 {
    digits.par_chunks_mut(n).enumerate().for_each(|(j, row)| {
      for (i, d) in row.iter_mut().enumerate() {
        *d = by_scalar[i * nb_chunks + j];
      }
    });
  }

  let stats = chunk_stats(&digits, n, windows);
  Partition {
    windows,
    stats,
    digits,
    n,
  }
}

fn chunk_stats(digits: &[u32], n: usize, windows: Windows) -> Vec<ChunkStat> {
  if windows.c < STATS_MIN_WIDTH || n == 0 {
    return vec![ChunkStat::default(); windows.nb_chunks];
  }

  let mut stats: Vec<ChunkStat> = digits
    .par_chunks(n)
    .enumerate()
    .map(|(j, row)| {
      let nb_buckets = 1usize << (windows.width(j) - 1);
      let mut hit = bitvec![0; nb_buckets];
      let mut ops = 0usize;
      let mut filled = 0usize;
      for &d in row.iter().filter(|d| **d != 0) {
        ops += 1;
        let (b, _) = bucket(d);
        if !hit[b] {
          hit.set(b, true);
          filled += 1;
        }
      }
      ChunkStat {
        weight: ops as f32,
        nb_bucket_filled: filled,
        fill_ratio: (filled as f32 * 100.0) / nb_buckets as f32,
      }
    })
    .collect();

  let total: f32 = stats.iter().map(|s| s.weight).sum();
  let target = total / windows.nb_chunks as f32;
  // all digits zero: nothing to balance
  if target != 0.0 {
    for s in stats.iter_mut() {
      s.weight = (s.weight * 100.0) / target;
    }
  }
  stats
}
