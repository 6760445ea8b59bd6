// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Per-window bucket accumulation.
use super::{
  batch_affine,
  budget::{TaskBudget, run_with},
  digits::{ChunkStat, bucket},
  point::{Affine, JacobianExtended},
};
use crate::config::BatchAffineThresholds;
use halo2curves::CurveAffine;

/// How the buckets of one window are filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChunkProcessor {
  /// extended Jacobian buckets, one mixed addition per digit
  Jacobian,
  /// affine buckets updated in batches sharing one inversion
  BatchAffine {
    /// number of additions per inversion
    batch_size: usize,
  },
}

impl ChunkProcessor {
  /// The batch-affine accelerator is used once a window touches enough distinct buckets to
  /// recoup its inversions.
  pub(crate) fn select(width: usize, stat: &ChunkStat, thresholds: &BatchAffineThresholds) -> Self {
    match thresholds.threshold(width) {
      Some(t) if stat.nb_bucket_filled >= t => ChunkProcessor::BatchAffine { batch_size: t },
      _ => ChunkProcessor::Jacobian,
    }
  }

  /// Computes `sum_i digit_i * points_i` for one window of width `width`, holding a permit of
  /// `budget` while running.
  pub(crate) fn run<C: CurveAffine>(
    self,
    width: usize,
    points: &[Option<Affine<C>>],
    digits: &[u32],
    budget: Option<&TaskBudget>,
  ) -> JacobianExtended<C> {
    run_with(budget, || match self {
      ChunkProcessor::Jacobian => process_chunk_jacobian(width, points, digits),
      ChunkProcessor::BatchAffine { batch_size } => {
        batch_affine::process_chunk(width, batch_size, points, digits)
      }
    })
  }
}

/// Pippenger's bucket method over `2^(width-1)` extended Jacobian buckets.
pub(crate) fn process_chunk_jacobian<C: CurveAffine>(
  width: usize,
  points: &[Option<Affine<C>>],
  digits: &[u32],
) -> JacobianExtended<C> {
  let mut buckets = vec![JacobianExtended::<C>::identity(); 1 << (width - 1)];

  for (p, &d) in points.iter().zip(digits) {
    if d == 0 {
      continue;
    }
    let Some(p) = p else { continue };
    let (b, neg) = bucket(d);
    if neg {
      buckets[b].sub_mixed(p);
    } else {
      buckets[b].add_mixed(p);
    }
  }

  reduce_buckets(&buckets)
}

/// `sum_k (k + 1) * buckets[k]` with two additions per bucket.
pub(crate) fn reduce_buckets<C: CurveAffine>(
  buckets: &[JacobianExtended<C>],
) -> JacobianExtended<C> {
  let mut running = JacobianExtended::identity();
  let mut total = JacobianExtended::identity();
  for b in buckets.iter().rev() {
    running.add_assign(b);
    total.add_assign(&running);
  }
  total
}
