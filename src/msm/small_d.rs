// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Subset-sum tables for MSMs over a few base points.
//!
//! With `d` base points, `table[mask]` holds the sum of the points selected by the bits of
//! `mask`. An MSM then costs one doubling and at most one mixed addition per scalar bit,
//! whatever `d` is.
use super::{
  digits::{bit, scalar_words},
  point::{Affine, JacobianExtended, batch_to_affine},
};
use crate::{errors::MsmError, start_span};
use ff::PrimeField;
use halo2curves::CurveAffine;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, info_span};

/// Largest number of base points a [`SubsetSumTable`] accepts.
pub const MAX_SMALL_D: usize = 30;

// rows filled in parallel and normalized with one inversion each
const BLOCK: usize = 1 << 12;

/// Precomputed subset sums of a fixed list of at most [`MAX_SMALL_D`] base points.
///
/// The table holds `2^d` affine points, so it is meant to be built once and reused for many
/// scalar vectors.
#[derive(Clone, Debug)]
pub struct SubsetSumTable<C: CurveAffine> {
  d: usize,
  table: Vec<Option<Affine<C>>>,
}

impl<C: CurveAffine> SubsetSumTable<C> {
  /// Builds the table for `points`.
  pub fn new(points: &[C]) -> Result<Self, MsmError> {
    let d = points.len();
    if d > MAX_SMALL_D {
      return Err(MsmError::TableTooLarge {
        actual: d,
        max: MAX_SMALL_D,
      });
    }

    let (_table_span, table_t) = start_span!("subset_sum_table", size = d);
    let mut table = vec![JacobianExtended::<C>::identity(); 1 << d];
    for (i, p) in points.iter().enumerate() {
      let (lo, hi) = table.split_at_mut(1 << i);
      let hi = &mut hi[..1 << i];
      match Affine::from_curve(p) {
        Some(p) => hi
          .par_iter_mut()
          .zip(lo.par_iter())
          .with_min_len(BLOCK)
          .for_each(|(dst, src)| {
            *dst = *src;
            dst.add_mixed(&p);
          }),
        None => hi.copy_from_slice(lo),
      }
    }

    let table = table.par_chunks(BLOCK).flat_map_iter(batch_to_affine).collect();
    info!(elapsed_ms = %table_t.elapsed().as_millis(), size = d, "subset_sum_table");

    Ok(Self { d, table })
  }

  /// Number of base points.
  pub fn len(&self) -> usize {
    self.d
  }

  /// Returns true if the table was built from no points.
  pub fn is_empty(&self) -> bool {
    self.d == 0
  }

  /// Computes `sum_i [scalars_i] points_i` for the points the table was built from.
  pub fn multi_exp(&self, scalars: &[C::Scalar]) -> Result<C, MsmError> {
    if scalars.len() != self.d {
      return Err(MsmError::LengthMismatch {
        points: self.d,
        scalars: scalars.len(),
      });
    }

    let words: Vec<_> = scalars.iter().map(scalar_words).collect();
    let mut acc = JacobianExtended::<C>::identity();
    for j in (0..C::Scalar::NUM_BITS as usize).rev() {
      acc = acc.double();
      let x = words
        .iter()
        .enumerate()
        .fold(0usize, |x, (i, w)| x | (usize::from(bit(w, j)) << i));
      if let Some(p) = &self.table[x] {
        acc.add_mixed(p);
      }
    }
    acc.to_curve_affine()
  }
}

/// Computes `sum_i [scalars_i] points_i` through a one-off [`SubsetSumTable`].
///
/// Fails with [`MsmError::TableTooLarge`] for more than [`MAX_SMALL_D`] points.
pub fn multi_exp_small_d<C: CurveAffine>(
  points: &[C],
  scalars: &[C::Scalar],
) -> Result<C, MsmError> {
  if points.len() != scalars.len() {
    return Err(MsmError::LengthMismatch {
      points: points.len(),
      scalars: scalars.len(),
    });
  }
  if points.is_empty() {
    return Ok(C::identity());
  }

  let (_msm_span, msm_t) = start_span!("multi_exp_small_d", size = points.len());
  let res = SubsetSumTable::new(points)?.multi_exp(scalars);
  info!(elapsed_ms = %msm_t.elapsed().as_millis(), size = points.len(), "multi_exp_small_d");
  res
}
