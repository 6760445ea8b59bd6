// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! This module provides the multi-scalar multiplication routines.
//!
//! [`multi_exp`] is a parallel Pippenger bucket method:
//! 1. a cost model picks the window width `c` and decides whether to halve the input and run
//!    two MSMs side by side;
//! 2. scalars are cut into signed `c`-bit digits, laid out one row per window ("chunk");
//! 3. every chunk is accumulated into buckets by its own rayon task, either in extended
//!    Jacobian coordinates or with the batch-affine accelerator, and heavily loaded chunks are
//!    processed as two halves;
//! 4. chunk sums are folded most significant first with `c` doublings between them.
//!
//! [`multi_exp_small_d`], [`SubsetSumTable`] and [`multi_exp_large_d`] handle a small set of
//! base points that is reused across many scalar vectors.
use crate::{
  config::{MultiExpConfig, Settings},
  errors::MsmError,
  start_span,
};
use ff::PrimeField;
use halo2curves::CurveAffine;
use rayon::{current_num_threads, prelude::*};
use std::time::Instant;
use tracing::{debug, info, info_span};

mod batch_affine;
mod budget;
mod chunk;
mod digits;
mod large_d;
mod planner;
mod point;
mod small_d;

pub use large_d::multi_exp_large_d;
pub use point::{Affine, JacobianExtended, batch_normalize};
pub use small_d::{MAX_SMALL_D, SubsetSumTable, multi_exp_small_d};

use budget::TaskBudget;
use chunk::ChunkProcessor;
use digits::{Windows, partition_scalars};
use planner::Plan;

/// Chunks whose non-zero digit count is this far above the mean (in percent) are processed as
/// two halves.
const SPLIT_WEIGHT: f32 = 115.0;

/// Computes `sum_i [scalars_i] points_i`.
///
/// `config` only affects performance; the result is the same for every valid configuration.
pub fn multi_exp<C: CurveAffine>(
  points: &[C],
  scalars: &[C::Scalar],
  config: &MultiExpConfig,
) -> Result<C, MsmError> {
  if points.len() != scalars.len() {
    return Err(MsmError::LengthMismatch {
      points: points.len(),
      scalars: scalars.len(),
    });
  }
  let settings = config.resolve()?;
  if points.is_empty() {
    return Ok(C::identity());
  }

  let (_msm_span, msm_t) = start_span!("multi_exp", size = points.len());
  let bases: Vec<Option<Affine<C>>> = points.par_iter().map(Affine::from_curve).collect();
  let res = multi_exp_extended(&bases, scalars, &settings);
  info!(elapsed_ms = %msm_t.elapsed().as_millis(), size = points.len(), "multi_exp");

  res.to_curve_affine()
}

/// Runs the bucket method, or splits the input in two if the cost model says so.
fn multi_exp_extended<C: CurveAffine>(
  points: &[Option<Affine<C>>],
  scalars: &[C::Scalar],
  settings: &Settings,
) -> JacobianExtended<C> {
  let plan = match settings.window {
    Some(c) => Plan { c, split: false },
    None => planner::plan(points.len(), settings.nb_tasks, C::Scalar::NUM_BITS as usize),
  };
  debug!(
    c = plan.c,
    split = plan.split,
    nb_tasks = settings.nb_tasks,
    size = points.len(),
    "msm_plan"
  );

  if plan.split {
    let mid = points.len() / 2;
    let half = settings.halved();
    let (mut lo, hi) = rayon::join(
      || multi_exp_extended(&points[..mid], &scalars[..mid], &half),
      || multi_exp_extended(&points[mid..], &scalars[mid..], &half),
    );
    lo.add_assign(&hi);
    return lo;
  }

  inner_msm(points, scalars, plan.c, settings)
}

/// Bucket method with a fixed window width: one task per chunk, results folded in chunk order.
fn inner_msm<C: CurveAffine>(
  points: &[Option<Affine<C>>],
  scalars: &[C::Scalar],
  c: usize,
  settings: &Settings,
) -> JacobianExtended<C> {
  let partition = partition_scalars(scalars, c);
  let windows = partition.windows;

  // only throttle when fewer tasks than threads were requested
  let budget =
    (settings.nb_tasks < current_num_threads()).then(|| TaskBudget::new(settings.nb_tasks));
  let budget = budget.as_ref();

  let mut sums = vec![JacobianExtended::<C>::identity(); windows.nb_chunks];
  rayon::scope(|s| {
    // most significant chunks first: the last one is the widest
    for (j, slot) in sums.iter_mut().enumerate().rev() {
      let width = windows.width(j);
      let stat = &partition.stats[j];
      let digits = partition.chunk(j);
      let processor = ChunkProcessor::select(width, stat, &settings.batch_affine);
      let split = stat.weight >= SPLIT_WEIGHT && points.len() >= 2;
      debug!(
        chunk = j,
        width,
        ?processor,
        split,
        weight = stat.weight,
        filled = stat.nb_bucket_filled,
        fill_ratio = stat.fill_ratio,
        "msm_chunk"
      );

      if split {
        if let Some(budget) = budget {
          budget.grant();
        }
        s.spawn(move |_| {
          let mid = points.len() / 2;
          let (mut lo, hi) = rayon::join(
            || processor.run(width, &points[..mid], &digits[..mid], budget),
            || processor.run(width, &points[mid..], &digits[mid..], budget),
          );
          lo.add_assign(&hi);
          *slot = lo;
        });
      } else {
        s.spawn(move |_| *slot = processor.run(width, points, digits, budget));
      }
    }
  });

  reduce_chunks(&windows, &sums)
}

/// Horner evaluation in base `2^c` of the chunk sums, top chunk first.
fn reduce_chunks<C: CurveAffine>(
  windows: &Windows,
  sums: &[JacobianExtended<C>],
) -> JacobianExtended<C> {
  let Some((top, rest)) = sums.split_last() else {
    return JacobianExtended::identity();
  };
  rest.iter().rev().fold(*top, |mut acc, sum| {
    for _ in 0..windows.c {
      acc = acc.double();
    }
    acc.add_assign(sum);
    acc
  })
}
