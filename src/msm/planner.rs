// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Cost model for the bucket method.
//!
//! The number of group operations for width `c` is approximated by
//! `(bits + 1) / c * (n + 2^c)`. Wall-clock time is modelled per chunk: chunks run in rounds
//! of `nb_tasks`, and their partial sums are folded sequentially at the end. Splitting the
//! input in two adds work, but can pay off when there are more workers than chunks.
use crate::config::{MAX_WINDOW, MIN_WINDOW};

/// Outcome of the cost model for one MSM invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Plan {
  /// window width for this level
  pub(crate) c: usize,
  /// run two half-size MSMs instead
  pub(crate) split: bool,
}

/// Window width with the lowest estimated operation count for `nb_points` points.
pub(crate) fn best_c(nb_points: usize, bits: usize) -> usize {
  let cost = |c: usize| ((bits + 1) * (nb_points + (1 << c))) as f64 / c as f64;
  (MIN_WINDOW..=MAX_WINDOW)
    .min_by(|a, b| cost(*a).total_cmp(&cost(*b)))
    .unwrap_or(MIN_WINDOW)
}

/// Estimated wall time: reduction of every chunk, plus one round of `cost_per_chunk` for each
/// batch of `nb_tasks` chunks running side by side.
pub(crate) fn cost_function(nb_chunks: usize, nb_tasks: usize, cost_per_chunk: usize) -> usize {
  nb_chunks + nb_chunks.div_ceil(nb_tasks) * cost_per_chunk
}

fn cost_per_chunk(c: usize, nb_points: usize) -> usize {
  nb_points + (1 << c)
}

/// Picks the window width for `nb_points` points and decides whether halving the input is
/// faster on `nb_tasks` workers.
pub(crate) fn plan(nb_points: usize, nb_tasks: usize, bits: usize) -> Plan {
  let c = best_c(nb_points, bits);
  if nb_tasks <= 1 || nb_points < 2 {
    return Plan { c, split: false };
  }

  let cost_pre_split = cost_function(bits.div_ceil(c), nb_tasks, cost_per_chunk(c, nb_points));

  let half = nb_points / 2;
  let c_post_split = best_c(half, bits);
  let cost_post_split = cost_function(
    2 * bits.div_ceil(c_post_split),
    nb_tasks,
    cost_per_chunk(c_post_split, half),
  );

  Plan {
    c,
    split: cost_post_split < cost_pre_split,
  }
}
