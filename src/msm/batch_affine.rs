// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Bucket accumulation in affine coordinates with batched inversions.
//!
//! An affine addition costs about a third of a mixed extended Jacobian addition once its
//! inversion is shared. Additions are staged until `batch_size` of them target distinct buckets,
//! then all denominators are inverted at once with Montgomery's trick.
//!
//! A bucket can take part in a batch only once. Points aimed at a bucket that is already staged
//! wait in a conflict queue and are retried after the next batch; when the queue fills up they
//! are added to an extended Jacobian overflow bucket instead. Doublings also go to the overflow
//! bucket, which is folded in during the final reduction.
use super::{
  digits::bucket,
  point::{Affine, JacobianExtended},
};
use bitvec::prelude::*;
use ff::Field;
use halo2curves::CurveAffine;

/// Same contract as [`super::chunk::process_chunk_jacobian`].
pub(crate) fn process_chunk<C: CurveAffine>(
  width: usize,
  batch_size: usize,
  points: &[Option<Affine<C>>],
  digits: &[u32],
) -> JacobianExtended<C> {
  let mut acc = BatchAccumulator::new(1 << (width - 1), batch_size);

  for (p, &d) in points.iter().zip(digits) {
    if d == 0 {
      continue;
    }
    let Some(p) = p else { continue };
    let (b, neg) = bucket(d);
    acc.insert(b, if neg { p.neg() } else { *p });
  }

  acc.finish()
}

struct BatchAccumulator<C: CurveAffine> {
  buckets: Vec<Option<Affine<C>>>,
  overflow: Vec<JacobianExtended<C>>,
  // buckets with a staged addition
  pending: BitVec,
  // (bucket, bucket value, point)
  batch: Vec<(usize, Affine<C>, Affine<C>)>,
  queue: Vec<(usize, Affine<C>)>,
  batch_size: usize,
  queue_size: usize,
}

impl<C: CurveAffine> BatchAccumulator<C> {
  fn new(nb_buckets: usize, batch_size: usize) -> Self {
    let batch_size = batch_size.max(1);
    let queue_size = batch_size.saturating_sub(1).max(1);
    Self {
      buckets: vec![None; nb_buckets],
      overflow: vec![JacobianExtended::identity(); nb_buckets],
      pending: bitvec![0; nb_buckets],
      batch: Vec::with_capacity(batch_size),
      queue: Vec::with_capacity(queue_size),
      batch_size,
      queue_size,
    }
  }

  fn insert(&mut self, id: usize, p: Affine<C>) {
    if self.pending[id] {
      self.queue.push((id, p));
      if self.queue.len() >= self.queue_size {
        self.flush_queue();
      }
      return;
    }

    self.stage(id, p);
    if self.batch.len() == self.batch_size {
      self.execute();
      self.drain_queue();
    }
  }

  /// Adds `p` to a bucket that is not pending, deferring the addition when it needs an
  /// inversion.
  fn stage(&mut self, id: usize, p: Affine<C>) {
    match self.buckets[id] {
      None => self.buckets[id] = Some(p),
      Some(b) if b.x == p.x => {
        if b.y == p.y {
          self.overflow[id].add_mixed(&p);
        } else {
          self.buckets[id] = None;
        }
      }
      Some(b) => {
        self.pending.set(id, true);
        self.batch.push((id, b, p));
      }
    }
  }

  /// Performs every staged addition with a single inversion.
  fn execute(&mut self) {
    if self.batch.is_empty() {
      return;
    }

    // prefix[k] = product of the denominators before k
    let mut prefix = Vec::with_capacity(self.batch.len());
    let mut acc = C::Base::ONE;
    for (_, b, p) in &self.batch {
      prefix.push(acc);
      acc *= p.x - b.x;
    }

    let inv: Option<C::Base> = acc.invert().into();
    let Some(mut inv) = inv else {
      // staged points have distinct x coordinates, so the product is non-zero
      for (id, _, p) in self.batch.drain(..) {
        self.overflow[id].add_mixed(&p);
        self.pending.set(id, false);
      }
      return;
    };

    for ((id, b, p), prefix) in self.batch.drain(..).zip(prefix).rev() {
      let dx = p.x - b.x;
      let lambda = (p.y - b.y) * (inv * prefix);
      inv *= dx;

      let x = lambda.square() - b.x - p.x;
      let y = lambda * (b.x - x) - b.y;
      self.buckets[id] = Some(Affine { x, y });
      self.pending.set(id, false);
    }
  }

  /// Retries queued points whose bucket is free again.
  fn drain_queue(&mut self) {
    let queued = std::mem::take(&mut self.queue);
    for (id, p) in queued {
      if self.pending[id] {
        self.queue.push((id, p));
        continue;
      }
      self.stage(id, p);
      if self.batch.len() == self.batch_size {
        self.execute();
      }
    }
  }

  fn flush_queue(&mut self) {
    for (id, p) in self.queue.drain(..) {
      self.overflow[id].add_mixed(&p);
    }
  }

  fn finish(mut self) -> JacobianExtended<C> {
    self.execute();
    self.flush_queue();

    let mut running = JacobianExtended::identity();
    let mut total = JacobianExtended::identity();
    for (b, o) in self.buckets.iter().zip(&self.overflow).rev() {
      if let Some(b) = b {
        running.add_mixed(b);
      }
      running.add_assign(o);
      total.add_assign(&running);
    }
    total
  }
}
