// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Shared double-and-add over all scalars, without precomputation.
use super::{
  digits::{bit, scalar_words},
  point::{Affine, JacobianExtended},
};
use crate::{errors::MsmError, start_span};
use ff::PrimeField;
use halo2curves::CurveAffine;
use std::time::Instant;
use tracing::{info, info_span};

/// Computes `sum_i [scalars_i] points_i` by scanning scalar bits from the most significant one,
/// doubling once per bit and adding every point whose scalar has that bit set.
pub fn multi_exp_large_d<C: CurveAffine>(
  points: &[C],
  scalars: &[C::Scalar],
) -> Result<C, MsmError> {
  if points.len() != scalars.len() {
    return Err(MsmError::LengthMismatch {
      points: points.len(),
      scalars: scalars.len(),
    });
  }

  let (_msm_span, msm_t) = start_span!("multi_exp_large_d", size = points.len());
  let bases: Vec<Option<Affine<C>>> = points.iter().map(Affine::from_curve).collect();
  let words: Vec<_> = scalars.iter().map(scalar_words).collect();

  let mut acc = JacobianExtended::<C>::identity();
  for j in (0..C::Scalar::NUM_BITS as usize).rev() {
    acc = acc.double();
    for (p, w) in bases.iter().zip(&words) {
      if let (Some(p), true) = (p, bit(w, j)) {
        acc.add_mixed(p);
      }
    }
  }
  info!(elapsed_ms = %msm_t.elapsed().as_millis(), size = points.len(), "multi_exp_large_d");

  acc.to_curve_affine()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::msm::multi_exp_small_d;
  use crate::provider::bls12_381::g1;
  use ff::Field;
  use group::{Curve, prime::PrimeCurveAffine};
  use rand_core::OsRng;

  #[test]
  fn test_large_d_matches_small_d() {
    for n in [0, 1, 5, 12] {
      let points: Vec<g1::Affine> = (0..n)
        .map(|_| (g1::Point::generator() * g1::Scalar::random(OsRng)).to_affine())
        .collect();
      let scalars: Vec<g1::Scalar> = (0..n).map(|_| g1::Scalar::random(OsRng)).collect();
      assert_eq!(
        multi_exp_large_d(&points, &scalars).unwrap(),
        multi_exp_small_d(&points, &scalars).unwrap()
      );
    }
  }

  #[test]
  fn test_large_d_edge_scalars() {
    let g = g1::Affine::generator();
    let points = [g, g1::Affine::identity(), g];
    let scalars = [-g1::Scalar::ONE, g1::Scalar::from(9), g1::Scalar::from(3)];
    let expected = (g1::Point::generator() * g1::Scalar::from(2)).to_affine();
    assert_eq!(multi_exp_large_d(&points, &scalars).unwrap(), expected);

    assert_eq!(
      multi_exp_large_d(&points, &scalars[..1]),
      Err(MsmError::LengthMismatch {
        points: 3,
        scalars: 1
      })
    );
  }
}
