// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Aliases for the BLS12-381 G1 and G2 groups.
//!
//! BLS12-381 is a pairing-friendly elliptic curve offering ~128 bits of security. Its 255-bit
//! scalar field leaves one spare bit in the top window, which the signed digits use for the
//! final carry. G2 lives over the quadratic extension `Fq2` and shares the scalar field.

/// Re-exports that give access to the standard aliases used in the code base, for BLS12-381 G1
pub mod g1 {
  pub use halo2curves::bls12381::{Fq as Base, Fr as Scalar, G1 as Point, G1Affine as Affine};
}

/// Re-exports that give access to the standard aliases used in the code base, for BLS12-381 G2
pub mod g2 {
  pub use halo2curves::bls12381::{Fq2 as Base, Fr as Scalar, G2 as Point, G2Affine as Affine};
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    BatchAffineThresholds, MultiExpConfig,
    msm::{SubsetSumTable, multi_exp, multi_exp_large_d, multi_exp_small_d},
  };
  use ff::Field;
  use halo2curves::{
    CurveExt,
    group::{Curve, Group, prime::PrimeCurveAffine},
  };
  use rand_core::OsRng;

  fn bases(label: &'static str, n: usize) -> Vec<g1::Affine> {
    let hash = g1::Point::hash_to_curve(label);
    (0..n as u64).map(|i| hash(&i.to_le_bytes()).to_affine()).collect()
  }

  // ==================== MSM CORRECTNESS ====================

  #[test]
  fn test_msm_correctness_against_naive() {
    let n = 16;
    let bases = bases("msm_correctness", n);

    let scalars: Vec<g1::Scalar> = (0..n).map(|i| g1::Scalar::from((i + 1) as u64)).collect();

    let msm_result = multi_exp(&bases, &scalars, &MultiExpConfig::default()).unwrap();

    // Naive computation: sum of scalar_i * base_i
    let mut naive_result = g1::Point::identity();
    for (scalar, base) in scalars.iter().zip(bases.iter()) {
      naive_result += g1::Point::from(*base) * scalar;
    }

    assert_eq!(msm_result, naive_result.to_affine(), "MSM must match naive computation");
  }

  #[test]
  fn test_msm_empty() {
    let bases: Vec<g1::Affine> = vec![];
    let scalars: Vec<g1::Scalar> = vec![];

    let result = multi_exp(&bases, &scalars, &MultiExpConfig::default()).unwrap();
    assert!(bool::from(result.is_identity()), "empty MSM should be identity");
  }

  #[test]
  fn test_msm_single_element() {
    let bases = bases("single", 1);
    let scalar = g1::Scalar::from(42u64);

    let msm_result = multi_exp(&bases, &[scalar], &MultiExpConfig::default()).unwrap();
    let expected = g1::Point::from(bases[0]) * scalar;

    assert_eq!(msm_result, expected.to_affine(), "single-element MSM");
  }

  #[test]
  fn test_msm_all_zeros() {
    let n = 8;
    let bases = bases("zeros", n);
    let scalars: Vec<g1::Scalar> = vec![g1::Scalar::ZERO; n];

    let result = multi_exp(&bases, &scalars, &MultiExpConfig::default()).unwrap();
    assert!(bool::from(result.is_identity()), "MSM with all-zero scalars");
  }

  #[test]
  fn test_msm_scalar_minus_one() {
    // r - 1 has the top window fully loaded and carries through every window
    let n = 33;
    let bases = bases("minus_one", n);
    let scalars = vec![-g1::Scalar::ONE; n];

    let expected = -bases
      .iter()
      .fold(g1::Point::identity(), |acc, b| acc + *b)
      .to_affine();
    for c in [4, 5, 8, 13, 16] {
      let config = MultiExpConfig {
        window: Some(c),
        ..MultiExpConfig::default()
      };
      assert_eq!(multi_exp(&bases, &scalars, &config).unwrap(), expected, "c = {c}");
    }
    assert_eq!(multi_exp_large_d(&bases, &scalars).unwrap(), expected);
  }

  // ==================== SMALL / LARGE D ====================

  #[test]
  fn test_setup_ceremony_combinations() {
    // a handful of bases combined with many scalar vectors
    let bases = bases("ceremony", 6);
    let table = SubsetSumTable::new(&bases).unwrap();
    for k in 0..8u64 {
      let scalars: Vec<g1::Scalar> = (0..6u64)
        .map(|i| g1::Scalar::from(k * 6 + i).square())
        .collect();
      assert_eq!(
        table.multi_exp(&scalars).unwrap(),
        multi_exp_large_d(&bases, &scalars).unwrap()
      );
    }
  }

  // ==================== COORDINATES ====================

  #[test]
  fn test_generator_coordinates() {
    use crate::msm::Affine;

    let g = g1::Affine::generator();
    let p = Affine::from_curve(&g).unwrap();

    // y^2 = x^3 + 4 (BLS12-381 G1)
    assert_eq!(p.y.square(), p.x.square() * p.x + g1::Base::from(4u64));
    assert_eq!(p.to_curve().unwrap(), g);
    assert!(Affine::from_curve(&g1::Affine::identity()).is_none());
  }

  // ==================== G2 ====================

  fn g2_bases(label: &'static str, n: usize) -> Vec<g2::Affine> {
    let hash = g2::Point::hash_to_curve(label);
    (0..n as u64).map(|i| hash(&i.to_le_bytes()).to_affine()).collect()
  }

  fn g2_naive(bases: &[g2::Affine], scalars: &[g2::Scalar]) -> g2::Affine {
    bases
      .iter()
      .zip(scalars)
      .fold(g2::Point::identity(), |acc, (b, s)| acc + g2::Point::from(*b) * s)
      .to_affine()
  }

  #[test]
  fn test_g2_msm_against_naive() {
    let n = 50;
    let mut bases = g2_bases("g2_msm", n);
    bases[17] = g2::Affine::identity();
    let scalars: Vec<g2::Scalar> = (0..n).map(|_| g2::Scalar::random(OsRng)).collect();
    let expected = g2_naive(&bases, &scalars);

    assert_eq!(multi_exp(&bases, &scalars, &MultiExpConfig::default()).unwrap(), expected);
    assert_eq!(multi_exp_large_d(&bases, &scalars).unwrap(), expected);

    // wide windows go through the batch-affine accelerator
    let config = MultiExpConfig {
      window: Some(12),
      batch_affine: BatchAffineThresholds::new([2; 7]),
      ..MultiExpConfig::default()
    };
    assert_eq!(multi_exp(&bases, &scalars, &config).unwrap(), expected);
  }

  #[test]
  fn test_g2_small_d_and_large_d() {
    let mut bases = g2_bases("g2_small_d", 9);
    bases[4] = g2::Affine::identity();
    let table = SubsetSumTable::new(&bases).unwrap();
    for _ in 0..3 {
      let scalars: Vec<g2::Scalar> = (0..9).map(|_| g2::Scalar::random(OsRng)).collect();
      let expected = g2_naive(&bases, &scalars);
      assert_eq!(multi_exp_small_d(&bases, &scalars).unwrap(), expected);
      assert_eq!(multi_exp_large_d(&bases, &scalars).unwrap(), expected);
      assert_eq!(table.multi_exp(&scalars).unwrap(), expected);
    }
  }
}
