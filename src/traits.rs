//! This module defines the extension trait that exposes the MSM routines on curve points.
use crate::{
  config::MultiExpConfig,
  errors::MsmError,
  msm::{multi_exp, multi_exp_large_d, multi_exp_small_d},
};
use halo2curves::CurveAffine;

/// Multi-scalar multiplication on an affine curve type
pub trait MultiExp: CurveAffine {
  /// Computes `sum_i [scalars_i] bases_i` with the parallel bucket method
  fn multi_exp(
    bases: &[Self],
    scalars: &[Self::Scalar],
    config: &MultiExpConfig,
  ) -> Result<Self, MsmError> {
    multi_exp(bases, scalars, config)
  }

  /// Computes `sum_i [scalars_i] bases_i` through a subset-sum table of at most 30 bases
  fn multi_exp_small_d(bases: &[Self], scalars: &[Self::Scalar]) -> Result<Self, MsmError> {
    multi_exp_small_d(bases, scalars)
  }

  /// Computes `sum_i [scalars_i] bases_i` by shared double-and-add
  fn multi_exp_large_d(bases: &[Self], scalars: &[Self::Scalar]) -> Result<Self, MsmError> {
    multi_exp_large_d(bases, scalars)
  }
}

impl<C: CurveAffine> MultiExp for C {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::bls12_381::g1;
  use ff::Field;
  use halo2curves::group::Curve;
  use rand_core::OsRng;

  #[test]
  fn test_multi_exp_trait() {
    let bases: Vec<g1::Affine> = (0..12)
      .map(|_| (g1::Point::generator() * g1::Scalar::random(OsRng)).to_affine())
      .collect();
    let scalars: Vec<g1::Scalar> = (0..12).map(|_| g1::Scalar::random(OsRng)).collect();

    let config = MultiExpConfig::default();
    let res = <g1::Affine as MultiExp>::multi_exp(&bases, &scalars, &config).unwrap();
    assert_eq!(res, g1::Affine::multi_exp_small_d(&bases, &scalars).unwrap());
    assert_eq!(res, g1::Affine::multi_exp_large_d(&bases, &scalars).unwrap());
  }
}
