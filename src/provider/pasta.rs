//! Aliases for `pallas::Point`, `pallas::Scalar`, `vesta::Point`, `vesta::Scalar`.
//!
//! The pasta curves are not pairing-friendly; they are used to check that the MSM routines only
//! rely on the short-Weierstrass group law.

/// Re-exports that give access to the standard aliases used in the code base, for pallas
pub mod pallas {
  pub use halo2curves::pasta::{Fp as Base, Fq as Scalar, Pallas as Point, PallasAffine as Affine};
}

/// Re-exports that give access to the standard aliases used in the code base, for vesta
pub mod vesta {
  pub use halo2curves::pasta::{Fp as Scalar, Fq as Base, Vesta as Point, VestaAffine as Affine};
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::msm::{multi_exp_large_d, multi_exp_small_d};
  use ff::Field;
  use halo2curves::group::Curve;
  use rand_core::OsRng;

  #[test]
  fn test_cycle_pair_small_d() {
    // each curve's scalar field is the other's base field
    let p: Vec<pallas::Affine> = (0..9)
      .map(|_| (pallas::Point::generator() * pallas::Scalar::random(OsRng)).to_affine())
      .collect();
    let s: Vec<pallas::Scalar> = (0..9).map(|_| pallas::Scalar::random(OsRng)).collect();
    assert_eq!(
      multi_exp_small_d(&p, &s).unwrap(),
      multi_exp_large_d(&p, &s).unwrap()
    );

    let p: Vec<vesta::Affine> = (0..9)
      .map(|_| (vesta::Point::generator() * vesta::Scalar::random(OsRng)).to_affine())
      .collect();
    let s: Vec<vesta::Scalar> = (0..9).map(|_| vesta::Scalar::random(OsRng)).collect();
    assert_eq!(
      multi_exp_small_d(&p, &s).unwrap(),
      multi_exp_large_d(&p, &s).unwrap()
    );
  }
}
