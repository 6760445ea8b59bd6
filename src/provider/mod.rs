//! This module exposes the curves the MSM routines are used with, through the aliases
//! `Base`, `Scalar`, `Point` (projective) and `Affine`.

pub mod bls12_381;
pub mod bn254;
pub mod pasta;
