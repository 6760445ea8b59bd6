// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Affine and extended Jacobian coordinates used inside the MSM engine.
//!
//! halo2curves only exposes its own projective type, so buckets are kept in extended
//! Jacobian coordinates (x = X/ZZ, y = Y/ZZZ, ZZ³ = ZZZ²) built directly on `C::Base`.
//! Formulas follow <https://www.hyperelliptic.org/EFD/g1p/auto-shortw-xyzz.html>.
use crate::errors::MsmError;
use ff::Field;
use halo2curves::CurveAffine;

/// A finite point in affine coordinates. The point at infinity is represented by `None`
/// wherever it can occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affine<C: CurveAffine> {
  /// x coordinate
  pub x: C::Base,
  /// y coordinate
  pub y: C::Base,
}

impl<C: CurveAffine> Affine<C> {
  /// Reads the coordinates of `p`, or `None` for the identity.
  #[inline]
  pub fn from_curve(p: &C) -> Option<Self> {
    // halo2curves reports the identity as (0, 0), which is not on the curve
    if bool::from(p.is_identity()) {
      return None;
    }
    let xy: Option<(C::Base, C::Base)> = p.coordinates().map(|c| (*c.x(), *c.y())).into();
    xy.map(|(x, y)| Self { x, y })
  }

  /// Rebuilds the curve point.
  pub fn to_curve(self) -> Result<C, MsmError> {
    Option::<C>::from(C::from_xy(self.x, self.y)).ok_or(MsmError::InternalError)
  }

  #[inline]
  pub(crate) fn neg(self) -> Self {
    Self {
      x: self.x,
      y: -self.y,
    }
  }
}

/// A point in extended Jacobian coordinates. `zz == 0` encodes the point at infinity.
#[derive(Clone, Copy, Debug)]
pub struct JacobianExtended<C: CurveAffine> {
  x: C::Base,
  y: C::Base,
  zz: C::Base,
  zzz: C::Base,
}

impl<C: CurveAffine> Default for JacobianExtended<C> {
  fn default() -> Self {
    Self::identity()
  }
}

impl<C: CurveAffine> From<Affine<C>> for JacobianExtended<C> {
  fn from(p: Affine<C>) -> Self {
    Self {
      x: p.x,
      y: p.y,
      zz: C::Base::ONE,
      zzz: C::Base::ONE,
    }
  }
}

impl<C: CurveAffine> JacobianExtended<C> {
  /// The point at infinity.
  pub fn identity() -> Self {
    Self {
      x: C::Base::ONE,
      y: C::Base::ONE,
      zz: C::Base::ZERO,
      zzz: C::Base::ZERO,
    }
  }

  /// Lifts a curve point.
  pub fn from_curve(p: &C) -> Self {
    Affine::from_curve(p).map_or_else(Self::identity, Self::from)
  }

  /// Returns true for the point at infinity.
  #[inline]
  pub fn is_identity(&self) -> bool {
    self.zz.is_zero_vartime()
  }

  /// Sets `self = self + q`.
  ///
  /// add-2008-s
  pub fn add_assign(&mut self, q: &Self) {
    if q.is_identity() {
      return;
    }
    if self.is_identity() {
      *self = *q;
      return;
    }

    let u1 = self.x * q.zz;
    let u2 = q.x * self.zz;
    let s1 = self.y * q.zzz;
    let s2 = q.y * self.zzz;
    let p = u2 - u1;
    let r = s2 - s1;

    if p.is_zero_vartime() {
      if r.is_zero_vartime() {
        *self = q.double();
      } else {
        *self = Self::identity();
      }
      return;
    }

    let pp = p.square();
    let ppp = p * pp;
    let q1 = u1 * pp;
    let v = s1 * ppp;

    let x3 = r.square() - ppp - q1.double();
    self.y = (q1 - x3) * r - v;
    self.x = x3;
    self.zz = self.zz * q.zz * pp;
    self.zzz = self.zzz * q.zzz * ppp;
  }

  /// Returns `[2]self`.
  ///
  /// dbl-2008-s-1; with ZZ = 0 the formula maps infinity to infinity.
  pub fn double(&self) -> Self {
    let u = self.y.double();
    let v = u.square();
    let w = u * v;
    let s = self.x * v;
    let xx = self.x.square();
    let m = xx.double() + xx + C::a() * self.zz.square();

    let x3 = m.square() - s.double();
    Self {
      y: m * (s - x3) - w * self.y,
      x: x3,
      zz: v * self.zz,
      zzz: w * self.zzz,
    }
  }

  /// Sets `self = self + a` for an affine `a`.
  ///
  /// madd-2008-s
  pub fn add_mixed(&mut self, a: &Affine<C>) {
    if self.is_identity() {
      *self = Self::from(*a);
      return;
    }

    let p = a.x * self.zz - self.x;
    let r = a.y * self.zzz - self.y;

    if p.is_zero_vartime() {
      if r.is_zero_vartime() {
        *self = Self::from(*a).double();
      } else {
        *self = Self::identity();
      }
      return;
    }

    let pp = p.square();
    let ppp = p * pp;
    let q = self.x * pp;

    let x3 = r.square() - ppp - q.double();
    self.y = (q - x3) * r - self.y * ppp;
    self.x = x3;
    self.zz *= pp;
    self.zzz *= ppp;
  }

  /// Sets `self = self - a` for an affine `a`.
  #[inline]
  pub fn sub_mixed(&mut self, a: &Affine<C>) {
    self.add_mixed(&a.neg());
  }

  /// Converts to affine with a single field inversion.
  pub fn to_affine(&self) -> Option<Affine<C>> {
    if self.is_identity() {
      return None;
    }
    // (ZZ·ZZZ)⁻¹·ZZZ = ZZ⁻¹ and (ZZ·ZZZ)⁻¹·ZZ = ZZZ⁻¹
    let inv: Option<C::Base> = (self.zz * self.zzz).invert().into();
    inv.map(|inv| self.scale(&inv))
  }

  /// Converts to the curve's affine type.
  pub fn to_curve_affine(&self) -> Result<C, MsmError> {
    match self.to_affine() {
      Some(p) => p.to_curve(),
      None => Ok(C::identity()),
    }
  }

  fn scale(&self, inv_zz_zzz: &C::Base) -> Affine<C> {
    Affine {
      x: self.x * (*inv_zz_zzz * self.zzz),
      y: self.y * (*inv_zz_zzz * self.zz),
    }
  }
}

/// Converts a batch of extended Jacobian points to curve points with one inversion
/// (Montgomery's trick).
pub fn batch_normalize<C: CurveAffine>(points: &[JacobianExtended<C>]) -> Result<Vec<C>, MsmError> {
  batch_to_affine(points)
    .into_iter()
    .map(|p| p.map_or_else(|| Ok(C::identity()), Affine::to_curve))
    .collect()
}

/// Same as [`batch_normalize`] but keeps the crate's affine representation.
pub(crate) fn batch_to_affine<C: CurveAffine>(
  points: &[JacobianExtended<C>],
) -> Vec<Option<Affine<C>>> {
  // prefix[i] = product of ZZ·ZZZ over the finite points before i
  let mut prefix = Vec::with_capacity(points.len());
  let mut acc = C::Base::ONE;
  for p in points {
    prefix.push(acc);
    if !p.is_identity() {
      acc *= p.zz * p.zzz;
    }
  }

  let inv: Option<C::Base> = acc.invert().into();
  let Some(mut inv) = inv else {
    // a finite point always has ZZ·ZZZ != 0
    return points.iter().map(JacobianExtended::to_affine).collect();
  };

  let mut out = vec![None; points.len()];
  for (i, p) in points.iter().enumerate().rev() {
    if p.is_identity() {
      continue;
    }
    let t = p.zz * p.zzz;
    out[i] = Some(p.scale(&(inv * prefix[i])));
    inv *= t;
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::{bls12_381::g1, pasta::pallas};
  use ff::Field;
  use group::{Curve, prime::PrimeCurveAffine};
  use rand_core::OsRng;

  fn random_points<C: CurveAffine>(n: usize) -> Vec<C> {
    (0..n)
      .map(|_| (C::generator() * C::Scalar::random(OsRng)).to_affine())
      .collect()
  }

  fn test_group_law_with<C: CurveAffine>() {
    let pts = random_points::<C>(3);
    let (a, b, c) = (pts[0], pts[1], pts[2]);
    let expected = (a.to_curve() + b + c).to_affine();

    // mixed additions
    let mut acc = JacobianExtended::from_curve(&a);
    acc.add_mixed(&Affine::from_curve(&b).unwrap());
    acc.add_mixed(&Affine::from_curve(&c).unwrap());
    assert_eq!(acc.to_curve_affine().unwrap(), expected);

    // full additions between non-normalized points
    let mut ab = JacobianExtended::from_curve(&a);
    ab.add_mixed(&Affine::from_curve(&b).unwrap());
    let mut cc = JacobianExtended::from_curve(&c).double();
    cc.sub_mixed(&Affine::from_curve(&c).unwrap());
    ab.add_assign(&cc);
    assert_eq!(ab.to_curve_affine().unwrap(), expected);

    // doubling
    let two_a = (a.to_curve() + a).to_affine();
    assert_eq!(JacobianExtended::from_curve(&a).double().to_curve_affine().unwrap(), two_a);
    let mut twice = JacobianExtended::from_curve(&a);
    twice.add_mixed(&Affine::from_curve(&a).unwrap());
    assert_eq!(twice.to_curve_affine().unwrap(), two_a);
    let mut twice = JacobianExtended::from_curve(&a).double();
    twice.sub_mixed(&Affine::from_curve(&a).unwrap());
    let mut again = twice;
    again.add_assign(&twice);
    assert_eq!(again.to_curve_affine().unwrap(), two_a);
  }

  #[test]
  fn test_group_law() {
    test_group_law_with::<g1::Affine>();
    test_group_law_with::<pallas::Affine>();
  }

  #[test]
  fn test_identity_handling() {
    let a = random_points::<g1::Affine>(1)[0];
    let pa = Affine::from_curve(&a).unwrap();

    assert!(Affine::<g1::Affine>::from_curve(&g1::Affine::identity()).is_none());
    assert!(JacobianExtended::<g1::Affine>::identity().double().is_identity());

    let mut p = JacobianExtended::from_curve(&a);
    p.sub_mixed(&pa);
    assert!(p.is_identity());
    assert!(bool::from(p.to_curve_affine().unwrap().is_identity()));

    let mut q = JacobianExtended::from_curve(&a).double();
    let mut neg = JacobianExtended::from(pa.neg()).double();
    q.add_assign(&JacobianExtended::identity());
    neg.add_assign(&q);
    assert!(neg.is_identity());
  }

  #[test]
  fn test_batch_normalize() {
    let g = g1::Point::generator();
    let mut points = Vec::new();
    let mut expected = Vec::new();
    let mut acc = JacobianExtended::<g1::Affine>::identity();
    for i in 0..10 {
      if i % 4 == 3 {
        points.push(JacobianExtended::identity());
        expected.push(g1::Affine::identity());
        continue;
      }
      acc = acc.double();
      acc.add_mixed(&Affine::from_curve(&g.to_affine()).unwrap());
      points.push(acc);
      expected.push(acc.to_curve_affine().unwrap());
    }
    assert_eq!(batch_normalize(&points).unwrap(), expected);
    assert!(batch_normalize::<g1::Affine>(&[]).unwrap().is_empty());
  }
}
