//! This module defines errors returned by the library.
use core::fmt::Debug;
use thiserror::Error;

/// Errors returned by the multi-scalar multiplication routines
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum MsmError {
  /// returned if the number of points and the number of scalars differ
  #[error("LengthMismatch: {points} points, {scalars} scalars")]
  LengthMismatch {
    /// The number of points supplied
    points: usize,
    /// The number of scalars supplied
    scalars: usize,
  },
  /// returned if the supplied configuration is out of range
  #[error("InvalidConfig: {reason}")]
  InvalidConfig {
    /// The reason the configuration was rejected
    reason: String,
  },
  /// returned if a subset-sum table is requested for too many base points
  #[error("TableTooLarge: {actual} points, at most {max} supported")]
  TableTooLarge {
    /// The number of base points supplied
    actual: usize,
    /// The maximum number of base points a table can hold
    max: usize,
  },
  /// returned if an accumulated point cannot be mapped back onto the curve
  #[error("InternalError")]
  InternalError,
}
