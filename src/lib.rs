// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! This library implements multi-scalar multiplication (MSM) over pairing-friendly curves.
//!
//! The main entry point is [`msm::multi_exp`], a parallel Pippenger bucket method with signed
//! window digits, a cost model that picks the window width and decides whether to split the
//! input, load-balanced chunk workers and a batch-affine accelerator for wide windows.
//! [`msm::multi_exp_small_d`] and [`msm::multi_exp_large_d`] cover small sets of base points
//! that are reused across many scalar vectors.
#![deny(
  warnings,
  unused,
  future_incompatible,
  nonstandard_style,
  rust_2018_idioms,
  missing_docs
)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
#![forbid(unsafe_code)]

// public modules
pub mod config;
pub mod errors;
pub mod msm;
pub mod provider;
pub mod traits;

/// Start a span + timer, return `(Span, Instant)`.
macro_rules! start_span {
    ($name:expr $(, $($fmt:tt)+)?) => {{
        let span       = info_span!($name $(, $($fmt)+)?);
        let span_clone = span.clone();    // lives as long as the guard
        let _guard      = span_clone.enter();
        (span, Instant::now())
    }};
}
pub(crate) use start_span;

pub use config::{BatchAffineThresholds, MultiExpConfig};
pub use errors::MsmError;
