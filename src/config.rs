//! Configuration of the multi-scalar multiplication engine.
//!
//! [`MultiExpConfig`] is what callers hand to [`crate::msm::multi_exp`]. It is validated and
//! resolved into [`Settings`] before any work is scheduled, so the pipeline itself never fails.
use crate::errors::MsmError;
use rayon::current_num_threads;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for [`MultiExpConfig::nb_tasks`].
pub const MAX_NB_TASKS: usize = 1024;

/// Smallest window width the bucket method is run with.
pub const MIN_WINDOW: usize = 4;

/// Largest window width the bucket method is run with.
pub const MAX_WINDOW: usize = 16;

/// Options for [`crate::msm::multi_exp`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiExpConfig {
  /// Parallelism hint. `0` selects three tasks per worker thread of the current rayon pool.
  pub nb_tasks: usize,
  /// Forces the window width instead of letting the cost model choose it.
  pub window: Option<usize>,
  /// Per-window-width cutoffs that engage the batch-affine accelerator.
  pub batch_affine: BatchAffineThresholds,
}

impl MultiExpConfig {
  /// Returns a configuration with the given parallelism hint and default tuning.
  pub fn with_nb_tasks(nb_tasks: usize) -> Self {
    Self {
      nb_tasks,
      ..Self::default()
    }
  }

  /// Validates the configuration and fills in defaults.
  pub(crate) fn resolve(&self) -> Result<Settings, MsmError> {
    let nb_tasks = match self.nb_tasks {
      0 => (current_num_threads() * 3).min(MAX_NB_TASKS),
      n if n > MAX_NB_TASKS => {
        return Err(MsmError::InvalidConfig {
          reason: format!("nb_tasks = {n} exceeds {MAX_NB_TASKS}"),
        });
      }
      n => n,
    };

    if let Some(c) = self.window {
      if !(MIN_WINDOW..=MAX_WINDOW).contains(&c) {
        return Err(MsmError::InvalidConfig {
          reason: format!("window = {c} outside {MIN_WINDOW}..={MAX_WINDOW}"),
        });
      }
    }

    if let Some(c) = self.batch_affine.zero_entry() {
      return Err(MsmError::InvalidConfig {
        reason: format!("batch-affine threshold for window {c} is zero"),
      });
    }

    Ok(Settings {
      nb_tasks,
      window: self.window,
      batch_affine: self.batch_affine.clone(),
    })
  }
}

/// Validated form of [`MultiExpConfig`] threaded through the pipeline.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
  pub(crate) nb_tasks: usize,
  pub(crate) window: Option<usize>,
  pub(crate) batch_affine: BatchAffineThresholds,
}

impl Settings {
  /// The settings handed to each half of a recursive split.
  pub(crate) fn halved(&self) -> Self {
    Self {
      nb_tasks: self.nb_tasks.div_ceil(2),
      ..self.clone()
    }
  }
}

const TUNED_WIDTHS: usize = 7;
const FIRST_TUNED_WIDTH: usize = 10;

/// Number of distinct buckets a window has to touch before the batch-affine accelerator pays
/// for its inversions, for window widths 10 through 16.
///
/// Below width 10 the Jacobian-extended bucket method is always used. The threshold doubles as
/// the batch size of the accelerator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAffineThresholds {
  by_width: [usize; TUNED_WIDTHS],
}

impl Default for BatchAffineThresholds {
  fn default() -> Self {
    Self {
      by_width: [80, 150, 200, 350, 400, 500, 640],
    }
  }
}

impl BatchAffineThresholds {
  /// Builds a table from cutoffs for window widths 10, 11, .., 16.
  pub fn new(by_width: [usize; TUNED_WIDTHS]) -> Self {
    Self { by_width }
  }

  /// A table that never selects the accelerator.
  pub fn disabled() -> Self {
    Self {
      by_width: [usize::MAX; TUNED_WIDTHS],
    }
  }

  /// The cutoff for a window of width `c`, if the accelerator is available at that width.
  pub fn threshold(&self, c: usize) -> Option<usize> {
    c.checked_sub(FIRST_TUNED_WIDTH)
      .and_then(|i| self.by_width.get(i))
      .copied()
      .filter(|t| *t != usize::MAX)
  }

  fn zero_entry(&self) -> Option<usize> {
    self
      .by_width
      .iter()
      .position(|t| *t == 0)
      .map(|i| i + FIRST_TUNED_WIDTH)
  }
}
