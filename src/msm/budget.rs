// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the Spartan2 project.
// See the LICENSE file in the project root for full license information.
// Source repository: https://github.com/Microsoft/Spartan2

//! Counting semaphore bounding how many chunk workers run at once.
use std::sync::{Condvar, Mutex, PoisonError};

/// Pool of permits shared by the chunk workers of one MSM level.
#[derive(Debug)]
pub(crate) struct TaskBudget {
  available: Mutex<usize>,
  released: Condvar,
}

/// A held permit; returned to the budget on drop.
#[derive(Debug)]
pub(crate) struct Permit<'a> {
  budget: &'a TaskBudget,
}

impl TaskBudget {
  pub(crate) fn new(permits: usize) -> Self {
    Self {
      available: Mutex::new(permits),
      released: Condvar::new(),
    }
  }

  /// Adds one permit, for a chunk that is processed as two halves.
  pub(crate) fn grant(&self) {
    self.release();
  }

  /// Blocks until a permit is free.
  ///
  /// Permits must only be held by leaf computations that never wait on other tasks.
  pub(crate) fn acquire(&self) -> Permit<'_> {
    let guard = self.available.lock().unwrap_or_else(PoisonError::into_inner);
    let mut available = self
      .released
      .wait_while(guard, |n| *n == 0)
      .unwrap_or_else(PoisonError::into_inner);
    *available -= 1;
    Permit { budget: self }
  }

  fn release(&self) {
    let mut available = self.available.lock().unwrap_or_else(PoisonError::into_inner);
    *available += 1;
    self.released.notify_one();
  }
}

impl Drop for Permit<'_> {
  fn drop(&mut self) {
    self.budget.release();
  }
}

/// Runs `f` under a permit of `budget`, if there is one.
pub(crate) fn run_with<T>(budget: Option<&TaskBudget>, f: impl FnOnce() -> T) -> T {
  let _permit = budget.map(TaskBudget::acquire);
  f()
}
