// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Depreciation engine: parameter resolution, the single-period calculator,
//! batch scheduling and fiscal-year rollover of parameter sets.

pub mod calculator;
pub mod resolver;
pub mod rollover;
pub mod scheduler;

pub use calculator::{compute_entry, compute_from_opening};
pub use resolver::resolve;
pub use rollover::{CopySummary, copy_year};
pub use scheduler::{
    BatchMode, BatchOutcome, BatchRequest, CalculationResponse, calculate_batch, preview_entry,
    run_batch,
};
