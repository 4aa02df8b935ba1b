// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// schnittwerk-engine — The slicing core: threshold classification, per-page
// measurement, dual-budget page packing, and the per-file intake pipeline.

pub mod accumulator;
pub mod classify;
pub mod intake;
pub mod measure;
pub mod packer;

#[cfg(test)]
pub(crate) mod testutil;

pub use accumulator::SliceAccumulator;
pub use classify::needs_splitting;
pub use intake::{IntakeController, IntakeOutcome};
pub use measure::{PageMeasurer, PdfPageMeasurer};
pub use packer::{FsSliceSink, SliceSink, pack};
