// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Threshold classification.

use schnittwerk_core::Thresholds;

/// Whether a document must be split at all.
///
/// True iff either budget is strictly exceeded — a document sitting exactly
/// at a threshold is left alone. Pure comparison; obtaining the numbers is
/// the caller's job.
pub fn needs_splitting(byte_size: u64, char_count: usize, limits: &Thresholds) -> bool {
    byte_size > limits.bytes || char_count > limits.chars
}
