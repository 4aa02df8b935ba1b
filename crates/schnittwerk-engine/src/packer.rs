// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The packing engine — a single left-to-right pass that partitions a
// document's pages into the fewest output slices that respect both the byte
// and the character budget.
//
// This is a greedy first-fit-by-arrival packer, not an optimal bin packer:
// page order must be preserved, so there is nothing to reorder and no
// backtracking. Slices are persisted as the pass goes; a write failure
// aborts the remainder and leaves earlier slices in place.

use std::path::{Path, PathBuf};

use schnittwerk_core::error::{Result, SchnittwerkError};
use schnittwerk_core::{SliceRange, SliceRecord, Thresholds};
use schnittwerk_document::PdfReader;
use tracing::{info, instrument, warn};

use crate::accumulator::SliceAccumulator;
use crate::measure::PageMeasurer;

/// Destination for finished slices.
///
/// Injectable so packing decisions are testable without touching disk.
pub trait SliceSink {
    /// Persist the pages in `range` as one output artifact, returning its
    /// path and on-disk byte size.
    fn persist(&mut self, range: SliceRange) -> Result<(PathBuf, u64)>;
}

/// Writes slices as `<stem>_<start>-<end>.pdf` beside the source file.
pub struct FsSliceSink<'a> {
    reader: &'a PdfReader,
    source: &'a Path,
}

impl<'a> FsSliceSink<'a> {
    pub fn new(reader: &'a PdfReader, source: &'a Path) -> Self {
        Self { reader, source }
    }
}

impl SliceSink for FsSliceSink<'_> {
    fn persist(&mut self, range: SliceRange) -> Result<(PathBuf, u64)> {
        let bytes = self
            .reader
            .extract_range(range)
            .map_err(|err| SchnittwerkError::SliceWrite(err.to_string()))?;

        let path = slice_path(self.source, range);
        std::fs::write(&path, &bytes).map_err(|err| {
            SchnittwerkError::SliceWrite(format!("{}: {}", path.display(), err))
        })?;

        Ok((path, bytes.len() as u64))
    }
}

/// Deterministic slice naming: `<stem>_<start>-<end>.pdf` in the source's
/// directory. Ranges are disjoint within a pass, so names cannot collide.
pub fn slice_path(source: &Path, range: SliceRange) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    source.with_file_name(format!("{stem}_{range}.pdf"))
}

/// Walk all pages once and persist bounded slices through `sink`.
///
/// Pages that fail to measure are excluded from the pass with a warning; the
/// open accumulator is flushed first so every written slice stays
/// contiguous. A page whose character count alone exceeds the budget is
/// emitted on its own, over budget, via the escape path — byte overflow
/// alone never does that.
///
/// Returns the records of every slice written. An empty result means the
/// caller must not delete the source.
#[instrument(skip_all, fields(total_pages = measurer.page_count()))]
pub fn pack<M: PageMeasurer, S: SliceSink>(
    measurer: &M,
    sink: &mut S,
    limits: &Thresholds,
) -> Result<Vec<SliceRecord>> {
    let total = measurer.page_count();
    info!(total_pages = total, "Starting packing pass");

    let mut slices: Vec<SliceRecord> = Vec::new();
    let mut acc = SliceAccumulator::new(1);

    for page in 1..=total {
        let cost = match measurer.measure(page) {
            Ok(cost) => cost,
            Err(err) => {
                warn!(page, %err, "Excluding unmeasurable page from this pass");
                if !acc.is_empty() {
                    slices.push(flush(sink, &acc)?);
                }
                acc = SliceAccumulator::new(page + 1);
                continue;
            }
        };

        if !acc.fits(&cost, limits) {
            if !acc.is_empty() {
                slices.push(flush(sink, &acc)?);
                acc = SliceAccumulator::new(page);
            }

            if cost.chars > limits.chars {
                warn!(
                    page,
                    chars = cost.chars,
                    limit = limits.chars,
                    "Page exceeds the character budget on its own"
                );
                let range = SliceRange::single(page);
                let (path, bytes) = sink.persist(range)?;
                warn!(
                    slice = %path.display(),
                    %range,
                    chars = cost.chars,
                    "Created oversized slice"
                );
                slices.push(SliceRecord {
                    path,
                    range,
                    bytes,
                    chars: cost.chars,
                    oversized: true,
                });
                acc = SliceAccumulator::new(page + 1);
                continue;
            }
        }

        acc.push(&cost);
    }

    if !acc.is_empty() {
        slices.push(flush(sink, &acc)?);
    }

    info!(slices = slices.len(), "Packing pass complete");
    Ok(slices)
}

/// Persist the accumulator's pages and turn them into a record.
fn flush<S: SliceSink>(sink: &mut S, acc: &SliceAccumulator) -> Result<SliceRecord> {
    let range = acc.range();
    let (path, bytes) = sink.persist(range)?;
    info!(
        slice = %path.display(),
        %range,
        size_mb = bytes as f64 / 1024.0 / 1024.0,
        chars = acc.chars_used(),
        "Created slice"
    );
    Ok(SliceRecord {
        path,
        range,
        bytes,
        chars: acc.chars_used(),
        oversized: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schnittwerk_core::PageCost;

    /// Fixture measurer: one entry per page, `None` marks an unmeasurable
    /// page.
    struct FakeMeasurer {
        costs: Vec<Option<PageCost>>,
    }

    impl FakeMeasurer {
        fn of_chars(chars: &[usize]) -> Self {
            Self {
                costs: chars
                    .iter()
                    .map(|&c| Some(PageCost { chars: c, bytes: 1 }))
                    .collect(),
            }
        }

        fn of_bytes(bytes: &[u64]) -> Self {
            Self {
                costs: bytes
                    .iter()
                    .map(|&b| Some(PageCost { chars: 1, bytes: b }))
                    .collect(),
            }
        }
    }

    impl PageMeasurer for FakeMeasurer {
        fn page_count(&self) -> u32 {
            self.costs.len() as u32
        }

        fn measure(&self, page_number: u32) -> Result<PageCost> {
            self.costs[(page_number - 1) as usize].ok_or_else(|| {
                SchnittwerkError::UnmeasurablePage {
                    page: page_number,
                    reason: "fixture".into(),
                }
            })
        }
    }

    /// Records persisted ranges; optionally fails the Nth persist call.
    #[derive(Default)]
    struct RecordingSink {
        written: Vec<SliceRange>,
        fail_on_call: Option<usize>,
    }

    impl SliceSink for RecordingSink {
        fn persist(&mut self, range: SliceRange) -> Result<(PathBuf, u64)> {
            if self.fail_on_call == Some(self.written.len()) {
                return Err(SchnittwerkError::SliceWrite("disk full".into()));
            }
            self.written.push(range);
            Ok((
                PathBuf::from(format!("slice_{range}.pdf")),
                1_000 * range.page_count() as u64,
            ))
        }
    }

    fn chars_only(limit: usize) -> Thresholds {
        Thresholds {
            bytes: u64::MAX,
            chars: limit,
        }
    }

    fn ranges(records: &[SliceRecord]) -> Vec<(u32, u32)> {
        records.iter().map(|r| (r.range.start, r.range.end)).collect()
    }

    #[test]
    fn packs_pages_in_pairs_under_char_budget() {
        let measurer = FakeMeasurer::of_chars(&[2_000; 10]);
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");

        assert_eq!(
            ranges(&records),
            vec![(1, 2), (3, 4), (5, 6), (7, 8), (9, 10)]
        );
        assert!(records.iter().all(|r| !r.oversized));
        assert!(records.iter().all(|r| r.chars == 4_000));
    }

    #[test]
    fn emitted_ranges_tile_the_document_in_order() {
        let measurer = FakeMeasurer::of_chars(&[900, 900, 900, 900, 900, 900, 900]);
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(2_000)).expect("pack");

        let mut expected_start = 1;
        for record in &records {
            assert_eq!(record.range.start, expected_start);
            expected_start = record.range.end + 1;
        }
        assert_eq!(expected_start, 8);
    }

    #[test]
    fn exact_fit_at_the_boundary_is_included() {
        let measurer = FakeMeasurer::of_chars(&[2_500, 2_500]);
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");
        assert_eq!(ranges(&records), vec![(1, 2)]);
    }

    #[test]
    fn one_char_over_the_boundary_splits() {
        let measurer = FakeMeasurer::of_chars(&[2_500, 2_501]);
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");
        assert_eq!(ranges(&records), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn char_oversized_page_ships_alone_and_is_flagged() {
        let measurer = FakeMeasurer::of_chars(&[1_000, 7_000, 1_000]);
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");

        assert_eq!(ranges(&records), vec![(1, 1), (2, 2), (3, 3)]);
        assert!(!records[0].oversized);
        assert!(records[1].oversized);
        assert_eq!(records[1].chars, 7_000);
        assert!(!records[2].oversized);
    }

    #[test]
    fn char_oversized_first_page_ships_alone() {
        let measurer = FakeMeasurer::of_chars(&[7_000, 1_000]);
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");

        assert_eq!(ranges(&records), vec![(1, 1), (2, 2)]);
        assert!(records[0].oversized);
    }

    #[test]
    fn byte_oversized_page_is_not_escaped() {
        // The escape path is for character overflow only: a page oversized in
        // bytes alone is appended to a fresh accumulator, which then exceeds
        // the byte budget until the next page flushes it.
        let measurer = FakeMeasurer::of_bytes(&[100, 9_999, 100]);
        let mut sink = RecordingSink::default();
        let limits = Thresholds {
            bytes: 1_000,
            chars: usize::MAX,
        };

        let records = pack(&measurer, &mut sink, &limits).expect("pack");

        assert_eq!(ranges(&records), vec![(1, 1), (2, 2), (3, 3)]);
        assert!(records.iter().all(|r| !r.oversized));
    }

    #[test]
    fn unmeasurable_page_is_excluded_and_slices_stay_contiguous() {
        let mut measurer = FakeMeasurer::of_chars(&[2_000, 2_000, 2_000]);
        measurer.costs[1] = None;
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");

        // Page 2 appears in no range; its neighbours are flushed around it.
        assert_eq!(ranges(&records), vec![(1, 1), (3, 3)]);
    }

    #[test]
    fn write_failure_aborts_but_keeps_earlier_slices() {
        let measurer = FakeMeasurer::of_chars(&[5_000, 5_000, 5_000, 5_000]);
        let mut sink = RecordingSink {
            fail_on_call: Some(1),
            ..RecordingSink::default()
        };

        let err = pack(&measurer, &mut sink, &chars_only(5_000)).expect_err("must fail");

        assert!(matches!(err, SchnittwerkError::SliceWrite(_)));
        assert_eq!(sink.written, vec![SliceRange::new(1, 1)]);
    }

    #[test]
    fn empty_document_produces_no_slices() {
        let measurer = FakeMeasurer { costs: Vec::new() };
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");
        assert!(records.is_empty());
        assert!(sink.written.is_empty());
    }

    #[test]
    fn everything_fits_in_one_slice() {
        let measurer = FakeMeasurer::of_chars(&[1_000, 1_000, 1_000]);
        let mut sink = RecordingSink::default();

        let records = pack(&measurer, &mut sink, &chars_only(5_000)).expect("pack");
        assert_eq!(ranges(&records), vec![(1, 3)]);
    }

    #[test]
    fn repeated_runs_produce_identical_partitions() {
        let measurer = FakeMeasurer::of_chars(&[3_000, 1_500, 2_200, 900, 4_800, 100]);

        let mut first_sink = RecordingSink::default();
        let first = pack(&measurer, &mut first_sink, &chars_only(5_000)).expect("pack");
        let mut second_sink = RecordingSink::default();
        let second = pack(&measurer, &mut second_sink, &chars_only(5_000)).expect("pack");

        assert_eq!(ranges(&first), ranges(&second));
        assert_eq!(first_sink.written, second_sink.written);
    }

    #[test]
    fn slice_path_embeds_stem_and_range() {
        let path = slice_path(Path::new("/inbox/report.pdf"), SliceRange::new(3, 7));
        assert_eq!(path, Path::new("/inbox/report_3-7.pdf"));
    }
}
