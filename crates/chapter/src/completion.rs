//! Per-child done flags and aggregate completion detection.

use content::Event;
use log::trace;

use crate::children::ChildRecord;

/// Outcome of feeding one scoring event to the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Not a completion signal (no event, no score, or no such child).
    Ignored,
    /// The child is done; others are still pending.
    Pending,
    /// The child is done and so is every other child.
    Complete,
}

/// Record a scoring event from child `index`.
pub fn track_scoring(records: &[ChildRecord], event: Option<&Event>, index: usize) -> Progress {
    let Some(event) = event else {
        return Progress::Ignored;
    };
    if event.score().is_none() {
        trace!(target: "chapter::completion", "child {index}: '{}' carries no score", event.name());
        return Progress::Ignored;
    }
    let Some(record) = records.get(index) else {
        trace!(
            target: "chapter::completion",
            "child {index} is out of range ({} slots)",
            records.len()
        );
        return Progress::Ignored;
    };

    record.mark_done();
    if all_done(records) {
        Progress::Complete
    } else {
        Progress::Pending
    }
}

pub fn all_done(records: &[ChildRecord]) -> bool {
    records.iter().all(ChildRecord::is_done)
}

/// Reset every child that supports it, then forget all progress.
pub fn reset(records: &[ChildRecord]) {
    for record in records {
        if let Some(unit) = record.instance() {
            unit.reset_task();
        }
        record.rearm();
    }
}
