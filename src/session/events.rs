//! # Session Events
//!
//! Notifications raised by an [`ExportSession`](super::ExportSession) for the
//! presentation layer to react to.

use crate::history::HistoryEntry;
use crate::record::Record;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Criteria were applied; `records` is the filtered set drawn from `total` records
    FilterApplied { records: Vec<Record>, total: usize },
    /// An export finished and was logged
    ExportCompleted(HistoryEntry),
    /// A past export was picked from the history
    HistorySelected(HistoryEntry),
    /// The history was wiped
    HistoryCleared,
}
