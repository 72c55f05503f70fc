//! # Export History Store
//!
//! Bounded, newest-first log of completed exports, persisted as a single JSON
//! array in [`DurableStorage`]. The in-memory log is authoritative for the
//! session; persistence failures are logged and otherwise ignored.

pub mod storage;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::filter::FilterCriteria;
use crate::record::Field;

pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError};

pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_STORAGE_KEY: &str = "infojobs-export-history";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// Human-readable export time.
    pub date: String,
    pub filename: String,
    pub records: usize,
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterCriteria>,
}

/// A history entry before the store assigns its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub date: String,
    pub filename: String,
    pub records: usize,
    pub fields: Vec<Field>,
    pub filters: Option<FilterCriteria>,
}

impl HistoryEntry {
    fn matches(&self, term: &str) -> bool {
        self.filename.to_lowercase().contains(term)
            || self.date.to_lowercase().contains(term)
            || self.filters.as_ref().is_some_and(|filters| {
                filters
                    .keywords
                    .iter()
                    .any(|kw| kw.to_lowercase().contains(term))
            })
    }
}

pub struct ExportHistory {
    entries: Vec<HistoryEntry>,
    storage: Box<dyn DurableStorage>,
    key: String,
    capacity: usize,
    last_id: i64,
}

impl std::fmt::Debug for ExportHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportHistory")
            .field("entries", &self.entries.len())
            .field("storage", &"<dyn DurableStorage>")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl ExportHistory {
    pub fn open(storage: Box<dyn DurableStorage>) -> Self {
        Self::open_with(storage, DEFAULT_STORAGE_KEY, DEFAULT_CAPACITY)
    }

    /// Open the store and hydrate it from `storage`.
    ///
    /// A missing or corrupt blob yields an empty log.
    pub fn open_with(storage: Box<dyn DurableStorage>, key: &str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = match storage.read(key) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<HistoryEntry>>(&blob) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("discarding unreadable export history {key}: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("failed to load export history {key}: {err}");
                Vec::new()
            }
        };
        entries.truncate(capacity);
        // Ids ahead of the clock cannot come from this store and are not
        // used to seed the counter.
        let now = Utc::now().timestamp_millis();
        let last_id = entries
            .iter()
            .filter_map(|entry| entry.id.parse::<i64>().ok())
            .filter(|id| *id <= now)
            .max()
            .unwrap_or(0);
        debug!("export history loaded: {} entries", entries.len());
        Self {
            entries,
            storage,
            key: key.to_string(),
            capacity,
            last_id,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Prepend `entry`, trim to capacity, persist, and return the stored entry.
    pub fn append(&mut self, entry: NewHistoryEntry) -> HistoryEntry {
        let stored = HistoryEntry {
            id: self.next_id(),
            date: entry.date,
            filename: entry.filename,
            records: entry.records,
            fields: entry.fields,
            filters: entry.filters,
        };
        self.entries.insert(0, stored.clone());
        self.entries.truncate(self.capacity);
        self.persist();
        info!(
            "export history: recorded {} ({} records)",
            stored.filename, stored.records
        );
        stored
    }

    /// Drop the entry with `id`; unknown ids are ignored.
    pub fn remove(&mut self, id: &str) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() == before {
            debug!("export history: no entry with id {id}");
        }
        self.persist();
    }

    /// Empty the log and delete its persisted blob.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(err) = self.storage.remove(&self.key) {
            warn!("failed to remove export history {}: {err}", self.key);
        }
        info!("export history cleared");
    }

    /// Entries whose filename, date or keyword snapshot contains `term`
    /// (case-insensitive). An empty or absent term lists everything.
    pub fn list(&self, term: Option<&str>) -> Vec<&HistoryEntry> {
        let term = term.map(str::to_lowercase).unwrap_or_default();
        if term.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|entry| entry.matches(&term))
            .collect()
    }

    fn next_id(&mut self) -> String {
        let id = Utc::now()
            .timestamp_millis()
            .max(self.last_id.saturating_add(1));
        self.last_id = id;
        id.to_string()
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(StorageError::from)
            .and_then(|blob| self.storage.write(&self.key, &blob));
        if let Err(err) = result {
            warn!("failed to persist export history {}: {err}", self.key);
        }
    }
}

/// Short field summary: up to three names, then "y N más".
pub fn format_fields(fields: &[Field]) -> String {
    let names: Vec<&str> = fields.iter().map(|field| field.key()).collect();
    if names.len() <= 3 {
        return names.join(", ");
    }
    format!("{} y {} más", names[..3].join(", "), names.len() - 3)
}
