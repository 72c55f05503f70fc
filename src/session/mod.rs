//! # Export Session
//!
//! Wires a record set to the filter, preview, export and history components.
//! The history store is injected by reference and shared with whoever else
//! needs it.

pub mod events;

use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::export::{self, ExportConfig, ExportError, ExportFile, FieldSelection};
use crate::filter::{self, FilterCriteria};
use crate::history::{ExportHistory, HistoryEntry, NewHistoryEntry};
use crate::record::Record;
use crate::view::{PageView, PreviewState};

pub use events::SessionEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub file: ExportFile,
    pub entry: HistoryEntry,
}

#[derive(Debug)]
pub struct ExportSession<'h> {
    records: Vec<Record>,
    criteria: FilterCriteria,
    filtered: Vec<Record>,
    history: &'h mut ExportHistory,
    filename_base: String,
    events: Vec<SessionEvent>,
}

impl<'h> ExportSession<'h> {
    pub fn new(records: Vec<Record>, history: &'h mut ExportHistory, filename_base: &str) -> Self {
        Self {
            filtered: records.clone(),
            records,
            criteria: FilterCriteria::default(),
            history,
            filename_base: filename_base.to_string(),
            events: Vec::new(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filtered(&self) -> &[Record] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn history(&self) -> &ExportHistory {
        self.history
    }

    /// Replace the record set; the filtered view resets to the full set.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.filtered = records.clone();
        self.records = records;
        self.criteria = FilterCriteria::default();
    }

    pub fn apply_filters(&mut self, criteria: FilterCriteria) -> &[Record] {
        self.apply_filters_at(criteria, Utc::now())
    }

    pub fn apply_filters_at(&mut self, criteria: FilterCriteria, now: DateTime<Utc>) -> &[Record] {
        let outcome = filter::apply_filters_at(&self.records, &criteria, now);
        info!(
            "filter applied: {} of {} records",
            outcome.matched(),
            outcome.total
        );
        self.events.push(SessionEvent::FilterApplied {
            records: outcome.records.clone(),
            total: outcome.total,
        });
        self.criteria = criteria;
        self.filtered = outcome.records;
        &self.filtered
    }

    pub fn preview(&self, state: &PreviewState) -> PageView {
        state.render(&self.filtered)
    }

    pub fn export(&mut self, config: &ExportConfig) -> Result<ExportOutcome, ExportError> {
        self.export_at(config, Local::now())
    }

    /// Export the filtered set and log it. Validation failures leave the
    /// history untouched.
    pub fn export_at(
        &mut self,
        config: &ExportConfig,
        now: DateTime<Local>,
    ) -> Result<ExportOutcome, ExportError> {
        let file = export::export_records(&self.filtered, config, &self.filename_base, now)?;
        let filters = (!self.criteria.is_default()).then(|| self.criteria.clone());
        let entry = self.history.append(NewHistoryEntry {
            date: now.format("%d/%m/%Y, %H:%M:%S").to_string(),
            filename: file.filename.clone(),
            records: file.rows,
            fields: config.fields.fields(),
            filters,
        });
        info!("exported {} records to {}", file.rows, file.filename);
        self.events
            .push(SessionEvent::ExportCompleted(entry.clone()));
        Ok(ExportOutcome { file, entry })
    }

    /// Recall a past export: re-applies its filter snapshot and returns the
    /// entry together with its field selection.
    pub fn select_from_history(&mut self, id: &str) -> Option<(HistoryEntry, FieldSelection)> {
        self.select_from_history_at(id, Utc::now())
    }

    pub fn select_from_history_at(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Option<(HistoryEntry, FieldSelection)> {
        let entry = self.history.get(id)?.clone();
        let criteria = entry.filters.clone().unwrap_or_default();
        self.apply_filters_at(criteria, now);
        let fields = FieldSelection::from_fields(entry.fields.iter().copied());
        self.events
            .push(SessionEvent::HistorySelected(entry.clone()));
        Some((entry, fields))
    }

    pub fn remove_from_history(&mut self, id: &str) {
        self.history.remove(id);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.events.push(SessionEvent::HistoryCleared);
    }

    /// Drain pending events in the order they were raised.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Delimiter, ExportOptions};
    use crate::history::MemoryStorage;
    use crate::record::{Field, RecordId};
    use chrono::TimeZone;

    fn records() -> Vec<Record> {
        ["Desarrollador", "Administrativo", "Técnico"]
            .iter()
            .enumerate()
            .map(|(i, title)| Record {
                id: RecordId::Int(i as i64 + 1),
                title: title.to_string(),
                company: "Acme".to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn local_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 20, 10, 30, 0)
            .single()
            .expect("local time")
    }

    #[test]
    fn export_logs_history_with_filter_snapshot() {
        let mut history = ExportHistory::open(Box::new(MemoryStorage::new()));
        let mut session = ExportSession::new(records(), &mut history, "ofertas");
        session.apply_filters(FilterCriteria::default().with_title("des"));

        let config = ExportConfig {
            fields: FieldSelection::from_fields([Field::Title]),
            options: ExportOptions {
                delimiter: Delimiter::Comma,
                include_headers: false,
                date_format: Default::default(),
            },
        };
        let outcome = session.export_at(&config, local_now()).expect("export");
        assert_eq!(outcome.file.content, "Desarrollador");
        assert_eq!(outcome.file.filename, "ofertas_20250320_1030.csv");
        assert_eq!(outcome.entry.records, 1);
        assert_eq!(outcome.entry.fields, vec![Field::Title]);
        assert_eq!(
            outcome.entry.filters.as_ref().map(|f| f.title.as_str()),
            Some("des")
        );

        let filtered = session.filtered().to_vec();
        assert_eq!(filtered.len(), 1);
        let events = session.take_events();
        assert_eq!(
            events,
            vec![
                SessionEvent::FilterApplied {
                    records: filtered,
                    total: 3
                },
                SessionEvent::ExportCompleted(outcome.entry.clone()),
            ]
        );
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn rejected_export_is_not_logged() {
        let mut history = ExportHistory::open(Box::new(MemoryStorage::new()));
        let mut session = ExportSession::new(records(), &mut history, "ofertas");
        session.apply_filters(FilterCriteria::default().with_title("nothing matches"));
        let err = session
            .export_at(&ExportConfig::default(), local_now())
            .expect_err("empty set");
        assert!(err.is_validation());
        assert!(session.history().is_empty());
    }

    #[test]
    fn selecting_history_restores_filters_and_fields() {
        let mut history = ExportHistory::open(Box::new(MemoryStorage::new()));
        let mut session = ExportSession::new(records(), &mut history, "ofertas");
        session.apply_filters(FilterCriteria::default().with_title("técnico"));
        let config = ExportConfig {
            fields: FieldSelection::from_fields([Field::Title, Field::Company]),
            ..Default::default()
        };
        let outcome = session.export_at(&config, local_now()).expect("export");

        session.apply_filters(FilterCriteria::default());
        assert_eq!(session.filtered().len(), 3);

        let (entry, fields) = session
            .select_from_history(&outcome.entry.id)
            .expect("entry");
        assert_eq!(entry, outcome.entry);
        assert_eq!(fields.fields(), vec![Field::Title, Field::Company]);
        assert_eq!(session.filtered().len(), 1);
        assert!(session.select_from_history("missing").is_none());
    }

    #[test]
    fn clear_history_raises_event() {
        let mut history = ExportHistory::open(Box::new(MemoryStorage::new()));
        let mut session = ExportSession::new(records(), &mut history, "ofertas");
        session
            .export_at(&ExportConfig::default(), local_now())
            .expect("export");
        session.take_events();
        session.clear_history();
        assert_eq!(session.take_events(), vec![SessionEvent::HistoryCleared]);
        assert!(session.history().is_empty());
    }

    #[test]
    fn replacing_records_resets_filtered_view() {
        let mut history = ExportHistory::open(Box::new(MemoryStorage::new()));
        let mut session = ExportSession::new(records(), &mut history, "ofertas");
        session.apply_filters(FilterCriteria::default().with_title("des"));
        assert_eq!(session.filtered().len(), 1);
        session.set_records(records());
        assert_eq!(session.filtered().len(), 3);
        assert!(session.criteria().is_default());
    }
}
