//! # Filter Engine
//!
//! Reduces a record set to the records matching a [`FilterCriteria`].
//! Criteria are immutable values; every edit returns a new value.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::Record;

/// Upper bound of the "days ago" slider.
pub const MAX_DAYS_AGO: u32 = 30;

/// Inclusive window of "days ago" offsets from the current moment.
///
/// Serializes as a `[min, max]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct DateRange {
    min_days_ago: u32,
    max_days_ago: u32,
}

impl DateRange {
    /// Build a range, clamping both ends to `0..=MAX_DAYS_AGO` and ordering them.
    pub fn new(a: u32, b: u32) -> Self {
        let a = a.min(MAX_DAYS_AGO);
        let b = b.min(MAX_DAYS_AGO);
        Self {
            min_days_ago: a.min(b),
            max_days_ago: a.max(b),
        }
    }

    pub fn min_days_ago(&self) -> u32 {
        self.min_days_ago
    }

    pub fn max_days_ago(&self) -> u32 {
        self.max_days_ago
    }

    /// The full-range sentinel `(0, 30)` places no constraint on records.
    pub fn is_full(&self) -> bool {
        self.min_days_ago == 0 && self.max_days_ago == MAX_DAYS_AGO
    }

    /// Absolute `[min_date, max_date]` window relative to `now`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let min_date = now - Duration::days(i64::from(self.max_days_ago));
        let max_date = now - Duration::days(i64::from(self.min_days_ago));
        (min_date, max_date)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            min_days_ago: 0,
            max_days_ago: MAX_DAYS_AGO,
        }
    }
}

impl From<(u32, u32)> for DateRange {
    fn from((a, b): (u32, u32)) -> Self {
        DateRange::new(a, b)
    }
}

impl From<DateRange> for (u32, u32) {
    fn from(range: DateRange) -> Self {
        (range.min_days_ago, range.max_days_ago)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub title: String,
    pub company: String,
    pub location: String,
    pub date_range: DateRange,
    pub keywords: Vec<String>,
}

impl FilterCriteria {
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_company(self, company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_date_range(self, date_range: DateRange) -> Self {
        Self { date_range, ..self }
    }

    /// Add a keyword. Blank input and duplicates leave the criteria unchanged.
    #[must_use]
    pub fn with_keyword(self, keyword: &str) -> Self {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k == keyword) {
            return self;
        }
        let mut keywords = self.keywords.clone();
        keywords.push(keyword.to_string());
        Self { keywords, ..self }
    }

    #[must_use]
    pub fn without_keyword(self, keyword: &str) -> Self {
        let keywords = self
            .keywords
            .iter()
            .filter(|k| k.as_str() != keyword)
            .cloned()
            .collect();
        Self { keywords, ..self }
    }

    #[must_use]
    pub fn reset(self) -> Self {
        Self::default()
    }

    /// True when no constraint is active.
    pub fn is_default(&self) -> bool {
        self.title.is_empty()
            && self.company.is_empty()
            && self.location.is_empty()
            && self.date_range.is_full()
            && self.keywords.is_empty()
    }

    fn matches(&self, record: &Record, window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> bool {
        if !contains_ci(&record.title, &self.title)
            || !contains_ci(&record.company, &self.company)
            || !contains_ci(&record.location, &self.location)
        {
            return false;
        }

        if let Some((min_date, max_date)) = window {
            let Some(published) = record.published_at() else {
                return false;
            };
            let published = published.with_timezone(&Utc);
            if published < min_date || published > max_date {
                return false;
            }
        }

        if !self.keywords.is_empty() {
            let full_text = format!(
                "{} {} {}",
                record.title,
                record.company,
                record.description.as_deref().unwrap_or("")
            )
            .to_lowercase();
            return self
                .keywords
                .iter()
                .any(|keyword| full_text.contains(&keyword.to_lowercase()));
        }

        true
    }
}

/// Case-insensitive substring test; an empty needle always matches.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filtered records plus the size of the input they were drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub records: Vec<Record>,
    pub total: usize,
}

impl FilterOutcome {
    pub fn matched(&self) -> usize {
        self.records.len()
    }
}

pub fn apply_filters(records: &[Record], criteria: &FilterCriteria) -> FilterOutcome {
    apply_filters_at(records, criteria, Utc::now())
}

/// Apply `criteria` with the date window anchored at `now`.
///
/// Input order is preserved and the input is never modified.
pub fn apply_filters_at(
    records: &[Record],
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> FilterOutcome {
    let window = (!criteria.date_range.is_full()).then(|| criteria.date_range.window(now));
    let filtered: Vec<Record> = records
        .iter()
        .filter(|record| criteria.matches(record, window))
        .cloned()
        .collect();
    debug!(
        "filters applied: matched={} total={}",
        filtered.len(),
        records.len()
    );
    FilterOutcome {
        records: filtered,
        total: records.len(),
    }
}
