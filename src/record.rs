//! # Record Model
//!
//! Job-offer records and the fixed field enumeration that drives sorting and
//! CSV column order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record identifier as supplied by the data source (integer or string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Int(0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub url: String,
    /// Attributes outside the field enumeration, carried but never exported.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Raw string value of `field`; absent optional fields read as "".
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Company => &self.company,
            Field::Location => &self.location,
            Field::Description => self.description.as_deref().unwrap_or(""),
            Field::PublicationDate => self.publication_date.as_deref().unwrap_or(""),
            Field::Url => &self.url,
        }
    }

    /// Parsed publication instant, `None` when missing or unparsable.
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.publication_date.as_deref().and_then(parse_timestamp)
    }
}

/// Exportable and sortable attributes, in their canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Company,
    Location,
    Description,
    PublicationDate,
    Url,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Company,
        Field::Location,
        Field::Description,
        Field::PublicationDate,
        Field::Url,
    ];

    /// Fields offered as sort keys in the preview table.
    pub const SORTABLE: [Field; 4] = [
        Field::Title,
        Field::Company,
        Field::Location,
        Field::PublicationDate,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Company => "company",
            Field::Location => "location",
            Field::Description => "description",
            Field::PublicationDate => "publication_date",
            Field::Url => "url",
        }
    }

    /// Human-readable column header.
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Título",
            Field::Company => "Empresa",
            Field::Location => "Ubicación",
            Field::Description => "Descripción",
            Field::PublicationDate => "Fecha de publicación",
            Field::Url => "URL",
        }
    }

    pub fn is_sortable(self) -> bool {
        Self::SORTABLE.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| UnknownField(key.to_string()))
    }
}

/// Parse a publication timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (or space separated)
/// and a bare `YYYY-MM-DD`. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    let utc = FixedOffset::east_opt(0)?;
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.and_local_timezone(utc).single();
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(utc).single())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn deserializes_with_extension_fields() {
        let json = r#"{
            "id": 7,
            "title": "Administrativo",
            "company": "Gestiones SL",
            "location": "Barbastro",
            "publication_date": null,
            "url": "https://example.com/7",
            "salary": "20k",
            "remote": true
        }"#;
        let record: Record = serde_json::from_str(json).expect("record");
        assert_eq!(record.id, RecordId::Int(7));
        assert_eq!(record.description, None);
        assert_eq!(record.publication_date, None);
        assert_eq!(record.extra.get("salary"), Some(&serde_json::json!("20k")));
        assert_eq!(record.extra.len(), 2);
    }

    #[test]
    fn string_ids_are_accepted() {
        let record: Record = serde_json::from_str(r#"{"id": "abc-1"}"#).expect("record");
        assert_eq!(record.id.to_string(), "abc-1");
        assert_eq!(record.title, "");
    }

    #[test]
    fn absent_optional_fields_read_as_empty() {
        let record = Record::default();
        assert_eq!(record.value(Field::Description), "");
        assert_eq!(record.value(Field::PublicationDate), "");
        assert!(record.published_at().is_none());
    }

    #[test]
    fn parses_supported_timestamp_shapes() {
        let naive = parse_timestamp("2025-03-15T10:30:00").expect("naive");
        assert_eq!((naive.day(), naive.hour(), naive.minute()), (15, 10, 30));

        let offset = parse_timestamp("2025-03-15T10:30:00+02:00").expect("rfc3339");
        assert_eq!(offset.offset().local_minus_utc(), 7200);

        let date_only = parse_timestamp("2025-03-05").expect("date");
        assert_eq!((date_only.month(), date_only.day()), (3, 5));

        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("   ").is_none());
    }

    #[test]
    fn field_keys_round_trip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.key().parse::<Field>(), Ok(field));
        }
        assert_eq!(
            "salary".parse::<Field>(),
            Err(UnknownField("salary".to_string()))
        );
    }

    #[test]
    fn description_and_url_are_not_sortable() {
        assert!(Field::Title.is_sortable());
        assert!(Field::PublicationDate.is_sortable());
        assert!(!Field::Description.is_sortable());
        assert!(!Field::Url.is_sortable());
    }
}
