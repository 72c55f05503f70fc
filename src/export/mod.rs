pub mod csv;

use std::collections::BTreeSet;
use std::string::FromUtf8Error;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::Field;

pub const CSV_MIME: &str = "text/csv;charset=utf-8";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no records to export")]
    EmptyRecordSet,
    #[error("select at least one field to export")]
    EmptyFieldSelection,
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoded output is not utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

impl ExportError {
    /// Validation failures the user can fix, as opposed to encoder faults.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExportError::EmptyRecordSet | ExportError::EmptyFieldSelection
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
            Delimiter::Pipe => b'|',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    /// `DD/MM/YYYY`
    #[default]
    #[serde(rename = "dmy", alias = "DD/MM/YYYY")]
    DayMonthYear,
    /// `MM/DD/YYYY`
    #[serde(rename = "mdy", alias = "MM/DD/YYYY")]
    MonthDayYear,
    /// `YYYY-MM-DD`
    #[serde(rename = "ymd", alias = "YYYY-MM-DD")]
    YearMonthDay,
}

impl DateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
            DateFormat::YearMonthDay => "%Y-%m-%d",
        }
    }
}

/// Set of fields chosen for export. Iteration always follows [`Field::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    selected: BTreeSet<Field>,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self {
            selected: Field::ALL.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }

    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            selected: fields.into_iter().collect(),
        }
    }

    pub fn contains(&self, field: Field) -> bool {
        self.selected.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_all(&self) -> bool {
        Field::ALL.iter().all(|field| self.selected.contains(field))
    }

    pub fn set(&mut self, field: Field, selected: bool) {
        if selected {
            self.selected.insert(field);
        } else {
            self.selected.remove(&field);
        }
    }

    pub fn toggle(&mut self, field: Field) {
        let selected = !self.contains(field);
        self.set(field, selected);
    }

    /// Deselect everything when all fields are selected, otherwise select all.
    pub fn toggle_all(&mut self) {
        *self = if self.is_all() { Self::none() } else { Self::all() };
    }

    /// Selected fields in canonical column order.
    pub fn fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.selected.contains(field))
            .collect()
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub delimiter: Delimiter,
    pub include_headers: bool,
    pub date_format: DateFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            include_headers: true,
            date_format: DateFormat::DayMonthYear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportConfig {
    pub fields: FieldSelection,
    pub options: ExportOptions,
}

/// Encoded CSV ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub content: String,
    pub rows: usize,
}

/// `<base>_<YYYYMMDD>_<HHmm>.csv`
pub fn export_filename<Tz: TimeZone>(base: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{base}_{}.csv", now.format("%Y%m%d_%H%M"))
}

/// Validate, encode and name an export of `records`.
pub fn export_records(
    records: &[crate::record::Record],
    config: &ExportConfig,
    base: &str,
    now: DateTime<Local>,
) -> Result<ExportFile, ExportError> {
    let content = csv::encode(records, &config.fields, &config.options)?;
    Ok(ExportFile {
        filename: export_filename(base, &now),
        mime: CSV_MIME,
        content,
        rows: records.len(),
    })
}
