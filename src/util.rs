//! # Utility Module
//!
//! Glue between command-line arguments and the library types, plus the file
//! helpers the binary needs.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::cli::{DateFormatArg, DelimiterArg, FilterArgs, SortFieldArg};
use crate::export::{DateFormat, Delimiter, FieldSelection};
use crate::filter::{DateRange, FilterCriteria};
use crate::record::{Field, Record};

pub fn delimiter_from_cli(arg: DelimiterArg) -> Delimiter {
    match arg {
        DelimiterArg::Comma => Delimiter::Comma,
        DelimiterArg::Semicolon => Delimiter::Semicolon,
        DelimiterArg::Tab => Delimiter::Tab,
        DelimiterArg::Pipe => Delimiter::Pipe,
    }
}

pub fn date_format_from_cli(arg: DateFormatArg) -> DateFormat {
    match arg {
        DateFormatArg::Dmy => DateFormat::DayMonthYear,
        DateFormatArg::Mdy => DateFormat::MonthDayYear,
        DateFormatArg::Ymd => DateFormat::YearMonthDay,
    }
}

pub fn sort_field_from_cli(arg: SortFieldArg) -> Field {
    match arg {
        SortFieldArg::Title => Field::Title,
        SortFieldArg::Company => Field::Company,
        SortFieldArg::Location => Field::Location,
        SortFieldArg::PublicationDate => Field::PublicationDate,
    }
}

/// Parse `MIN-MAX` into a clamped [`DateRange`].
pub fn parse_days(raw: &str) -> Result<DateRange> {
    let (min, max) = raw
        .split_once('-')
        .ok_or_else(|| anyhow!("expected MIN-MAX, got {raw:?}"))?;
    let min: u32 = min.trim().parse().with_context(|| format!("bad day count {min:?}"))?;
    let max: u32 = max.trim().parse().with_context(|| format!("bad day count {max:?}"))?;
    Ok(DateRange::new(min, max))
}

pub fn criteria_from_cli(args: &FilterArgs) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::default()
        .with_title(args.title.clone().unwrap_or_default())
        .with_company(args.company.clone().unwrap_or_default())
        .with_location(args.location.clone().unwrap_or_default());
    if let Some(days) = args.days.as_deref() {
        criteria = criteria.with_date_range(parse_days(days)?);
    }
    for keyword in &args.keywords {
        criteria = criteria.with_keyword(keyword);
    }
    Ok(criteria)
}

/// Build a field selection from raw keys; unknown keys are reported and skipped.
pub fn selection_from_keys(keys: Option<&[String]>) -> (FieldSelection, Vec<String>) {
    let Some(keys) = keys else {
        return (FieldSelection::all(), Vec::new());
    };
    let mut selection = FieldSelection::none();
    let mut unknown = Vec::new();
    for key in keys {
        match key.parse::<Field>() {
            Ok(field) => selection.set(field, true),
            Err(err) => unknown.push(err.0),
        }
    }
    (selection, unknown)
}

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read records from {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&text)
        .with_context(|| format!("parse records from {}", path.display()))?;
    debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Create the export directory if needed; an existing non-directory is an error.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(anyhow!(
            "output path is not a directory: {}",
            path.display()
        ));
    }
    std::fs::create_dir_all(path)
        .with_context(|| format!("create output directory {}", path.display()))?;
    debug!("export directory ready: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_day_windows() {
        let range = parse_days("3-10").expect("range");
        assert_eq!((range.min_days_ago(), range.max_days_ago()), (3, 10));
        assert!(parse_days("0 - 30").expect("full").is_full());
        assert!(parse_days("10").is_err());
        assert!(parse_days("a-b").is_err());
    }

    #[test]
    fn builds_criteria_from_args() {
        let args = FilterArgs {
            title: Some("dev".to_string()),
            days: Some("0-7".to_string()),
            keywords: vec!["react".to_string(), "react".to_string()],
            ..Default::default()
        };
        let criteria = criteria_from_cli(&args).expect("criteria");
        assert_eq!(criteria.title, "dev");
        assert_eq!(criteria.date_range, DateRange::new(0, 7));
        assert_eq!(criteria.keywords, vec!["react".to_string()]);
    }

    #[test]
    fn selection_reports_unknown_keys() {
        let keys = vec!["url".to_string(), "salary".to_string(), "title".to_string()];
        let (selection, unknown) = selection_from_keys(Some(&keys));
        assert_eq!(selection.fields(), vec![Field::Title, Field::Url]);
        assert_eq!(unknown, vec!["salary".to_string()]);
        assert!(selection_from_keys(None).0.is_all());
    }

    #[test]
    fn loads_records_from_json() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("offers.json");
        std::fs::write(&path, r#"[{"id":1,"title":"Dev"},{"id":"x2","title":"Ops"}]"#)
            .expect("write");
        let records = load_records(&path).expect("records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Ops");
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempdir().expect("tempdir");
        let out = dir.path().join("nested").join("out");
        ensure_output_dir(&out).expect("ensure");
        assert!(out.is_dir());
        ensure_output_dir(&out).expect("existing directory");

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").expect("write");
        assert!(ensure_output_dir(&file).is_err());
    }
}
