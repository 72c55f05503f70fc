//! # Sort/Paginate Engine
//!
//! Produces ordered, paged views of a record set for the preview table.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{Field, Record};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: Field,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: Field, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Same field flips direction, a new field starts ascending.
    #[must_use]
    pub fn toggle(self, field: Field) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(Field::PublicationDate, SortDirection::Desc)
    }
}

/// Ascending comparison of two records on `field`.
///
/// Publication dates compare as instants; missing or unparsable dates
/// collapse to the epoch and sort first. Everything else compares as text.
pub fn compare(a: &Record, b: &Record, field: Field) -> Ordering {
    match field {
        Field::PublicationDate => epoch_millis(a).cmp(&epoch_millis(b)),
        _ => a.value(field).cmp(b.value(field)),
    }
}

fn epoch_millis(record: &Record) -> i64 {
    record
        .published_at()
        .map(|ts| ts.timestamp_millis())
        .unwrap_or(0)
}

/// Return a sorted copy of `records`.
pub fn sort_records(records: &[Record], spec: SortSpec) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ord = compare(a, b, spec.field);
        match spec.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    sorted
}

/// `ceil(count / page_size)`; zero records give zero pages.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub records: Vec<Record>,
    pub page: usize,
    pub total_pages: usize,
    pub matched: usize,
}

impl PageView {
    /// Page count as shown to users, never below one.
    pub fn display_total_pages(&self) -> usize {
        self.total_pages.max(1)
    }
}

/// Sort `records` and cut out the 1-indexed `page`.
///
/// `page` is not validated here: a page outside `1..=total_pages` comes back
/// with no records and the requested page number. Navigation goes through
/// [`Pager`] or [`PreviewState`], which reject such pages and keep the
/// current one.
pub fn view(records: &[Record], spec: SortSpec, page: usize, page_size: usize) -> PageView {
    let page_size = page_size.max(1);
    let sorted = sort_records(records, spec);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let slice = if page == 0 {
        Vec::new()
    } else {
        sorted
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect()
    };
    PageView {
        records: slice,
        page,
        total_pages: total_pages(records.len(), page_size),
        matched: records.len(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Move to `page` if it lies in `1..=total_pages`. Returns whether it moved.
    pub fn go_to(&mut self, page: usize, total_pages: usize) -> bool {
        if page < 1 || page > total_pages {
            return false;
        }
        self.page = page;
        true
    }

    pub fn first(&mut self, total_pages: usize) -> bool {
        self.go_to(1, total_pages)
    }

    pub fn previous(&mut self, total_pages: usize) -> bool {
        self.go_to(self.page.saturating_sub(1), total_pages)
    }

    pub fn next(&mut self, total_pages: usize) -> bool {
        self.go_to(self.page + 1, total_pages)
    }

    pub fn last(&mut self, total_pages: usize) -> bool {
        self.go_to(total_pages, total_pages)
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Preview-table rendering of the publication date: `dd/mm/YYYY HH:MM`.
pub fn display_timestamp(record: &Record) -> String {
    record
        .published_at()
        .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_default()
}

/// Free-text preview search over title, company, location and description.
pub fn matches_search(record: &Record, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    [
        Field::Title,
        Field::Company,
        Field::Location,
        Field::Description,
    ]
    .into_iter()
    .any(|field| record.value(field).to_lowercase().contains(&term))
}

/// Preview table state: search term, sort and current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    search: String,
    sort: SortSpec,
    pager: Pager,
}

impl PreviewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            pager: Pager::new(page_size),
            ..Self::default()
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.pager.reset();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn toggle_sort(&mut self, field: Field) {
        self.sort = self.sort.toggle(field);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
    }

    /// Navigate to `page` against the current `records`; out-of-range is a no-op.
    pub fn go_to(&mut self, records: &[Record], page: usize) -> bool {
        let pages = total_pages(self.searched(records).len(), self.pager.page_size());
        self.pager.go_to(page, pages)
    }

    pub fn render(&self, records: &[Record]) -> PageView {
        let searched = self.searched(records);
        view(&searched, self.sort, self.pager.page(), self.pager.page_size())
    }

    fn searched(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|record| matches_search(record, &self.search))
            .cloned()
            .collect()
    }
}
