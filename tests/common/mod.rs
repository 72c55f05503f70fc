//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};

use offerexport::history::{ExportHistory, FileStorage, NewHistoryEntry};
use offerexport::record::{Field, Record, RecordId};

pub fn offer(
    id: i64,
    title: &str,
    company: &str,
    location: &str,
    description: &str,
    date: &str,
) -> Record {
    Record {
        id: RecordId::Int(id),
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        description: Some(description.to_string()),
        publication_date: Some(date.to_string()),
        url: format!("https://infojobs.net/oferta/{id}"),
        ..Default::default()
    }
}

/// Five offers published between 5 and 19 March 2025.
pub fn sample_offers() -> Vec<Record> {
    vec![
        offer(
            1,
            "Desarrollador Frontend",
            "TechCorp",
            "Huesca",
            "Experiencia en React y TypeScript",
            "2025-03-15T10:30:00",
        ),
        offer(
            2,
            "Administrativo",
            "Gestiones SL",
            "Barbastro",
            "Conocimientos de contabilidad y atención al cliente",
            "2025-03-18T09:15:00",
        ),
        offer(
            3,
            "Técnico de Mantenimiento",
            "Industrias Aragonesas",
            "Monzón",
            "Experiencia en mantenimiento industrial",
            "2025-03-10T14:45:00",
        ),
        offer(
            4,
            "Dependiente/a",
            "Comercio Local",
            "Binéfar",
            "Atención al cliente y gestión de inventario",
            "2025-03-19T11:20:00",
        ),
        offer(
            5,
            "Ingeniero/a Agrónomo",
            "AgroTech",
            "Graus",
            "Proyectos de innovación en agricultura",
            "2025-03-05T08:00:00",
        ),
    ]
}

/// Reference moment for date-window filtering.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0)
        .single()
        .expect("reference time")
}

pub fn open_history(dir: &Path) -> ExportHistory {
    let storage = FileStorage::open(dir).expect("file storage");
    ExportHistory::open(Box::new(storage))
}

pub fn history_entry(filename: &str, records: usize) -> NewHistoryEntry {
    NewHistoryEntry {
        date: "20/03/2025, 10:30:00".to_string(),
        filename: filename.to_string(),
        records,
        fields: Field::ALL.to_vec(),
        filters: None,
    }
}
