//! Diesel ORM models for the `summary` table.

use diesel::prelude::*;

use super::parse_datetime;
use crate::models::SummaryRecord;
use crate::schema;

/// Summary row from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::summary)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SummaryRow {
    pub id: i32,
    pub filename: String,
    pub title: Option<String>,
    pub pdf_text: Option<String>,
    pub short_summary: Option<String>,
    pub brief_summary: Option<String>,
    pub detailed_summary: Option<String>,
    pub page_count: Option<i32>,
    pub created_at: String,
}

/// New summary row for insertion. The id is assigned by the database.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::summary)]
pub struct NewSummary<'a> {
    pub filename: &'a str,
    pub title: Option<&'a str>,
    pub pdf_text: Option<&'a str>,
    pub short_summary: Option<&'a str>,
    pub brief_summary: Option<&'a str>,
    pub detailed_summary: Option<&'a str>,
    pub page_count: Option<i32>,
    pub created_at: &'a str,
}

impl<'a> NewSummary<'a> {
    /// Copy every column of an existing record, letting the target assign a new id.
    pub fn from_record(record: &'a SummaryRecord, title: &'a str, created_at: &'a str) -> Self {
        Self {
            filename: &record.filename,
            title: Some(title),
            pdf_text: record.pdf_text.as_deref(),
            short_summary: record.short_summary.as_deref(),
            brief_summary: record.brief_summary.as_deref(),
            detailed_summary: record.detailed_summary.as_deref(),
            page_count: record.page_count,
            created_at,
        }
    }
}

impl From<SummaryRow> for SummaryRecord {
    fn from(row: SummaryRow) -> Self {
        SummaryRecord {
            id: row.id,
            filename: row.filename,
            title: row.title,
            pdf_text: row.pdf_text,
            short_summary: row.short_summary,
            brief_summary: row.brief_summary,
            detailed_summary: row.detailed_summary,
            page_count: row.page_count,
            created_at: parse_datetime(&row.created_at),
        }
    }
}
