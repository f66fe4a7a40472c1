//! Summary repository.
//!
//! Every query is written once with the Diesel DSL and dispatched to the
//! configured backend through [`with_conn!`](crate::with_conn).

use std::path::Path;

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewSummary, SummaryRow};
use super::pool::{DbError, DbPool};
use crate::models::{SummaryRecord, SummaryTier};
use crate::schema::summary;
use crate::with_conn;

/// Repository over the `summary` table.
#[derive(Clone)]
pub struct SummaryRepository {
    pool: DbPool,
}

impl SummaryRepository {
    /// Create a new repository with an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly uploaded document and return its assigned id.
    pub async fn create(
        &self,
        filename: &str,
        title: &str,
        pdf_text: &str,
        page_count: i32,
    ) -> Result<i32, DbError> {
        let created_at = Utc::now().to_rfc3339();
        let row = NewSummary {
            filename,
            title: Some(title),
            pdf_text: Some(pdf_text),
            short_summary: None,
            brief_summary: None,
            detailed_summary: None,
            page_count: Some(page_count),
            created_at: &created_at,
        };
        self.insert(&row).await
    }

    /// Insert a record copied from another database, keeping its stored values.
    ///
    /// A missing or empty title is replaced by the filename without its
    /// extension.
    pub async fn insert_copy(&self, record: &SummaryRecord) -> Result<i32, DbError> {
        let created_at = record.created_at.to_rfc3339();
        let title = match record.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => filename_stem(&record.filename),
        };
        self.insert(&NewSummary::from_record(record, &title, &created_at))
            .await
    }

    async fn insert(&self, row: &NewSummary<'_>) -> Result<i32, DbError> {
        with_conn!(self.pool, conn => {
            diesel::insert_into(summary::table)
                .values(row)
                .returning(summary::id)
                .get_result::<i32>(&mut conn)
                .await
        })
    }

    /// Get a record by id.
    pub async fn get(&self, id: i32) -> Result<Option<SummaryRecord>, DbError> {
        with_conn!(self.pool, conn => {
            summary::table
                .find(id)
                .select(SummaryRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map(|row| row.map(SummaryRecord::from))
        })
    }

    /// Most recent records, newest id first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<SummaryRecord>, DbError> {
        with_conn!(self.pool, conn => {
            summary::table
                .order(summary::id.desc())
                .limit(limit)
                .select(SummaryRow::as_select())
                .load(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(SummaryRecord::from).collect())
        })
    }

    /// A page of records in id order, for bulk copies.
    pub async fn page_after(&self, after_id: i32, limit: i64) -> Result<Vec<SummaryRecord>, DbError> {
        with_conn!(self.pool, conn => {
            summary::table
                .filter(summary::id.gt(after_id))
                .order(summary::id.asc())
                .limit(limit)
                .select(SummaryRow::as_select())
                .load(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(SummaryRecord::from).collect())
        })
    }

    /// Count all records.
    pub async fn count(&self) -> Result<u64, DbError> {
        use diesel::dsl::count_star;
        with_conn!(self.pool, conn => {
            let count: i64 = summary::table
                .select(count_star())
                .get_result(&mut conn)
                .await?;
            Ok(count as u64)
        })
    }

    /// Check whether a record with this filename already exists.
    pub async fn exists_by_filename(&self, filename: &str) -> Result<bool, DbError> {
        use diesel::dsl::count_star;
        with_conn!(self.pool, conn => {
            let count: i64 = summary::table
                .filter(summary::filename.eq(filename))
                .select(count_star())
                .get_result(&mut conn)
                .await?;
            Ok(count > 0)
        })
    }

    /// Store a tier's summary only if that tier is still empty.
    ///
    /// Returns `false` when the row is missing or the tier was already
    /// populated, in which case the stored value is left untouched.
    pub async fn store_tier_if_empty(
        &self,
        id: i32,
        tier: SummaryTier,
        text: &str,
    ) -> Result<bool, DbError> {
        let rows = with_conn!(self.pool, conn => {
            match tier {
                SummaryTier::Short => {
                    diesel::update(
                        summary::table
                            .filter(summary::id.eq(id))
                            .filter(summary::short_summary.is_null()),
                    )
                    .set(summary::short_summary.eq(text))
                    .execute(&mut conn)
                    .await?
                }
                SummaryTier::Brief => {
                    diesel::update(
                        summary::table
                            .filter(summary::id.eq(id))
                            .filter(summary::brief_summary.is_null()),
                    )
                    .set(summary::brief_summary.eq(text))
                    .execute(&mut conn)
                    .await?
                }
                SummaryTier::Detailed => {
                    diesel::update(
                        summary::table
                            .filter(summary::id.eq(id))
                            .filter(summary::detailed_summary.is_null()),
                    )
                    .set(summary::detailed_summary.eq(text))
                    .execute(&mut conn)
                    .await?
                }
            }
        });
        Ok(rows > 0)
    }
}

fn filename_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}
