//! Copy document records between databases.
//!
//! Used to move an existing SQLite library into PostgreSQL (or back). Rows
//! are read in id order in small batches; a record whose filename already
//! exists in the target is skipped, so an interrupted copy can be rerun.

use std::sync::Arc;

use super::context::DbContext;
use super::pool::DbError;

/// Number of records read and written per batch.
pub const COPY_BATCH_SIZE: i64 = 10;

/// Progress callback, called after each batch with the running totals.
pub type ProgressCallback = Arc<dyn Fn(&CopyStats) + Send + Sync>;

/// Outcome of a copy run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    pub skipped: usize,
}

/// Copy every record from `source` into `target`.
///
/// Both schemas are brought up to date first, so a database that predates the
/// `pdf_text` column can be read. Each batch is written before the next one
/// is read; records already written stay in place if a later batch fails.
pub async fn copy_summaries(
    source: &DbContext,
    target: &DbContext,
    progress: Option<ProgressCallback>,
) -> Result<CopyStats, DbError> {
    let added = source.migrate().await?;
    if !added.is_empty() {
        tracing::info!("Added columns to the source database: {}", added.join(", "));
    }
    target.init_schema().await?;

    let from = source.summaries();
    let to = target.summaries();
    let mut stats = CopyStats::default();
    let mut last_id = 0;

    loop {
        let batch = from.page_after(last_id, COPY_BATCH_SIZE).await?;
        let Some(last) = batch.last() else {
            break;
        };
        last_id = last.id;

        for record in &batch {
            if to.exists_by_filename(&record.filename).await? {
                tracing::debug!("Skipping {} (already present)", record.filename);
                stats.skipped += 1;
                continue;
            }
            to.insert_copy(record).await?;
            stats.copied += 1;
        }

        tracing::info!(
            "Copied {} records so far ({} skipped)",
            stats.copied,
            stats.skipped
        );
        if let Some(ref callback) = progress {
            callback(&stats);
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryTier;
    use crate::repository::context::create_legacy_table;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_copy_skips_existing_filenames() {
        let dir = tempdir().unwrap();
        let source = DbContext::new(&dir.path().join("source.db"));
        let target = DbContext::new(&dir.path().join("target.db"));
        source.init_schema().await.unwrap();
        target.init_schema().await.unwrap();

        for n in 0..12 {
            let id = source
                .summaries()
                .create(&format!("book{n}.pdf"), "Book", "text", n)
                .await
                .unwrap();
            if n == 3 {
                source
                    .summaries()
                    .store_tier_if_empty(id, SummaryTier::Short, "short one")
                    .await
                    .unwrap();
            }
        }
        target
            .summaries()
            .create("book0.pdf", "Book", "text", 0)
            .await
            .unwrap();

        let batches = Arc::new(AtomicUsize::new(0));
        let counter = batches.clone();
        let progress: ProgressCallback = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let stats = copy_summaries(&source, &target, Some(progress))
            .await
            .unwrap();
        assert_eq!(stats, CopyStats { copied: 11, skipped: 1 });
        assert_eq!(batches.load(Ordering::SeqCst), 2);
        assert_eq!(target.summaries().count().await.unwrap(), 12);

        let copied = target.summaries().recent(20).await.unwrap();
        let book3 = copied.iter().find(|r| r.filename == "book3.pdf").unwrap();
        assert_eq!(book3.short_summary.as_deref(), Some("short one"));

        let again = copy_summaries(&source, &target, None).await.unwrap();
        assert_eq!(again, CopyStats { copied: 0, skipped: 12 });
    }

    #[tokio::test]
    async fn test_copy_reads_legacy_database() {
        let dir = tempdir().unwrap();
        let source = DbContext::new(&dir.path().join("book_summaries.db"));
        let target = DbContext::new(&dir.path().join("target.db"));
        create_legacy_table(source.pool()).await.unwrap();

        let stats = copy_summaries(&source, &target, None).await.unwrap();
        assert_eq!(stats, CopyStats { copied: 2, skipped: 0 });

        let copied = target.summaries().recent(10).await.unwrap();
        let old = copied.iter().find(|r| r.filename == "old.pdf").unwrap();
        assert_eq!(old.title.as_deref(), Some("Old"));
        assert_eq!(old.short_summary.as_deref(), Some("kept"));
        assert!(old.pdf_text.is_none());
        assert_eq!(
            old.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-03-01 10:30:00"
        );

        let untitled = copied
            .iter()
            .find(|r| r.filename == "untitled_notes.pdf")
            .unwrap();
        assert_eq!(untitled.title.as_deref(), Some("untitled_notes"));
        assert_eq!(untitled.page_count, Some(3));
    }
}
