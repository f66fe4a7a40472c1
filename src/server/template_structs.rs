//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.
//! Askama provides compile-time verification that templates are valid.

use askama::Template;

use crate::models::{SummaryRecord, SummaryTier};

/// Helper struct for rows in the recent uploads list.
pub struct RecentRow {
    pub id: i32,
    pub title: String,
    pub filename: String,
    pub page_count: String,
    pub date_str: String,
}

impl From<&SummaryRecord> for RecentRow {
    fn from(record: &SummaryRecord) -> Self {
        Self {
            id: record.id,
            title: record.display_title().to_string(),
            filename: record.filename.clone(),
            page_count: format_page_count(record.page_count),
            date_str: record.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// One summary tier on the detail page.
pub struct TierSection {
    pub name: &'static str,
    pub label: &'static str,
    pub has_summary: bool,
    pub summary: String,
}

/// Home page: upload form and recent uploads.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub recent: Vec<RecentRow>,
    pub max_upload_mb: usize,
}

/// Detail page for a single uploaded book.
#[derive(Template)]
#[template(path = "summary.html")]
pub struct SummaryTemplate {
    pub title: String,
    pub id: i32,
    pub filename: String,
    pub page_count: String,
    pub date_str: String,
    pub has_text: bool,
    pub tiers: Vec<TierSection>,
}

impl SummaryTemplate {
    pub fn from_record(record: &SummaryRecord) -> Self {
        let tiers = SummaryTier::ALL
            .into_iter()
            .map(|tier| {
                let summary = record.summary(tier);
                TierSection {
                    name: tier.as_str(),
                    label: tier.label(),
                    has_summary: summary.is_some(),
                    summary: summary.unwrap_or_default().to_string(),
                }
            })
            .collect();

        Self {
            title: record.display_title().to_string(),
            id: record.id,
            filename: record.filename.clone(),
            page_count: format_page_count(record.page_count),
            date_str: record.created_at.format("%Y-%m-%d %H:%M").to_string(),
            has_text: record.text().is_some(),
            tiers,
        }
    }
}

/// Error page (404 and 500).
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub status: u16,
    pub message: String,
}

fn format_page_count(page_count: Option<i32>) -> String {
    match page_count {
        Some(1) => "1 page".to_string(),
        Some(n) => format!("{} pages", n),
        None => "unknown length".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> SummaryRecord {
        SummaryRecord {
            id: 3,
            filename: "deep_work.pdf".to_string(),
            title: Some("Deep Work".to_string()),
            pdf_text: Some("text".to_string()),
            short_summary: Some("<b>short".to_string()),
            brief_summary: None,
            detailed_summary: None,
            page_count: Some(1),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
        }
    }

    #[test]
    fn test_recent_row() {
        let row = RecentRow::from(&record());
        assert_eq!(row.page_count, "1 page");
        assert_eq!(row.date_str, "2024-03-09 14:05");
    }

    #[test]
    fn test_summary_template_escapes_and_lists_tiers() {
        let template = SummaryTemplate::from_record(&record());
        assert_eq!(template.tiers.len(), 3);
        assert!(template.tiers[0].has_summary);
        assert!(!template.tiers[1].has_summary);

        let html = template.render().unwrap();
        assert!(html.contains("Deep Work"));
        assert!(html.contains("&lt;b&gt;short"));
        assert!(html.contains("data-tier=\"detailed\""));
    }
}
