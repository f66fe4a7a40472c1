//! Document records and summary tiers.
//!
//! A record is created once a PDF has been uploaded and its text extracted.
//! Each summary tier is filled in independently the first time it is
//! requested and never overwritten afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length tier of a generated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTier {
    Short,
    Brief,
    Detailed,
}

impl SummaryTier {
    pub const ALL: [SummaryTier; 3] = [Self::Short, Self::Brief, Self::Detailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Brief => "brief",
            Self::Detailed => "detailed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "short" => Some(Self::Short),
            "brief" => Some(Self::Brief),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }

    /// Human-readable label used in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Brief => "Brief",
            Self::Detailed => "Detailed",
        }
    }
}

impl std::fmt::Display for SummaryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Database-assigned identifier.
    pub id: i32,
    /// Sanitized upload filename.
    pub filename: String,
    pub title: Option<String>,
    /// Text extracted at upload time.
    pub pdf_text: Option<String>,
    pub short_summary: Option<String>,
    pub brief_summary: Option<String>,
    pub detailed_summary: Option<String>,
    pub page_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    /// Stored summary for a tier, if it has been generated.
    pub fn summary(&self, tier: SummaryTier) -> Option<&str> {
        match tier {
            SummaryTier::Short => self.short_summary.as_deref(),
            SummaryTier::Brief => self.brief_summary.as_deref(),
            SummaryTier::Detailed => self.detailed_summary.as_deref(),
        }
    }

    /// Extracted text, or `None` when missing or blank.
    pub fn text(&self) -> Option<&str> {
        self.pdf_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Title for display, falling back to the filename.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.filename)
    }
}

/// Metadata view of a record, without the extracted text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryListing {
    pub id: i32,
    pub filename: String,
    pub title: String,
    pub page_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    /// Tiers that already have a stored summary.
    pub available: Vec<SummaryTier>,
}

impl From<&SummaryRecord> for SummaryListing {
    fn from(record: &SummaryRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename.clone(),
            title: record.display_title().to_string(),
            page_count: record.page_count,
            created_at: record.created_at,
            available: SummaryTier::ALL
                .into_iter()
                .filter(|tier| record.summary(*tier).is_some())
                .collect(),
        }
    }
}
