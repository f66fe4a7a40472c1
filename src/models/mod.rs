//! Data models for booksum.

mod summary;

pub use summary::{SummaryListing, SummaryRecord, SummaryTier};
