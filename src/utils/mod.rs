//! Shared utility functions.
//!
//! - `filename`: upload filename validation, sanitizing and title derivation

mod filename;

pub use filename::{has_pdf_extension, sanitize_filename, title_from_filename};
