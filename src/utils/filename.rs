//! Upload filename helpers.

use std::path::Path;

/// Fallback when sanitizing leaves nothing usable.
const FALLBACK_FILENAME: &str = "document.pdf";

/// Whether the name ends in a `.pdf` extension (case-insensitive).
pub fn has_pdf_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Reduce an uploaded filename to a safe, flat ASCII name.
///
/// Path separators and whitespace runs become `_`, anything other than ASCII
/// letters, digits, `.`, `_` and `-` is dropped, and leading or trailing `.`
/// and `_` are stripped so the result can never name a parent directory.
pub fn sanitize_filename(name: &str) -> String {
    let flattened = name.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let sanitized: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = sanitized.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive a display title from a (sanitized) filename.
///
/// The extension is dropped, `_` and `-` become spaces, and each run of
/// letters is capitalised with the rest lower-cased. Any non-letter starts a
/// new run, so `"2nd_EDITION"` becomes `"2Nd Edition"`.
pub fn title_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let spaced = stem.replace(['_', '-'], " ");
    let mut title = String::with_capacity(spaced.len());
    let mut in_word = false;
    for c in spaced.chars() {
        if c.is_alphabetic() {
            if in_word {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(c);
            in_word = false;
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension() {
        assert!(has_pdf_extension("book.pdf"));
        assert!(has_pdf_extension("BOOK.PDF"));
        assert!(has_pdf_extension("archive.tar.pdf"));
        assert!(!has_pdf_extension("book.txt"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension("book.pdf.exe"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Great Book.pdf"), "My_Great_Book.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "etc_passwd.pdf");
        assert_eq!(sanitize_filename("  spaced\tout .pdf"), "spaced_out_.pdf");
        assert_eq!(sanitize_filename("café-notes.pdf"), "caf-notes.pdf");
        assert_eq!(sanitize_filename("..."), "document.pdf");
        assert_eq!(sanitize_filename("日本語"), "document.pdf");
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename("atomic_habits.pdf"), "Atomic Habits");
        assert_eq!(title_from_filename("the-DEEP_work.pdf"), "The Deep Work");
        assert_eq!(title_from_filename("2nd_EDITION.pdf"), "2Nd Edition");
        assert_eq!(title_from_filename("notes"), "Notes");
    }
}
