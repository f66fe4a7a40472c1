//! Static asset constants (CSS and JavaScript).

/// Stylesheet for the web interface.
pub const CSS: &str = include_str!("styles.css");

/// JavaScript for the upload form and summary generation buttons.
pub const JS: &str = include_str!("scripts.js");
