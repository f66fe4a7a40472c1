//! HTTP request handlers for the web server.

mod api;
mod dev;
mod generate;
mod pages;
mod static_files;
mod upload;

// Re-export handlers for use by the router
pub use api::api_recent;
pub use dev::test_summary;
pub use generate::generate_summary;
pub use pages::{index, not_found, summary_detail};
pub use static_files::{serve_css, serve_js};
pub use upload::upload;
