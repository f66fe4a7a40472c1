//! Web server for uploading books and generating summaries.
//!
//! Pages:
//! - `/` upload form and recent uploads
//! - `/summary/:id` summaries for one book, generated on demand
//!
//! JSON endpoints: `/upload`, `/generate_summary`, `/api/recent` and the
//! development-only `/test_summary`.

mod assets;
mod error;
mod handlers;
mod routes;
mod template_structs;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::extract::{LopdfExtractor, PdfExtractor};
use crate::llm::{LlmClient, Summarizer};
use crate::repository::{DbContext, SummaryRepository};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub summaries: Arc<SummaryRepository>,
    pub extractor: Arc<dyn PdfExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Build production state: lopdf extraction and the configured LLM provider.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context()?;

        Ok(Self::from_parts(
            &ctx,
            Arc::new(LopdfExtractor::new()),
            Arc::new(LlmClient::new(settings.llm.clone())),
            settings.clone(),
        ))
    }

    pub fn from_parts(
        ctx: &DbContext,
        extractor: Arc<dyn PdfExtractor>,
        summarizer: Arc<dyn Summarizer>,
        settings: Settings,
    ) -> Self {
        Self {
            summaries: Arc::new(ctx.summaries()),
            extractor,
            summarizer,
            settings: Arc::new(settings),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
