//! booksum - upload PDF books and generate tiered summaries.
//!
//! Text is extracted once at upload time and stored with the record; each
//! summary tier (short, brief, detailed) is generated by an LLM the first
//! time it is requested and cached in the database afterwards.

pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
pub mod utils;
