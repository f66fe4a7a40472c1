//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::repository::redact_url_password;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = settings.create_db_context()?;
    ctx.init_schema().await?;

    println!(
        "{} Initialized booksum database at {}",
        style("✓").green(),
        redact_url_password(&settings.database_url())
    );

    if !settings.sample_text_path.exists() && settings.dev_routes {
        println!(
            "  {} Sample text {} not found; /test_summary will fail until it exists",
            style("!").yellow(),
            settings.sample_text_path.display()
        );
    }

    Ok(())
}
