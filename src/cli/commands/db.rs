//! Database management commands.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::repository::copy::ProgressCallback;
use crate::repository::{copy_summaries, redact_url_password, CopyStats, DbContext};

/// Create the summary table and add any missing columns.
pub async fn cmd_migrate(settings: &Settings) -> anyhow::Result<()> {
    println!("{} Database migration", style("→").cyan());
    println!(
        "  Database: {}",
        redact_url_password(&settings.database_url())
    );

    settings.ensure_directories()?;
    let ctx = settings.create_db_context()?;

    let added = match ctx.migrate().await {
        Ok(added) => added,
        Err(e) => {
            eprintln!("{} Migration failed: {}", style("✗").red(), e);
            return Err(anyhow::anyhow!("Migration failed: {}", e));
        }
    };

    if added.is_empty() {
        println!("{} Schema is up to date.", style("✓").green());
    } else {
        for column in &added {
            println!("  {} Added column {}", style("+").green(), column);
        }
        println!("{} Migration complete!", style("✓").green());
    }

    Ok(())
}

/// Copy records between databases.
pub async fn cmd_db_copy(source_url: &str, target_url: &str, pool_size: usize) -> anyhow::Result<()> {
    println!("{} Copying database:", style("→").cyan());
    println!("  From: {}", redact_url_password(source_url));
    println!("  To:   {}", redact_url_password(target_url));

    if source_url == target_url {
        anyhow::bail!("Source and target databases are the same");
    }

    let source = DbContext::from_url(source_url, pool_size)?;
    let target = DbContext::from_url(target_url, pool_size)?;
    let total = source.summaries().count().await?;

    let pb = create_progress_bar(total)?;
    let stats = copy_summaries(&source, &target, Some(make_progress_callback(pb.clone()))).await;
    pb.finish_and_clear();
    let stats = stats?;

    println!(
        "\n{} Copy complete! ({} copied, {} already present)",
        style("✓").green(),
        stats.copied,
        stats.skipped
    );

    Ok(())
}

/// Create a progress bar for the copy.
fn create_progress_bar(total: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {prefix:>10} [{bar:40.cyan/dim}] {pos}/{len} ({per_sec})")?
            .progress_chars("=>-"),
    );
    pb.set_prefix("summaries");
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Create a progress callback that updates the progress bar.
fn make_progress_callback(pb: ProgressBar) -> ProgressCallback {
    Arc::new(move |stats: &CopyStats| {
        pb.set_position((stats.copied + stats.skipped) as u64);
    })
}
