//! Recent uploads command.

use console::style;

use crate::config::Settings;

/// Print the most recently uploaded books.
pub async fn cmd_recent(settings: &Settings, limit: i64) -> anyhow::Result<()> {
    let ctx = settings.create_db_context()?;
    let records = ctx.summaries().recent(limit.max(1)).await?;

    if records.is_empty() {
        println!("{} No books uploaded yet", style("!").yellow());
        return Ok(());
    }

    println!(
        "{:>5}  {:<40}  {:>6}  {}",
        style("ID").bold(),
        style("Title").bold(),
        style("Pages").bold(),
        style("Uploaded").bold()
    );
    for record in &records {
        let pages = record
            .page_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {:<40}  {:>6}  {}",
            record.id,
            truncate(record.display_title(), 40),
            pages,
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
