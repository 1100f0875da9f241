//! Stats command implementation

use anyhow::Result;
use history_db::TimelineDb;
use colored::Colorize;

use crate::helpers::{format_relative_time, format_timestamp};

/// Displays database statistics
pub fn cmd_stats(db: TimelineDb) -> Result<()> {
    println!("{}", "Database Statistics:".bright_cyan().bold());
    println!("  {}: {}", "Keys".bright_yellow(), db.key_count()?.to_string().bold());
    println!("  {}: {}", "Change events".bright_yellow(), db.event_count().to_string().bold());
    println!("  {}: {}", "Runs".bright_yellow(), db.run_count().to_string().bold());

    if let Some(run) = db.last_run()? {
        println!("\n{}", "Last run:".bright_cyan().bold());
        println!("  {}: {}:{}", "Source".bright_yellow(), run.repository, run.path);
        println!(
            "  {}: {} ({})",
            "Recorded".bright_yellow(),
            format_timestamp(run.recorded_at),
            format_relative_time(run.recorded_at)
        );
        println!("  {}: {}", "Head".bright_yellow(), run.head_sha.as_deref().unwrap_or("-"));
        println!("  {}: {}", "Commits".bright_yellow(), run.commits);
        println!("  {}: {}", "Events".bright_yellow(), run.events);
    }
    Ok(())
}
