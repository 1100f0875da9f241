//! Show command implementation

use anyhow::Result;
use colored::Colorize;
use history_db::TimelineDb;
use tabled::{Table, settings::{Style, Color, Modify, object::Rows}};

use crate::helpers::{describe_changes, format_relative_time, format_timestamp, parse_since_date, suggest_keys};
use crate::output::EventRow;

/// Shows the change timeline of one entity, newest first
pub fn cmd_show(
    key: String,
    limit: usize,
    since: Option<String>,
    show_all: bool,
    db: TimelineDb,
) -> Result<()> {
    let events = db.events_for(&key)?;

    if events.is_empty() {
        eprintln!("{} Key {} not found in database", "❌".red(), key.bold());

        let suggestions = suggest_keys(&key, &db.keys()?, 5);
        if !suggestions.is_empty() {
            eprintln!("\n{} Did you mean:", "💡".yellow());
            for suggestion in suggestions {
                eprintln!("  {}", suggestion.bright_white());
            }
        }

        std::process::exit(1);
    }

    // Changes are computed over the full timeline, before filtering
    let mut rows: Vec<(i64, EventRow)> = events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let previous = i.checked_sub(1).map(|p| &events[p]);
            let row = EventRow {
                commit: event.commit.short_sha().to_string(),
                date: format_timestamp(event.commit.timestamp),
                age: format_relative_time(event.commit.timestamp),
                fingerprint: event.fingerprint.short().to_string(),
                changed: describe_changes(event, previous),
            };
            (event.commit.timestamp, row)
        })
        .collect();

    if let Some(since) = since.as_deref() {
        let since_timestamp = parse_since_date(since)?;
        rows.retain(|(timestamp, _)| *timestamp >= since_timestamp);
    }

    if rows.is_empty() {
        println!("{} No events match the specified filters", "❌".red());
        return Ok(());
    }

    rows.reverse();

    let latest = &events[events.len() - 1];
    println!("\n{} {}", "🔑".bright_cyan(), key.bold().bright_white());
    println!("{}", "━".repeat(60).bright_black());
    println!(
        "  {} {}  {} {}",
        "Events:".bright_yellow(),
        events.len().to_string().bold(),
        "Latest:".bright_green(),
        latest.commit.to_string().green()
    );
    println!();

    let total_count = rows.len();
    let display_limit = if show_all { total_count } else { limit.min(total_count) };

    let mut table = Table::new(rows.into_iter().take(display_limit).map(|(_, row)| row));
    table.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);

    if display_limit < total_count {
        println!("\n  {} and {} more events (use {} to see all)",
            "...".dimmed(),
            (total_count - display_limit).to_string().bold(),
            "-a".bright_cyan()
        );
    }

    Ok(())
}
