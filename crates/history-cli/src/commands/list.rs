//! List command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use history_db::TimelineDb;
use regex::Regex;
use tabled::{Table, settings::{Style, Color, Modify, object::Rows}};

use crate::helpers::format_timestamp;
use crate::output::KeyRow;

/// Lists stored entity keys with their event counts
pub fn cmd_list(prefix: Option<String>, pattern: Option<String>, db: TimelineDb) -> Result<()> {
    let mut keys = match prefix.as_deref() {
        Some(prefix) => db.search_keys(prefix)?,
        None => db.keys()?,
    };

    if let Some(pat) = pattern.as_deref() {
        let re = Regex::new(pat)
            .with_context(|| format!("Invalid regex pattern: {}", pat))?;
        keys.retain(|key| re.is_match(key));
    }

    if keys.is_empty() {
        println!("{} No keys found", "❌".red());
        return Ok(());
    }

    let mut rows = Vec::with_capacity(keys.len());
    for key in keys {
        let events = db.events_for(&key)?;
        let last_change = events
            .last()
            .map(|event| format_timestamp(event.commit.timestamp))
            .unwrap_or_else(|| "-".to_string());
        rows.push(KeyRow {
            key,
            events: events.len(),
            last_change,
        });
    }

    let total = rows.len();
    let mut table = Table::new(rows);
    table.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);
    println!("\n  {} {}", "Total keys:".bright_yellow(), total.to_string().bold());

    Ok(())
}
