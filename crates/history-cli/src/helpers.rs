//! Helper functions for CLI operations

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use history_core::ChangeEvent;

/// Minimum Jaro-Winkler similarity for a key to be suggested
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Parses a YYYY-MM-DD date into the Unix timestamp of its midnight (UTC)
pub fn parse_since_date(since: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(since, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Expected YYYY-MM-DD", since))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

/// Describes how `event` differs from the event before it
pub fn describe_changes(event: &ChangeEvent, previous: Option<&ChangeEvent>) -> String {
    match previous {
        None => "(first seen)".to_string(),
        // Neighbouring events of a key never share a fingerprint
        Some(previous) => event.changed_fields(previous).join(", "),
    }
}

/// Keys close to `query`, best match first
pub fn suggest_keys(query: &str, keys: &[String], max: usize) -> Vec<String> {
    let query = query.to_ascii_lowercase();
    let mut scored: Vec<(f64, &String)> = keys
        .iter()
        .map(|key| (strsim::jaro_winkler(&query, &key.to_ascii_lowercase()), key))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(max).map(|(_, key)| key.clone()).collect()
}

/// Formats timestamp as relative time (e.g., "2 days ago")
pub fn format_relative_time(timestamp: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        let mins = duration.num_minutes();
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if duration.num_hours() < 24 {
        let hours = duration.num_hours();
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if duration.num_days() < 30 {
        let days = duration.num_days();
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if duration.num_days() < 365 {
        let months = duration.num_days() / 30;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = duration.num_days() / 365;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}

/// Formats Unix timestamp to readable date
pub fn format_timestamp(timestamp: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    dt.format("%Y-%m-%d %H:%M").to_string()
}
