//! Export command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use history_db::TimelineDb;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Writes every stored change event to `output` as a JSON array
pub fn cmd_export(output: PathBuf, db: TimelineDb) -> Result<()> {
    let events = db.all_events()?;

    let file = File::create(&output)
        .with_context(|| format!("Failed to create {:?}", output))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &events)
        .context("Failed to serialize change events")?;
    writer.flush()
        .with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "{} Exported {} events to {}",
        "✅".green(),
        events.len().to_string().bold(),
        output.display()
    );
    Ok(())
}
